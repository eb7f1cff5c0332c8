use actix_web::error::InternalError;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use aidoshop_common::requests::MemberIntakeRequest;
use aidoshop_common::responses::IntakeResponse;
use log::{error, info, warn};

use crate::db::{run_blocking, Database};
use crate::error::AppError;
use crate::services::intake::normalize::{normalize, RequestMeta};
use crate::services::intake::reconcile::{upsert_member, ReconcileOutcome};

/// Largest accepted intake body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Actix web handler for `POST /api/member-intake`.
///
/// # Returns
/// - `201 Created` with `{"status":"ok","member_id":..,"created":..}`.
/// - `400 Bad Request` with `{"status":"error","message":..}` for validation
///   and storage failures alike.
pub async fn process(
    req: HttpRequest,
    payload: web::Json<MemberIntakeRequest>,
    db: web::Data<Database>,
) -> impl Responder {
    let payload = payload.into_inner();
    info!("Member intake payload: {:?}", payload);

    match submit_intake(&db, &payload, RequestMeta::from_request(&req)).await {
        Ok(outcome) => {
            info!(
                "Member intake stored member {} (created: {})",
                outcome.member_id, outcome.created
            );
            HttpResponse::Created().json(IntakeResponse::Ok {
                member_id: outcome.member_id,
                created: outcome.created,
            })
        }
        Err(e) => {
            error!("Member intake error: {} (payload: {:?})", e, payload);
            HttpResponse::BadRequest().json(IntakeResponse::Error {
                message: e.to_string(),
            })
        }
    }
}

/// Normalizes first, so a bad payload never reaches the store.
async fn submit_intake(
    db: &web::Data<Database>,
    payload: &MemberIntakeRequest,
    meta: RequestMeta,
) -> Result<ReconcileOutcome, AppError> {
    let intake = normalize(payload, &meta)?;
    run_blocking(db, move |conn| upsert_member(conn, &intake)).await
}

/// JSON extractor settings for the intake scope.
///
/// Forms post with all sorts of content types, so any is accepted. Bodies
/// that are not valid JSON get the same error envelope as any other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .content_type_required(false)
        .content_type(|_| true)
        .error_handler(|err, _req| {
            let message = err.to_string();
            warn!("Rejected member intake body: {}", message);
            let response = HttpResponse::BadRequest().json(IntakeResponse::Error { message });
            InternalError::from_response(err, response).into()
        })
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::db::members::{count_members, get_energy_map, get_member};
    use crate::db::Database;
    use crate::services;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use aidoshop_common::model::energy::ZodiacSign;
    use serde_json::{json, Value};

    fn row_count(db: &Database, table: &'static str) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?)
        })
        .unwrap()
    }

    macro_rules! intake_app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data($db.clone())
                    .app_data(web::Data::new(AppConfig::default()))
                    .configure(services::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn creates_member_and_answers_201() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = intake_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/member-intake")
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.2"))
            .set_json(json!({"email": "a@x.com", "full_name": "A", "date_of_birth": "1990-05-15"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["created"], true);
        let member_id = body["member_id"].as_i64().unwrap();

        let (member, energy) = db
            .with_conn(|conn| Ok((get_member(conn, member_id)?, get_energy_map(conn, member_id)?)))
            .unwrap();
        let member = member.unwrap();
        assert_eq!(member.email, "a@x.com");
        assert_eq!(member.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(energy.unwrap().energy_type, ZodiacSign::Taurus);
    }

    #[actix_web::test]
    async fn second_submission_updates_instead_of_duplicating() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = intake_app!(db);

        for (name, expected_created) in [("A", true), ("Alice", false)] {
            let req = test::TestRequest::post()
                .uri("/api/member-intake")
                .set_json(json!({"email": "a@x.com", "full_name": name, "date_of_birth": "1990-05-15"}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["created"], expected_created);
        }

        assert_eq!(db.with_conn(|conn| count_members(conn)).unwrap(), 1);
        let member = db.with_conn(|conn| get_member(conn, 1)).unwrap().unwrap();
        assert_eq!(member.full_name, "Alice");
    }

    #[actix_web::test]
    async fn missing_date_of_birth_writes_nothing() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = intake_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/member-intake")
            .set_json(json!({"email": "a@x.com", "full_name": "A"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"status": "error", "message": "Missing date_of_birth in payload"})
        );
        for table in ["members", "member_birth_data", "energy_map"] {
            assert_eq!(row_count(&db, table), 0, "{} should be empty", table);
        }
    }

    #[actix_web::test]
    async fn unparseable_date_is_rejected() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = intake_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/member-intake")
            .set_json(json!({"email": "a@x.com", "date_of_birth": "1990.05.15"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Unsupported date format: 1990.05.15");
        assert_eq!(row_count(&db, "members"), 0);
    }

    #[actix_web::test]
    async fn malformed_json_uses_error_envelope() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = intake_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/member-intake")
            .insert_header(("Content-Type", "text/plain"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "error");
    }
}
