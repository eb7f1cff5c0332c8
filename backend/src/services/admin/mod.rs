//! # Admin Service Module
//!
//! Browser-facing pages for staff to browse and export captured leads.
//!
//! ## Sub-modules:
//! - `session`: signed-cookie login state.
//! - `login`: login form, credential check and logout.
//! - `members`: filtered member listing with the focus-area breakdown.
//! - `detail`: one member with its birth data and energy map.
//! - `export`: CSV download of every member.
//! - `html`: page rendering.

mod detail;
mod export;
mod html;
mod login;
mod members;
mod session;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all admin pages.
const ADMIN_PATH: &str = "/admin";

/// Configures and returns the Actix `Scope` for the admin pages.
///
/// # Registered Routes:
///
/// *   **`GET /login`**, **`POST /login`**: `login::show` / `login::submit`.
/// *   **`GET /logout`**: `login::logout`, clears the session.
/// *   **`GET /members`**: `members::process`, requires a session.
/// *   **`GET /members/export`**: `export::process`, requires a session.
/// *   **`GET /members/{member_id}`**: `detail::process`, requires a session.
pub fn configure_routes() -> Scope {
    scope(ADMIN_PATH)
        .route("/login", get().to(login::show))
        .route("/login", post().to(login::submit))
        .route("/logout", get().to(login::logout))
        .route("/members", get().to(members::process))
        .route("/members/export", get().to(export::process))
        .route("/members/{member_id}", get().to(detail::process))
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::db::Database;
    use crate::services;
    use crate::services::admin::session::SESSION_COOKIE;
    use actix_web::cookie::Cookie;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};
    use serde_json::json;

    macro_rules! admin_app {
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

    fn location(resp: &actix_web::dev::ServiceResponse) -> String {
        resp.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[actix_web::test]
    async fn protected_pages_redirect_to_login() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = admin_app!(db);

        for (uri, encoded) in [
            ("/admin/members", "%2Fadmin%2Fmembers"),
            ("/admin/members/export", "%2Fadmin%2Fmembers%2Fexport"),
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::FOUND);
            assert_eq!(location(&resp), format!("/admin/login?next={}", encoded));
        }
    }

    #[actix_web::test]
    async fn filtered_page_survives_the_login_round_trip() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = admin_app!(db);

        let target = "/admin/members?focus=a&search=b";
        let resp = test::call_service(&app, test::TestRequest::get().uri(target).to_request()).await;
        let login = location(&resp);
        assert_eq!(
            login,
            "/admin/login?next=%2Fadmin%2Fmembers%3Ffocus%3Da%26search%3Db"
        );

        let req = test::TestRequest::post()
            .uri(&login)
            .set_form([("username", "aido"), ("password", "aido123!")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), target);
    }

    #[actix_web::test]
    async fn forged_cookie_is_rejected() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = admin_app!(db);

        let req = test::TestRequest::get()
            .uri("/admin/members")
            .cookie(Cookie::new(SESSION_COOKIE, "1700000000.deadbeef"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    #[actix_web::test]
    async fn bad_credentials_rerender_the_form() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = admin_app!(db);

        let req = test::TestRequest::post()
            .uri("/admin/login")
            .set_form([("username", "aido"), ("password", "wrong")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.response().cookies().next().is_none());
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Invalid username or password."));
    }

    #[actix_web::test]
    async fn login_then_browse_and_export() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = admin_app!(db);

        for (email, focus) in [("ann@x.com", json!(["Career", "Wealth"])), ("bob@y.com", json!("Health"))] {
            let req = test::TestRequest::post()
                .uri("/api/member-intake")
                .set_json(json!({"email": email, "focus_areas": focus, "date_of_birth": "1990-05-15"}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::post()
            .uri("/admin/login?next=/admin/members/export")
            .set_form([("username", " aido "), ("password", "aido123!")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/admin/members/export");
        let session = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("session cookie")
            .into_owned();

        let req = test::TestRequest::get()
            .uri("/admin/members?focus=career")
            .cookie(session.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
        assert!(page.contains("ann@x.com"));
        assert!(!page.contains("bob@y.com"));

        let req = test::TestRequest::get()
            .uri("/admin/members/export")
            .cookie(session)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.contains("members.csv"));
        let csv = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,full_name,email,gender,focus_areas,source_page,ip_address,country_code,consent_to_emails,created_at")
        );
        assert_eq!(lines.count(), 2);
    }

    #[actix_web::test]
    async fn detail_page_shows_birth_and_energy() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = admin_app!(db);

        let req = test::TestRequest::post()
            .uri("/api/member-intake")
            .set_json(json!({"email": "a@x.com", "date_of_birth": "21/03/1990", "birth_city": "Ipoh"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let config = AppConfig::default();
        let session = crate::services::admin::session::session_cookie(&config).unwrap();

        let req = test::TestRequest::get()
            .uri("/admin/members/1")
            .cookie(session.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
        assert!(page.contains("1990-03-21"));
        assert!(page.contains("Ipoh"));
        assert!(page.contains("Aries"));

        let req = test::TestRequest::get()
            .uri("/admin/members/42")
            .cookie(session)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn logout_clears_the_cookie() {
        let db = web::Data::new(Database::open_in_memory().unwrap());
        let app = admin_app!(db);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/admin/logout").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/admin/login");
        let cleared = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("removal cookie");
        assert_eq!(cleared.value(), "");
    }
}
