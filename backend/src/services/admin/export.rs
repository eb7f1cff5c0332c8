use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use aidoshop_common::model::member::Member;
use aidoshop_common::requests::MemberFilter;
use chrono::SecondsFormat;
use log::info;

use crate::config::AppConfig;
use crate::db::members::list_members;
use crate::db::{run_blocking, Database};
use crate::error::AppError;
use crate::services::admin::session::{is_logged_in, login_redirect};

const EXPORT_FILENAME: &str = "members.csv";

pub const CSV_HEADER: [&str; 10] = [
    "id",
    "full_name",
    "email",
    "gender",
    "focus_areas",
    "source_page",
    "ip_address",
    "country_code",
    "consent_to_emails",
    "created_at",
];

/// `GET /admin/members/export`: every member, newest first, as CSV.
pub async fn process(
    req: HttpRequest,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    if !is_logged_in(&req, &config) {
        return Ok(login_redirect(&req));
    }

    let members = run_blocking(&db, |conn| list_members(conn, &MemberFilter::default(), None)).await?;
    let csv = members_csv(&members)?;
    info!("Exported {} members as CSV", members.len());

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(EXPORT_FILENAME.to_string())],
        })
        .body(csv))
}

pub fn members_csv(members: &[Member]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for m in members {
        let id = m.id.to_string();
        let created_at = m.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        writer.write_record([
            id.as_str(),
            m.full_name.as_str(),
            m.email.as_str(),
            m.gender.as_deref().unwrap_or_default(),
            m.focus_areas.as_deref().unwrap_or_default(),
            m.source_page.as_deref().unwrap_or_default(),
            m.ip_address.as_deref().unwrap_or_default(),
            m.country_code.as_deref().unwrap_or_default(),
            if m.consent_to_emails { "true" } else { "false" },
            created_at.as_str(),
        ])?;
    }

    writer.into_inner().map_err(|e| AppError::Io(e.into_error()))
}
