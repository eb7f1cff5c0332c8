use actix_web::{web, HttpRequest, HttpResponse};

use crate::config::AppConfig;
use crate::db::members::{get_birth_data, get_energy_map, get_member};
use crate::db::{run_blocking, Database};
use crate::error::AppError;
use crate::services::admin::html;
use crate::services::admin::login::html_response;
use crate::services::admin::session::{is_logged_in, login_redirect};

/// `GET /admin/members/{member_id}`: one member with birth and energy rows.
pub async fn process(
    req: HttpRequest,
    member_id: web::Path<i64>,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    if !is_logged_in(&req, &config) {
        return Ok(login_redirect(&req));
    }

    let member_id = member_id.into_inner();
    let (member, birth, energy) = run_blocking(&db, move |conn| {
        Ok((
            get_member(conn, member_id)?,
            get_birth_data(conn, member_id)?,
            get_energy_map(conn, member_id)?,
        ))
    })
    .await?;

    match member {
        Some(member) => Ok(html_response(html::member_page(
            &member,
            birth.as_ref(),
            energy.as_ref(),
        ))),
        None => Ok(HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body(format!("Member {} not found", member_id))),
    }
}
