use actix_web::{web, HttpRequest, HttpResponse};
use aidoshop_common::model::member::Member;
use aidoshop_common::requests::MemberFilter;
use aidoshop_common::responses::FocusCount;
use log::debug;

use crate::config::AppConfig;
use crate::db::members::{count_members, list_members, LIST_LIMIT};
use crate::db::{run_blocking, Database};
use crate::error::AppError;
use crate::services::admin::html;
use crate::services::admin::login::html_response;
use crate::services::admin::session::{is_logged_in, login_redirect};

/// `GET /admin/members?focus=..&search=..`
pub async fn process(
    req: HttpRequest,
    query: web::Query<MemberFilter>,
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    if !is_logged_in(&req, &config) {
        return Ok(login_redirect(&req));
    }

    let filter = query.into_inner();
    let (members, total) = {
        let filter = filter.clone();
        run_blocking(&db, move |conn| {
            Ok((list_members(conn, &filter, Some(LIST_LIMIT))?, count_members(conn)?))
        })
        .await?
    };
    debug!("Admin members view: {} rows for {:?}", members.len(), filter);

    let counts = focus_counts(&members);
    Ok(html_response(html::members_page(
        &members,
        total,
        &counts,
        filter.focus().unwrap_or_default(),
        filter.search().unwrap_or_default(),
    )))
}

/// Counts each focus tag across `members`, in the order tags are first seen.
pub fn focus_counts(members: &[Member]) -> Vec<FocusCount> {
    let mut counts: Vec<FocusCount> = Vec::new();
    for tag in members.iter().flat_map(|m| m.focus_tags()) {
        match counts.iter_mut().find(|c| c.label == tag) {
            Some(existing) => existing.count += 1,
            None => counts.push(FocusCount {
                label: tag.to_string(),
                count: 1,
            }),
        }
    }
    counts
}
