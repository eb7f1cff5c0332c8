use actix_web::{web, HttpRequest, HttpResponse, Responder};
use aidoshop_common::requests::{LoginForm, LoginQuery};
use log::{info, warn};

use crate::config::AppConfig;
use crate::services::admin::html;
use crate::services::admin::session::{
    redirect, removal_cookie, safe_next, session_cookie, LOGIN_PATH,
};

const MEMBERS_PATH: &str = "/admin/members";
const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// `GET /admin/login`
pub async fn show(query: web::Query<LoginQuery>) -> impl Responder {
    html_response(html::login_page(None, safe_next(query.next.as_deref())))
}

/// `POST /admin/login`
///
/// On a match the session cookie is set and the browser is sent back to
/// `next` (or the members page). Otherwise the form is shown again.
pub async fn submit(
    req: HttpRequest,
    query: web::Query<LoginQuery>,
    form: web::Form<LoginForm>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let next = safe_next(query.next.as_deref());
    let username = form.username.trim();
    let password = form.password.trim();

    if username != config.admin_username || password != config.admin_password {
        warn!("Failed admin login for {:?} from {:?}", username, req.peer_addr());
        return html_response(html::login_page(Some(INVALID_CREDENTIALS), next));
    }

    let Some(cookie) = session_cookie(&config) else {
        warn!("Admin session could not be signed; check SECRET_KEY");
        return html_response(html::login_page(Some(INVALID_CREDENTIALS), next));
    };

    info!("Admin {} logged in", username);
    let mut response = redirect(next.unwrap_or(MEMBERS_PATH));
    if let Err(e) = response.add_cookie(&cookie) {
        warn!("Failed to set admin session cookie: {}", e);
    }
    response
}

/// `GET /admin/logout`
pub async fn logout() -> HttpResponse {
    let mut response = redirect(LOGIN_PATH);
    if let Err(e) = response.add_cookie(&removal_cookie()) {
        warn!("Failed to clear admin session cookie: {}", e);
    }
    response
}

pub(crate) fn html_response(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}
