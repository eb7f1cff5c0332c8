pub mod admin;
pub mod health;
pub mod intake;

use actix_web::web;

/// Registers every route of the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::process))
        .service(intake::configure_routes())
        .service(admin::configure_routes());
}
