//! # Member Intake Service
//!
//! Public endpoint used by the storefront forms to capture a lead.
//!
//! ## Sub-modules:
//! - `normalize`: validates the payload and cleans every field.
//! - `reconcile`: upserts the member, birth data and energy map rows by email.
//! - `submit`: the HTTP handler tying the two together.

pub mod normalize;
pub mod reconcile;
mod submit;

use actix_web::web::{post, scope};
use actix_web::Scope;

/// The base path for the public intake API.
const API_PATH: &str = "/api";

/// Configures and returns the Actix `Scope` for the intake routes.
///
/// # Registered Routes:
///
/// *   **`POST /member-intake`**:
///     - **Handler**: `submit::process`
///     - **Description**: Accepts a JSON lead payload, creates the member or
///       merges it into the one already holding that email, and answers
///       `201` with the member id. Any failure answers `400` with a message.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .app_data(submit::json_config())
        .route("/member-intake", post().to(submit::process))
}
