//! # Diagnostics Service Module
//!
//! - `GET /api/diagnostics`: row and column counts, how many placeholders are
//!   bound to a column, which are not, and the operator's next steps. Per
//!   template troubleshooting lives on each template report instead.

mod get;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/diagnostics";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(get::process))
}
