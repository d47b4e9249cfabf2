//! Pages through the loaded dataset.
//!
//! - `GET /api/data_sources/rows?offset=0&limit=50`: the columns, the total row
//!   count and one window of rows. Values are rendered the way they will be
//!   substituted, and in multi-template mode each row carries its selected
//!   template. `limit` defaults to 50 and is capped at 500.

use actix_web::web::{get, scope};
use actix_web::Scope;

mod get;

const API_PATH: &str = "/api/data_sources/rows";

pub const DEFAULT_ROWS_PAGE: usize = 50;
pub const MAX_ROWS_PAGE: usize = 500;

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(get::process))
}
