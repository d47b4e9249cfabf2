//! # Mapping Service Module
//!
//! Endpoints under `/api/mapping` for binding placeholders to columns and, in
//! multi-template mode, rows to templates. Every endpoint answers with the full
//! `MappingView` so the client can redraw from a single response.
//!
//! - `GET /`: current bindings, suggestions and readiness flags.
//! - `PUT /placeholders`: `{ "placeholder": "...", "column": "..." | null }`.
//! - `PUT /rows`: `{ "row_index": 0, "template": "..." | null }`.

mod get;
mod update;

use actix_web::web::{get, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/mapping";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::process))
        .route("/placeholders", put().to(update::set_placeholder))
        .route("/rows", put().to(update::set_row_template))
}
