//! Loads CSV data sources into the merge session.
//!
//! - `POST /api/data_sources/csv/upload`: multipart/form-data with a `file` part
//!   holding a `.csv` file. The table replaces the current dataset (rows are
//!   never merged) and the response lists the detected columns, the row count
//!   and the md5 fingerprint of the upload. Sending identical bytes again keeps
//!   the current dataset and mapping and answers with `unchanged: true`.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod upload;

const API_PATH: &str = "/api/data_sources/csv";

/// Configures and returns the Actix scope for CSV data source routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/upload", post().to(upload::process))
}
