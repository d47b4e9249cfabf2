//! # Merge Service Module
//!
//! - `POST /start`: plans a batch from the current session and runs it in the
//!   background; answers `{ "job_id": ... }`.
//! - `GET /status/{job_id}`: the job's `JobStatus`.
//! - `GET /download/{job_id}`: zip archive of every rendered document.
//! - `GET /failures/{job_id}`: `{ row_number, reason }` for each failed row, in row order.
//! - `GET /results/{job_id}`: one `MergeTask` per attempted row, in row order.

mod download;
mod results;
mod start;
mod status;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/merge";

/// Configures and returns the Actix `Scope` for all merge-related routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/start", post().to(start::process))
        .route("/status/{job_id}", get().to(status::process))
        .route("/download/{job_id}", get().to(download::process))
        .route("/failures/{job_id}", get().to(results::failures))
        .route("/results/{job_id}", get().to(results::tasks))
}
