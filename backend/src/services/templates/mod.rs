//! # Template Service Module
//!
//! Endpoints under `/api/templates` for loading and inspecting templates.
//!
//! ## Sub-modules:
//! - `upload`: replaces the template set with uploaded `.docx` files.
//! - `list`: returns the load reports and the placeholder union.
//! - `preview`: renders one template as read-only HTML.

mod list;
mod preview;
mod upload;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all template-related API endpoints.
const API_PATH: &str = "/api/templates";

/// Configures and returns the Actix `Scope` for all template-related routes.
///
/// # Registered Routes:
///
/// *   **`POST /upload`**:
///     - **Handler**: `upload::process`
///     - **Description**: Multipart body with one or more `.docx` files. The whole
///       template set is replaced; each file gets a report with its identity and
///       either its placeholders, a "no placeholders found" hint, or the reason it
///       could not be opened. Single-template mode accepts exactly one file.
///
/// *   **`GET /`**:
///     - **Handler**: `list::process`
///     - **Description**: Reports of the current template set plus every placeholder
///       with the templates that reference it.
///
/// *   **`GET /{template_id}/preview`**:
///     - **Handler**: `preview::process`
///     - **Description**: HTML rendering of the template with placeholders highlighted.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("", get().to(list::process))
        .route("/{template_id}/preview", get().to(preview::process))
}
