//! HTTP surface of the merge engine.
//!
//! Every sub-module contributes an Actix `Scope` under `/api`. Handlers share:
//! - `web::Data<SessionState>`: the operator's single merge session,
//! - `web::Data<JobsState>`: background merge jobs and their reports,
//! - `web::Data<AppConfig>`: server settings such as the upload limit.

pub mod data_sources;
pub mod diagnostics;
pub mod error;
pub mod mapping;
pub mod merge;
pub mod multipart;
pub mod templates;

use crate::engine::session::MergeSession;
use actix_web::web;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The merge session shared by all handlers.
#[derive(Default)]
pub struct SessionState {
    session: Mutex<MergeSession>,
}

impl SessionState {
    pub fn new(session: MergeSession) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    /// Locks the session. Handlers never hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, MergeSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registers every API scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(templates::configure_routes())
        .service(data_sources::csv::configure_routes())
        .service(data_sources::rows::configure_routes())
        .service(mapping::configure_routes())
        .service(merge::configure_routes())
        .service(diagnostics::configure_routes());
}
