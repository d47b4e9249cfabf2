use crate::engine::archive::{archive_name, pack};
use crate::engine::batch::BatchReport;
use crate::job_controller::state::JobsState;
use crate::services::error::ApiError;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Local;
use common::jobs::JobStatus;
use std::sync::Arc;

pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    let report = match finished_report(&state, &job_id).await {
        Ok(report) => report,
        Err(e) => return e.error_response(),
    };
    match pack(report.successes()) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/zip")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(archive_name(
                    Local::now().date_naive(),
                ))],
            })
            .body(bytes),
        Err(e) => ApiError::from(e).error_response(),
    }
}

/// The report of a finished job; `NotFinished` while it is still running and
/// `Released` once newer jobs pushed it out of the store.
pub(crate) async fn finished_report(
    state: &JobsState,
    job_id: &str,
) -> Result<Arc<BatchReport>, ApiError> {
    if let Some(report) = state.report(job_id).await {
        return Ok(report);
    }
    match state.status(job_id).await {
        Some(JobStatus::Completed(_)) => Err(ApiError::Released(job_id.to_string())),
        Some(JobStatus::Failed(_)) => Err(ApiError::NotFound(format!("results of job `{}`", job_id))),
        Some(_) => Err(ApiError::NotFinished(job_id.to_string())),
        None => Err(ApiError::NotFound(format!("job `{}`", job_id))),
    }
}
