use crate::job_controller::state::JobsState;
use crate::services::merge::download::finished_report;
use actix_web::{web, HttpResponse, Responder, ResponseError};

/// Failed rows with their 1-based row numbers, in row order.
pub(crate) async fn failures(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match finished_report(&state, &job_id).await {
        Ok(report) => HttpResponse::Ok().json(report.failed_rows()),
        Err(e) => e.error_response(),
    }
}

/// Every attempted row with its outcome, in row order.
pub(crate) async fn tasks(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match finished_report(&state, &job_id).await {
        Ok(report) => HttpResponse::Ok().json(report.tasks()),
        Err(e) => e.error_response(),
    }
}
