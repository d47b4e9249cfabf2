//! # Merge Job Start Service
//!
//! `POST /api/merge/start` turns the current session into a background batch.
//!
//! ## Workflow:
//!
//! 1.  **Planning**: the session is locked just long enough to build a `BatchPlan`.
//!     The plan owns a snapshot of the rows, templates and mapping, so later
//!     edits through the mapping endpoints cannot affect a running batch. Setup
//!     errors (no rows, no templates, nothing mapped, no row with a template)
//!     are answered with `409 Conflict` and no job is created.
//!
//! 2.  **Job Scheduling**: a `job_id` is registered as `Pending` and returned
//!     immediately. A Tokio task manages the job's lifecycle.
//!
//! 3.  **Background Processing**: the batch runs inside `spawn_blocking`, either
//!     row by row or on the rayon pool. Each finished row sends a `Progress`
//!     through a per-job channel; a listener turns those into
//!     `JobStatus::InProgress` updates for the central job controller.
//!
//! 4.  **Completion**: once every progress update has been forwarded, the
//!     `BatchReport` is stored and `JobStatus::Completed` is sent with the
//!     summary. Failing rows never fail the job; only a crashed worker does.

use crate::engine::batch::{BatchOrchestrator, BatchPlan, BatchReport, Progress};
use crate::engine::docx::DocxEngine;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::services::error::ApiError;
use crate::services::SessionState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::jobs::JobStatus;
use common::requests::StartMergeRequest;
use common::responses::StartMergeResponse;
use log::{error, info};
use tokio::sync::mpsc;
use uuid::Uuid;

/// The Actix web handler for `POST /api/merge/start`. The JSON body is optional.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    session: web::Data<SessionState>,
    payload: Option<web::Json<StartMergeRequest>>,
) -> impl Responder {
    let req = payload.map(web::Json::into_inner).unwrap_or_default();
    match schedule_merge_job(&state, &session, req).await {
        Ok(job_id) => HttpResponse::Ok().json(StartMergeResponse { job_id }),
        Err(e) => e.error_response(),
    }
}

/// Plans the batch, registers the job and spawns its background task.
async fn schedule_merge_job(
    state: &JobsState,
    session: &SessionState,
    req: StartMergeRequest,
) -> Result<String, ApiError> {
    let (plan, parallel) = {
        let session = session.lock();
        let plan = session.plan_batch()?;
        (plan, req.parallel.unwrap_or(session.options().parallel))
    };

    let job_id = Uuid::new_v4().to_string();
    state.register(&job_id).await;
    info!(
        "Merge job {} scheduled: {} rows{}",
        job_id,
        plan.total(),
        if parallel { ", parallel" } else { "" }
    );

    tokio::spawn(run_merge_job(state.clone(), job_id.clone(), plan, parallel));
    Ok(job_id)
}

async fn run_merge_job(state: JobsState, job_id: String, plan: BatchPlan, parallel: bool) {
    let tx = state.tx.clone();
    let (progress_tx, mut progress_rx) = mpsc::channel::<Progress>(100);

    // Forwards per-row progress to the central job controller.
    let listener_tx = tx.clone();
    let listener_job_id = job_id.clone();
    let listener = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            let status = JobStatus::InProgress {
                processed: progress.processed,
                total: progress.total,
            };
            let _ = listener_tx
                .send(JobUpdate::new(listener_job_id.clone(), status))
                .await;
        }
    });

    let handle = tokio::task::spawn_blocking(move || merge_blocking(plan, parallel, progress_tx));
    let outcome = handle.await;
    // The worker dropped its sender; wait until its last update went through.
    let _ = listener.await;

    let status = match outcome {
        Ok(report) => {
            let summary = report.summary();
            state.store_report(&job_id, report).await;
            JobStatus::Completed(summary)
        }
        Err(e) => {
            error!("Merge job {} crashed: {}", job_id, e);
            JobStatus::Failed(format!("Task join error: {}", e))
        }
    };
    let _ = tx.send(JobUpdate::new(job_id, status)).await;
}

/// Runs the whole batch on the current (blocking) thread.
fn merge_blocking(plan: BatchPlan, parallel: bool, tx: mpsc::Sender<Progress>) -> BatchReport {
    let engine = DocxEngine;
    let orchestrator = BatchOrchestrator::new();
    let report_progress = |progress: Progress| {
        let _ = tx.blocking_send(progress);
    };
    if parallel {
        orchestrator.run_parallel(&plan, &engine, &report_progress)
    } else {
        orchestrator.run(&plan, &engine, &mut |progress| report_progress(progress))
    }
}
