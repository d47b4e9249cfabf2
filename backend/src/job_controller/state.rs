//! Manages the state of long-running merge jobs.
//!
//! A merge batch runs outside the request/response cycle (see
//! `services::merge::start`). Its progress is reported here and polled by the
//! status endpoint; its finished report is kept for the download and failure
//! endpoints. Only the most recent reports are retained: each holds every
//! generated document, so older ones are released as new jobs finish.
//!
//! - `JobsState`: clonable, shared across the Actix application as `web::Data`.
//! - `JobUpdate`: a status change sent by a job towards the central updater.
//! - `start_job_updater`: the task applying `JobUpdate`s to `JobsState`.

use crate::engine::batch::BatchReport;
use common::jobs::JobStatus;
use log::{debug, info};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Capacity of the channel between running jobs and the updater.
pub const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Number of finished reports kept when no capacity is configured.
pub const DEFAULT_RETAINED_REPORTS: usize = 8;

#[derive(Clone)]
pub struct JobsState {
    /// Job id -> current status. Written only by `start_job_updater` once a
    /// job is registered.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Reports of finished batches. Inserted before the job's `Completed`
    /// status is sent.
    reports: Arc<RwLock<ReportStore>>,

    /// Running jobs push their updates here.
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    /// Creates the shared state and the receiver to hand to `start_job_updater`.
    pub fn new() -> (Self, mpsc::Receiver<JobUpdate>) {
        Self::with_retained_reports(DEFAULT_RETAINED_REPORTS)
    }

    /// Like `new`, keeping at most `retained` finished reports (at least one).
    pub fn with_retained_reports(retained: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            reports: Arc::new(RwLock::new(ReportStore::new(retained))),
            tx,
        };
        (state, rx)
    }

    pub async fn register(&self, job_id: &str) {
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Stores a finished report, releasing the oldest ones beyond capacity.
    pub async fn store_report(&self, job_id: &str, report: BatchReport) {
        let evicted = self
            .reports
            .write()
            .await
            .insert(job_id.to_string(), Arc::new(report));
        for old in evicted {
            info!("Released the report of merge job {}", old);
        }
    }

    pub async fn report(&self, job_id: &str) -> Option<Arc<BatchReport>> {
        self.reports.read().await.reports.get(job_id).cloned()
    }
}

/// Finished reports in completion order.
struct ReportStore {
    capacity: usize,
    order: VecDeque<String>,
    reports: HashMap<String, Arc<BatchReport>>,
}

impl ReportStore {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            reports: HashMap::new(),
        }
    }

    /// Inserts a report and returns the ids of the reports it pushed out.
    fn insert(&mut self, job_id: String, report: Arc<BatchReport>) -> Vec<String> {
        if self.reports.insert(job_id.clone(), report).is_none() {
            self.order.push_back(job_id);
        }
        let mut evicted = Vec::new();
        while self.order.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.reports.remove(&oldest);
            evicted.push(oldest);
        }
        evicted
    }
}

/// A status update for one job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobUpdate {
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
        }
    }
}

/// Applies `JobUpdate`s to the shared state until every sender is dropped.
///
/// A finished job keeps its final status; late updates for it are ignored.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        if jobs.get(&update.job_id).is_some_and(JobStatus::is_finished) {
            debug!("Ignoring update for finished job {}", update.job_id);
            continue;
        }
        jobs.insert(update.job_id, update.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::merge::MergeSummary;

    #[tokio::test]
    async fn updates_are_applied_until_the_job_finishes() {
        let (state, rx) = JobsState::new();
        let updater = tokio::spawn(start_job_updater(state.clone(), rx));
        state.register("job").await;
        assert_eq!(state.status("job").await, Some(JobStatus::Pending));

        let tx = state.tx.clone();
        tx.send(JobUpdate::new(
            "job",
            JobStatus::InProgress {
                processed: 1,
                total: 2,
            },
        ))
        .await
        .unwrap();
        tx.send(JobUpdate::new(
            "job",
            JobStatus::Completed(MergeSummary::default()),
        ))
        .await
        .unwrap();
        tx.send(JobUpdate::new(
            "job",
            JobStatus::InProgress {
                processed: 2,
                total: 2,
            },
        ))
        .await
        .unwrap();

        tx.send(JobUpdate::new("warmup", JobStatus::Pending))
            .await
            .unwrap();
        while state.status("warmup").await.is_none() {
            tokio::task::yield_now().await;
        }
        updater.abort();

        assert_eq!(
            state.status("job").await,
            Some(JobStatus::Completed(MergeSummary::default()))
        );
    }

    #[tokio::test]
    async fn oldest_reports_are_released_beyond_capacity() {
        let (state, _rx) = JobsState::with_retained_reports(2);
        for job_id in ["a", "b", "c"] {
            state.store_report(job_id, BatchReport::default()).await;
        }
        assert!(state.report("a").await.is_none());
        assert!(state.report("b").await.is_some());
        assert!(state.report("c").await.is_some());
    }

    #[tokio::test]
    async fn released_report_memory_is_dropped() {
        let (state, _rx) = JobsState::with_retained_reports(1);
        state.store_report("old", BatchReport::default()).await;
        let weak = Arc::downgrade(&state.report("old").await.unwrap());
        state.store_report("new", BatchReport::default()).await;
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn storing_the_same_job_twice_keeps_one_slot() {
        let mut store = ReportStore::new(2);
        store.insert("a".into(), Arc::new(BatchReport::default()));
        store.insert("a".into(), Arc::new(BatchReport::default()));
        let evicted = store.insert("b".into(), Arc::new(BatchReport::default()));
        assert!(evicted.is_empty());
        assert_eq!(store.order, VecDeque::from(["a".to_string(), "b".to_string()]));
    }
}
