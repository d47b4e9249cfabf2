//! # Batch Orchestrator
//!
//! Drives the Row Renderer over every planned row and collects the results in
//! row order. A batch always runs to `Completed`; individual rows carry their
//! own failures.

use crate::engine::error::RenderError;
use crate::engine::filename::OutputNaming;
use crate::engine::mapping::MappingStore;
use crate::engine::ports::RenderEngine;
use crate::engine::renderer::{RenderJob, RenderResult, RenderedDocument, RowFailure, RowRenderer};
use crate::engine::template::Template;
use common::model::datasource::DataRow;
use common::model::merge::{FailedRow, MergeSummary, MergeTask, MergeTaskState};
use log::{debug, info};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// One row scheduled for rendering.
#[derive(Debug, Clone)]
pub struct PlannedRow {
    pub row_index: usize,
    pub template: Arc<Template>,
}

/// A frozen description of a batch: the rows, the template each row uses and
/// the mapping as it was when the batch was planned.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub rows: Arc<Vec<DataRow>>,
    pub items: Vec<PlannedRow>,
    pub mapping: MappingStore,
    pub naming: OutputNaming,
    pub prefix_with_template: bool,
    /// Rows left out of the plan because no template was selected for them.
    pub skipped: usize,
}

impl BatchPlan {
    pub fn total(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchState {
    #[default]
    Idle,
    Running { processed: usize, total: usize },
    Completed { attempted: usize, cancelled: bool },
}

/// Cooperative cancellation, checked between rows.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Ordered results of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub results: Vec<RenderResult>,
    pub planned: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn successes(&self) -> impl Iterator<Item = &RenderedDocument> {
        self.results.iter().filter_map(|result| match result {
            RenderResult::Rendered(doc) => Some(doc),
            RenderResult::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowFailure> {
        self.results.iter().filter_map(|result| match result {
            RenderResult::Failed(failure) => Some(failure),
            RenderResult::Rendered(_) => None,
        })
    }

    pub fn summary(&self) -> MergeSummary {
        let rendered = self.successes().count();
        MergeSummary {
            attempted: self.results.len(),
            rendered,
            failed: self.results.len() - rendered,
            skipped: self.skipped,
            cancelled: self.cancelled,
        }
    }

    pub fn tasks(&self) -> Vec<MergeTask> {
        self.results
            .iter()
            .map(|result| match result {
                RenderResult::Rendered(doc) => MergeTask {
                    row_index: doc.row_index,
                    template_id: doc.template_id.clone(),
                    state: MergeTaskState::Rendered {
                        filename: doc.filename.clone(),
                        size: doc.bytes.len(),
                    },
                },
                RenderResult::Failed(failure) => MergeTask {
                    row_index: failure.row_index,
                    template_id: failure.template_id.clone(),
                    state: MergeTaskState::Failed(failure.reason.to_string()),
                },
            })
            .collect()
    }

    pub fn failed_rows(&self) -> Vec<FailedRow> {
        self.failures()
            .map(|failure| FailedRow {
                row_number: failure.row_number(),
                reason: failure.reason.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct BatchOrchestrator {
    state: Mutex<BatchState>,
    cancel: CancelFlag,
}

impl BatchOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(cancel: CancelFlag) -> Self {
        Self {
            state: Mutex::new(BatchState::Idle),
            cancel,
        }
    }

    pub fn state(&self) -> BatchState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: BatchState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Renders every planned row one at a time, in ascending row order.
    ///
    /// `progress` is called after each row with a strictly increasing
    /// `processed` count.
    pub fn run(
        &self,
        plan: &BatchPlan,
        engine: &dyn RenderEngine,
        progress: &mut dyn FnMut(Progress),
    ) -> BatchReport {
        let total = plan.total();
        info!("Starting batch of {} rows ({} skipped)", total, plan.skipped);
        self.set_state(BatchState::Running { processed: 0, total });

        let renderer = RowRenderer::new(engine, &plan.mapping, &plan.naming);
        let mut results = Vec::with_capacity(total);
        let mut cancelled = false;

        for item in &plan.items {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            results.push(render_item(&renderer, plan, item));
            let processed = results.len();
            self.set_state(BatchState::Running { processed, total });
            progress(Progress { processed, total });
        }

        self.finish(plan, results, cancelled)
    }

    /// Renders rows on the rayon pool. Results are returned in row order and
    /// progress is reported monotonically, exactly as with [`run`](Self::run).
    pub fn run_parallel(
        &self,
        plan: &BatchPlan,
        engine: &dyn RenderEngine,
        progress: &(dyn Fn(Progress) + Sync),
    ) -> BatchReport {
        let total = plan.total();
        info!("Starting parallel batch of {} rows ({} skipped)", total, plan.skipped);
        self.set_state(BatchState::Running { processed: 0, total });

        let renderer = RowRenderer::new(engine, &plan.mapping, &plan.naming);
        let processed = Mutex::new(0usize);

        let outcomes: Vec<Option<RenderResult>> = plan
            .items
            .par_iter()
            .map(|item| {
                if self.cancel.is_cancelled() {
                    return None;
                }
                let result = render_item(&renderer, plan, item);
                let mut count = processed.lock().unwrap_or_else(PoisonError::into_inner);
                *count += 1;
                self.set_state(BatchState::Running {
                    processed: *count,
                    total,
                });
                progress(Progress {
                    processed: *count,
                    total,
                });
                Some(result)
            })
            .collect();

        let cancelled = outcomes.iter().any(Option::is_none);
        let results = outcomes.into_iter().flatten().collect();
        self.finish(plan, results, cancelled)
    }

    fn finish(&self, plan: &BatchPlan, results: Vec<RenderResult>, cancelled: bool) -> BatchReport {
        let report = BatchReport {
            planned: plan.total(),
            skipped: plan.skipped,
            cancelled,
            results,
        };
        let summary = report.summary();
        info!(
            "Batch completed: {} rendered, {} failed{}",
            summary.rendered,
            summary.failed,
            if cancelled { " (cancelled)" } else { "" }
        );
        self.set_state(BatchState::Completed {
            attempted: summary.attempted,
            cancelled,
        });
        report
    }
}

fn render_item(renderer: &RowRenderer<'_>, plan: &BatchPlan, item: &PlannedRow) -> RenderResult {
    match plan.rows.get(item.row_index) {
        Some(row) => renderer.render(RenderJob {
            row_index: item.row_index,
            row,
            template: &item.template,
            prefix_with_template: plan.prefix_with_template,
        }),
        None => {
            // Plans are built from the same row snapshot they carry.
            debug!("Row {} missing from plan snapshot", item.row_index + 1);
            RenderResult::Failed(RowFailure {
                row_index: item.row_index,
                template_id: item.template.id().to_string(),
                reason: RenderError::Malformed {
                    reason: "row is missing from the dataset".to_string(),
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ports::MergeFields;
    use chrono::NaiveDate;
    use common::model::place_holder::PlaceholderName;

    /// Fails every row whose `ten` value is `boom`.
    struct PickyEngine;

    impl RenderEngine for PickyEngine {
        fn render(&self, template: Vec<u8>, fields: &MergeFields) -> Result<Vec<u8>, RenderError> {
            if fields.get("ten").map(String::as_str) == Some("boom") {
                return Err(RenderError::UnclosedTag {
                    part: "word/document.xml".into(),
                    fragment: "ten".into(),
                });
            }
            Ok(template)
        }
    }

    fn plan(names: &[&str]) -> BatchPlan {
        let template = Arc::new(Template::new(
            "t.docx",
            b"tpl".to_vec(),
            vec![PlaceholderName::new("ten").unwrap()],
        ));
        let rows: Vec<DataRow> = names.iter().map(|n| DataRow::new().with("name", *n)).collect();
        let mut mapping = MappingStore::default();
        mapping.set_mapping(PlaceholderName::new("ten").unwrap(), Some("name".into()));
        BatchPlan {
            items: (0..rows.len())
                .map(|row_index| PlannedRow {
                    row_index,
                    template: template.clone(),
                })
                .collect(),
            rows: Arc::new(rows),
            mapping,
            naming: OutputNaming::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
            prefix_with_template: false,
            skipped: 0,
        }
    }

    #[test]
    fn failing_row_does_not_stop_the_batch() {
        let orchestrator = BatchOrchestrator::new();
        assert_eq!(orchestrator.state(), BatchState::Idle);

        let mut seen = Vec::new();
        let report = orchestrator.run(&plan(&["An", "boom", "Chi"]), &PickyEngine, &mut |p| {
            seen.push(p)
        });

        assert_eq!(report.results.len(), 3);
        assert!(report.results[0].is_rendered());
        assert!(!report.results[1].is_rendered());
        assert!(report.results[2].is_rendered());
        assert_eq!(report.failed_rows()[0].row_number, 2);
        assert_eq!(
            orchestrator.state(),
            BatchState::Completed {
                attempted: 3,
                cancelled: false
            }
        );
        let processed: Vec<usize> = seen.iter().map(|p| p.processed).collect();
        assert_eq!(processed, vec![1, 2, 3]);
        assert!(seen.iter().all(|p| p.total == 3));
    }

    #[test]
    fn results_keep_row_order() {
        let report =
            BatchOrchestrator::new().run(&plan(&["An", "Binh", "Chi"]), &PickyEngine, &mut |_| {});
        let names: Vec<&str> = report.successes().map(|d| d.filename.as_str()).collect();
        assert_eq!(
            names,
            vec!["An_2024-01-05.docx", "Binh_2024-01-05.docx", "Chi_2024-01-05.docx"]
        );
    }

    #[test]
    fn parallel_run_matches_sequential_run() {
        let names: Vec<String> = (0..40)
            .map(|i| if i % 7 == 3 { "boom".into() } else { format!("p{}", i) })
            .collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let plan = plan(&refs);

        let sequential = BatchOrchestrator::new().run(&plan, &PickyEngine, &mut |_| {});
        let seen = Mutex::new(Vec::new());
        let parallel = BatchOrchestrator::new().run_parallel(&plan, &PickyEngine, &|p| {
            seen.lock().unwrap().push(p.processed)
        });

        assert_eq!(sequential, parallel);
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, (1..=40).collect::<Vec<_>>());
    }

    #[test]
    fn cancellation_stops_between_rows() {
        let cancel = CancelFlag::default();
        let orchestrator = BatchOrchestrator::with_cancel(cancel.clone());
        let report = orchestrator.run(&plan(&["An", "Binh", "Chi"]), &PickyEngine, &mut |p| {
            if p.processed == 1 {
                cancel.cancel();
            }
        });

        assert_eq!(report.results.len(), 1);
        assert!(report.cancelled);
        assert_eq!(report.summary().attempted, 1);
        assert_eq!(
            orchestrator.state(),
            BatchState::Completed {
                attempted: 1,
                cancelled: true
            }
        );
    }
}
