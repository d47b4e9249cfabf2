use serde::{Deserialize, Serialize};

/// Outcome of rendering a single row within a merge job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MergeTaskState {
    /// The row produced a document.
    Rendered { filename: String, size: usize },
    /// The row failed. Contains the rendering engine's reason.
    Failed(String),
}

/// The processing record of a single data row within a merge job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeTask {
    /// The 0-based index of the row in the dataset.
    pub row_index: usize,
    /// The template the row was rendered against.
    pub template_id: String,
    pub state: MergeTaskState,
}

/// Totals of a finished merge job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    /// Rows handed to the renderer.
    pub attempted: usize,
    pub rendered: usize,
    pub failed: usize,
    /// Rows left out because no template was selected for them.
    pub skipped: usize,
    /// The job was stopped before every planned row was attempted.
    pub cancelled: bool,
}

/// A failed row as reported to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRow {
    pub row_number: usize,
    pub reason: String,
}
