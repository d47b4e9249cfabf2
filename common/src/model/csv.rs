use crate::model::datasource::CellKind;
use serde::{Deserialize, Serialize};

/// Describes one column of a freshly loaded dataset.
///
/// Built from the first data row when a table is uploaded, so the operator can
/// see what each column holds before binding it to a placeholder.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ColumnSummary {
    /// The column header exactly as it appears in the table.
    pub title: String,
    /// The type the reader inferred for the first row's value.
    pub kind: CellKind,
    /// The first row's value rendered as the merge engine would render it.
    pub first_row: Option<String>,
}

/// Result of replacing the current dataset with an uploaded table.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TableUploadReport {
    pub columns: Vec<ColumnSummary>,
    pub row_count: usize,
    /// md5 of the uploaded bytes.
    pub fingerprint: String,
    /// `true` when the bytes are identical to the previous upload.
    pub unchanged: bool,
}
