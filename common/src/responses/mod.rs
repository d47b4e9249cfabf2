use crate::model::place_holder::PlaceholderUsage;
use crate::model::template::TemplateReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of the operator-facing mapping state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MappingView {
    pub columns: Vec<String>,
    pub placeholders: Vec<PlaceholderUsage>,
    /// Placeholder -> column, explicit and pre-populated entries alike.
    pub mapping: BTreeMap<String, String>,
    /// Placeholder -> column a case-insensitive name match would pick.
    pub suggestions: BTreeMap<String, String>,
    /// Row index -> template identity (multi-template mode only).
    pub row_templates: BTreeMap<usize, String>,
    pub ready_for_mapping: bool,
    pub ready_to_generate: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TemplatesView {
    pub templates: Vec<TemplateReport>,
    pub placeholders: Vec<PlaceholderUsage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StartMergeResponse {
    pub job_id: String,
}

/// One data row as shown to the operator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RowView {
    pub row_index: usize,
    /// Cell values rendered as they are substituted, aligned with `RowsPage::columns`.
    pub values: Vec<String>,
    /// Selected template (multi-template mode only).
    pub template: Option<String>,
}

/// A window over the current dataset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RowsPage {
    pub columns: Vec<String>,
    /// Rows in the whole dataset.
    pub total: usize,
    pub offset: usize,
    pub rows: Vec<RowView>,
}
