use serde::Deserialize;

/// Binds a placeholder to a column, or clears the binding when `column` is `None`.
#[derive(Deserialize, Debug, Clone)]
pub struct SetPlaceholderMappingRequest {
    pub placeholder: String,
    pub column: Option<String>,
}

/// Selects the template that governs a row, or clears the selection.
#[derive(Deserialize, Debug, Clone)]
pub struct SetRowTemplateRequest {
    pub row_index: usize,
    pub template: Option<String>,
}

/// Request payload for the merge start endpoint.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct StartMergeRequest {
    /// Overrides the configured execution mode for this job.
    #[serde(default)]
    pub parallel: Option<bool>,
}

/// Query of the paged row listing.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RowsQuery {
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}
