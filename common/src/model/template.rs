use crate::model::diagnostics::TemplateDiagnostics;
use crate::model::place_holder::PlaceholderName;
use serde::{Deserialize, Serialize};

/// Outcome of loading one template file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateReport {
    /// Identity used for row selection and filename prefixes (file name without extension).
    pub id: String,
    pub file_name: String,
    pub status: TemplateStatus,
    /// Present when no placeholder could be used from the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<TemplateDiagnostics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TemplateStatus {
    /// The template is loaded and references these placeholders.
    Ready { placeholders: Vec<PlaceholderName> },
    /// The template is loaded but no `{placeholder}` was recognized anywhere in it.
    NoPlaceholdersFound { hint: String },
    /// The container could not be opened; the template was not loaded.
    Unreadable { reason: String, hint: String },
}

impl TemplateStatus {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, TemplateStatus::Unreadable { .. })
    }
}
