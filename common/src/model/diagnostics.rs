use serde::{Deserialize, Serialize};

/// Bracket pairs counted in a template's visible text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStyle {
    Curly,
    Square,
    Angle,
    Round,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketCount {
    pub style: BracketStyle,
    pub count: usize,
}

/// What a template looks like when no placeholder could be recognized in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDiagnostics {
    /// Bracketed fragments of the visible text, per style. Styles with no
    /// match are left out.
    pub brackets: Vec<BracketCount>,
    /// Up to five `{...}` fragments of the raw markup. A fragment holding
    /// tags shows a placeholder broken up by formatting.
    pub markup_fragments: Vec<String>,
    pub has_body: bool,
    pub has_paragraphs: bool,
    pub has_text: bool,
    /// Beginning of the visible text.
    pub text_sample: String,
    /// `{...}` fragments of the visible text.
    pub text_candidates: Vec<String>,
    /// The file is a legacy binary `.doc` rather than a `.docx` container.
    pub legacy_doc: bool,
}

/// Next step suggested to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    UploadData,
    UploadTemplate,
    AddPlaceholders,
    MapPlaceholders,
    SelectRowTemplates,
    ReadyToGenerate,
}

/// Overall state of the session with mapping coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDiagnostics {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub template_count: usize,
    pub placeholder_count: usize,
    pub mapped_count: usize,
    /// Placeholders without a column, in registry order.
    pub unmapped: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}
