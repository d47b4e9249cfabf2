//! Error types of the merge engine.
//!
//! Every condition the engine can report is a variant with structured fields;
//! callers match on variants, never on message text.

use thiserror::Error;

/// Guidance shown when a template container cannot be opened.
pub const UNREADABLE_HINT: &str =
    "Open the file in your word processor and save it again as a .docx document.";

/// Guidance shown when an upload is a legacy binary `.doc` file.
pub const LEGACY_DOC_HINT: &str = "This is a .doc file (older Word format); only .docx is supported. \
     In Word choose File > Save As > Word Document (.docx) and upload the new file.";

/// Guidance shown when a template opened fine but holds no placeholders.
pub const NO_PLACEHOLDERS_HINT: &str = "Write placeholders as {placeholder_name}, typed in one go \
     and without formatting changes inside the braces.";

/// Errors raised while opening or inspecting a template container.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    /// The bytes are not a readable document container.
    #[error("template could not be opened: {reason}")]
    Unreadable { reason: String },

    /// More than one template was offered while the session holds exactly one.
    #[error("single-template mode accepts one template, got {count}")]
    TooManyTemplates { count: usize },
}

/// Errors raised by a tabular reader.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("table could not be read: {reason}")]
    Unreadable { reason: String },
}

/// Errors raised by the rendering engine for a single row.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    /// An opening brace without a matching closing brace.
    #[error("unclosed tag `{{{fragment}` in {part}")]
    UnclosedTag { part: String, fragment: String },

    /// A closing brace without a matching opening brace.
    #[error("unopened tag `{fragment}}}` in {part}")]
    UnopenedTag { part: String, fragment: String },

    /// The template container or one of its parts could not be processed.
    #[error("malformed template: {reason}")]
    Malformed { reason: String },

    /// The engine produced a zero-byte document.
    #[error("rendered document is empty")]
    EmptyOutput,
}

/// Errors raised when editing the mapping store through a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("unknown placeholder `{placeholder}`")]
    UnknownPlaceholder { placeholder: String },

    #[error("unknown column `{column}`")]
    UnknownColumn { column: String },

    #[error("unknown template `{template}`")]
    UnknownTemplate { template: String },

    #[error("row {row_index} is out of range (dataset has {row_count} rows)")]
    RowOutOfRange { row_index: usize, row_count: usize },

    #[error("row templates are only available in multi-template mode")]
    SingleTemplateMode,
}

/// Whole-batch setup errors, raised before any row is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("the dataset has no rows")]
    NoRows,

    #[error("no template is loaded")]
    NoTemplates,

    #[error("no placeholder is mapped to a column")]
    NothingMapped,

    #[error("no row has a template selected")]
    NoRowTemplates,
}

/// Errors raised while packaging rendered documents into one archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
