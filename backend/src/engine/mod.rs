//! The merge engine: placeholder extraction, mapping, per-row rendering and
//! batch orchestration, plus the default `.docx`/CSV collaborators.
//!
//! Nothing in here knows about HTTP. The host shell drives a [`MergeSession`]
//! and hands batch plans to a [`BatchOrchestrator`] on a blocking thread.

pub mod archive;
pub mod batch;
pub mod container;
pub mod diagnostics;
pub mod docx;
pub mod error;
pub mod extractor;
pub mod filename;
pub mod mapping;
pub mod ports;
pub mod preview;
pub mod registry;
pub mod renderer;
pub mod session;
pub mod table;
pub mod template;
pub mod xml;

pub use batch::{BatchOrchestrator, BatchPlan, BatchReport, BatchState, CancelFlag, Progress};
pub use docx::DocxEngine;
pub use error::{ArchiveError, BatchError, MappingError, RenderError, TableError, TemplateError};
pub use extractor::{PlaceholderScanner, RegexScanner, TemplateNotice, TemplateScan};
pub use mapping::MappingStore;
pub use ports::{MergeFields, PreviewRenderer, RenderEngine, TableReader};
pub use preview::HtmlPreview;
pub use renderer::{RenderResult, RenderedDocument, RowFailure};
pub use session::{MergeOptions, MergeSession};
pub use table::CsvTableReader;
pub use template::Template;
