//! # Row Renderer
//!
//! Turns one data row into one rendering job and runs it. Each row is an
//! independent unit of work: whatever the rendering engine does with one row
//! cannot leak into another, and a failure is returned as a value.

use crate::engine::error::RenderError;
use crate::engine::filename::OutputNaming;
use crate::engine::mapping::MappingStore;
use crate::engine::ports::{MergeFields, RenderEngine};
use crate::engine::template::Template;
use common::model::datasource::{CellValue, DataRow};
use common::model::place_holder::PlaceholderName;
use log::{debug, warn};

/// A document produced for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub row_index: usize,
    pub template_id: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A row the rendering engine rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub row_index: usize,
    pub template_id: String,
    pub reason: RenderError,
}

impl RowFailure {
    /// 1-based row number, as shown to operators.
    pub fn row_number(&self) -> usize {
        self.row_index + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderResult {
    Rendered(RenderedDocument),
    Failed(RowFailure),
}

impl RenderResult {
    pub fn row_index(&self) -> usize {
        match self {
            RenderResult::Rendered(doc) => doc.row_index,
            RenderResult::Failed(failure) => failure.row_index,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderResult::Rendered(_))
    }
}

/// Everything needed to render one row.
#[derive(Debug, Clone, Copy)]
pub struct RenderJob<'a> {
    pub row_index: usize,
    pub row: &'a DataRow,
    pub template: &'a Template,
    /// Prefix output file names with the template identity.
    pub prefix_with_template: bool,
}

/// Renders a cell the way it is substituted into documents.
///
/// Missing and empty cells become `""`, numbers use a locale-free decimal
/// form, dates are calendar dates without a time.
pub fn coerce(value: Option<&CellValue>) -> String {
    match value {
        None | Some(CellValue::Empty) => String::new(),
        Some(CellValue::Text(text)) => text.clone(),
        Some(CellValue::Number(number)) => format_number(*number),
        Some(CellValue::Date(date)) => date.format("%Y-%m-%d").to_string(),
    }
}

fn format_number(number: f64) -> String {
    if number == 0.0 {
        // Avoids "-0".
        return "0".to_string();
    }
    number.to_string()
}

/// Builds the dictionary for one row: every placeholder of the template is
/// present, unmapped ones with an empty value.
pub fn build_fields(
    placeholders: &[PlaceholderName],
    row: &DataRow,
    mapping: &MappingStore,
) -> MergeFields {
    placeholders
        .iter()
        .map(|placeholder| {
            let value = mapping
                .get_mapping(placeholder.as_str())
                .map(|column| coerce(row.get(column)))
                .unwrap_or_default();
            (placeholder.to_string(), value)
        })
        .collect()
}

pub struct RowRenderer<'a> {
    engine: &'a dyn RenderEngine,
    mapping: &'a MappingStore,
    naming: &'a OutputNaming,
}

impl<'a> RowRenderer<'a> {
    pub fn new(
        engine: &'a dyn RenderEngine,
        mapping: &'a MappingStore,
        naming: &'a OutputNaming,
    ) -> Self {
        Self {
            engine,
            mapping,
            naming,
        }
    }

    pub fn render(&self, job: RenderJob<'_>) -> RenderResult {
        let fields = build_fields(job.template.placeholders(), job.row, self.mapping);
        debug!(
            "Rendering row {} with template `{}` ({} fields)",
            job.row_index + 1,
            job.template.id(),
            fields.len()
        );

        let outcome = self
            .engine
            .render(job.template.fresh_copy(), &fields)
            .and_then(|bytes| {
                if bytes.is_empty() {
                    Err(RenderError::EmptyOutput)
                } else {
                    Ok(bytes)
                }
            });

        match outcome {
            Ok(bytes) => {
                let prefix = job.prefix_with_template.then(|| job.template.id());
                RenderResult::Rendered(RenderedDocument {
                    row_index: job.row_index,
                    template_id: job.template.id().to_string(),
                    filename: self.naming.filename(job.row_index, job.row, prefix),
                    bytes,
                })
            }
            Err(reason) => {
                warn!("Row {} failed: {}", job.row_index + 1, reason);
                RenderResult::Failed(RowFailure {
                    row_index: job.row_index,
                    template_id: job.template.id().to_string(),
                    reason,
                })
            }
        }
    }
}
