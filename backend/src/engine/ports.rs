//! Interfaces of the collaborators the engine drives but does not own:
//! reading tables, previewing templates and rendering filled documents.

use crate::engine::error::{RenderError, TableError, TemplateError};
use common::model::datasource::DataRow;
use std::collections::HashMap;

/// Flat placeholder -> value dictionary handed to a rendering engine.
pub type MergeFields = HashMap<String, String>;

/// Parses spreadsheet-like bytes into rows of named fields.
///
/// The first row's keys define the column order. A table with a header but
/// no data rows yields an empty vector.
pub trait TableReader {
    fn read_table(&self, bytes: &[u8]) -> Result<Vec<DataRow>, TableError>;
}

/// Turns a template into markup for human preview only.
pub trait PreviewRenderer {
    fn to_preview_markup(&self, template: &[u8]) -> Result<String, TemplateError>;
}

/// Substitutes values into a template and serializes the filled document.
///
/// Implementations may mutate the buffer they receive; callers always pass a
/// copy that is not shared with any other call.
pub trait RenderEngine: Send + Sync {
    fn render(&self, template: Vec<u8>, fields: &MergeFields) -> Result<Vec<u8>, RenderError>;
}
