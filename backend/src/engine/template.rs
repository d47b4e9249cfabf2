use crate::engine::error::TemplateError;
use crate::engine::extractor::{PlaceholderScanner, TemplateScan};
use common::model::place_holder::PlaceholderName;
use std::path::Path;
use std::sync::Arc;

/// A loaded template: immutable container bytes plus the placeholders found in them.
///
/// The bytes are shared between every row of a batch and are never handed to a
/// rendering engine directly; see [`Template::fresh_copy`].
#[derive(Debug, Clone)]
pub struct Template {
    id: String,
    file_name: String,
    content: Arc<[u8]>,
    placeholders: Vec<PlaceholderName>,
}

impl Template {
    pub fn new(
        file_name: impl Into<String>,
        content: impl Into<Arc<[u8]>>,
        placeholders: Vec<PlaceholderName>,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            id: template_id(&file_name),
            file_name,
            content: content.into(),
            placeholders,
        }
    }

    /// Scans `content` and builds the template from what was found.
    pub fn load(
        file_name: impl Into<String>,
        content: Vec<u8>,
        scanner: &dyn PlaceholderScanner,
    ) -> Result<(Self, TemplateScan), TemplateError> {
        let scan = scanner.scan_container(&content)?;
        let template = Self::new(file_name, content, scan.placeholders.clone());
        Ok((template, scan))
    }

    /// File name without its extension.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// An independent copy of the container bytes for one rendering call.
    pub fn fresh_copy(&self) -> Vec<u8> {
        self.content.to_vec()
    }

    pub fn placeholders(&self) -> &[PlaceholderName] {
        &self.placeholders
    }
}

/// Derives a template identity from its file name: the name without extension.
pub fn template_id(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name)
        .to_string()
}
