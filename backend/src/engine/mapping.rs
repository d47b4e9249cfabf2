//! # Mapping Store
//!
//! Operator-defined bindings: placeholder -> column, and in multi-template mode
//! row -> template. Absent entries mean "not bound"; nothing is ever stored
//! with an empty value.

use common::model::place_holder::PlaceholderName;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingStore {
    columns: HashMap<PlaceholderName, String>,
    /// Placeholders the operator has set or cleared by hand.
    explicit: HashSet<PlaceholderName>,
    row_templates: BTreeMap<usize, String>,
}

impl MappingStore {
    /// Binds `placeholder` to `column`, or removes the binding when `column`
    /// is `None` or empty. Counts as an explicit operator choice.
    pub fn set_mapping(&mut self, placeholder: PlaceholderName, column: Option<String>) {
        self.explicit.insert(placeholder.clone());
        self.store(placeholder, column);
    }

    pub fn get_mapping(&self, placeholder: &str) -> Option<&str> {
        self.columns.get(placeholder).map(String::as_str)
    }

    /// The column whose name equals `placeholder`, ignoring case.
    pub fn auto_suggest<'a>(placeholder: &str, columns: &'a [String]) -> Option<&'a str> {
        let wanted = placeholder.to_lowercase();
        columns
            .iter()
            .find(|column| column.to_lowercase() == wanted)
            .map(String::as_str)
    }

    /// Pre-populates suggested columns for placeholders the operator has not
    /// touched yet. Explicit choices, including explicit clears, are kept.
    pub fn apply_suggestions(&mut self, placeholders: &[PlaceholderName], columns: &[String]) {
        for placeholder in placeholders {
            if self.explicit.contains(placeholder) || self.columns.contains_key(placeholder) {
                continue;
            }
            if let Some(column) = Self::auto_suggest(placeholder.as_str(), columns) {
                let column = column.to_string();
                self.store(placeholder.clone(), Some(column));
            }
        }
    }

    pub fn set_row_template(&mut self, row_index: usize, template: Option<String>) {
        match template.filter(|t| !t.is_empty()) {
            Some(template) => {
                self.row_templates.insert(row_index, template);
            }
            None => {
                self.row_templates.remove(&row_index);
            }
        }
    }

    pub fn get_row_template(&self, row_index: usize) -> Option<&str> {
        self.row_templates.get(&row_index).map(String::as_str)
    }

    pub fn row_template_count(&self) -> usize {
        self.row_templates.len()
    }

    pub fn row_templates(&self) -> &BTreeMap<usize, String> {
        &self.row_templates
    }

    pub fn bound_count(&self) -> usize {
        self.columns.len()
    }

    /// All placeholder bindings, sorted by placeholder name.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.columns
            .iter()
            .map(|(placeholder, column)| (placeholder.to_string(), column.clone()))
            .collect()
    }

    /// Removes entries referencing placeholders, columns, rows or templates that
    /// no longer exist. Every other entry is kept.
    pub fn prune(
        &mut self,
        placeholders: &HashSet<&str>,
        columns: &HashSet<&str>,
        row_count: usize,
        templates: &HashSet<&str>,
    ) {
        self.columns.retain(|placeholder, column| {
            placeholders.contains(placeholder.as_str()) && columns.contains(column.as_str())
        });
        self.explicit
            .retain(|placeholder| placeholders.contains(placeholder.as_str()));
        self.row_templates
            .retain(|row, template| *row < row_count && templates.contains(template.as_str()));
    }

    /// Frozen copy for a batch run; later edits do not affect it.
    pub fn snapshot(&self) -> MappingStore {
        self.clone()
    }

    fn store(&mut self, placeholder: PlaceholderName, column: Option<String>) {
        match column.filter(|c| !c.is_empty()) {
            Some(column) => {
                self.columns.insert(placeholder, column);
            }
            None => {
                self.columns.remove(&placeholder);
            }
        }
    }
}
