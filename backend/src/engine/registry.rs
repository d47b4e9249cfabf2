//! # Field Registry
//!
//! Knows which data columns and which placeholders currently exist, and
//! answers whether the operator can start mapping or start generating.

use crate::engine::mapping::MappingStore;
use common::model::place_holder::{PlaceholderName, PlaceholderUsage};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    columns: Vec<String>,
    /// Placeholder sets per template identity, in template load order.
    templates: Vec<(String, Vec<PlaceholderName>)>,
    union: Vec<PlaceholderName>,
    row_count: usize,
    multi_template: bool,
}

impl FieldRegistry {
    pub fn new(multi_template: bool) -> Self {
        Self {
            multi_template,
            ..Self::default()
        }
    }

    pub fn set_columns(&mut self, columns: Vec<String>, row_count: usize) {
        self.columns = columns;
        self.row_count = row_count;
    }

    /// Replaces every template's placeholder set and recomputes the union.
    pub fn set_templates(&mut self, templates: Vec<(String, Vec<PlaceholderName>)>) {
        self.union = {
            let mut seen = HashSet::new();
            templates
                .iter()
                .flat_map(|(_, placeholders)| placeholders.iter())
                .filter(|p| seen.insert(p.as_str()))
                .cloned()
                .collect()
        };
        self.templates = templates;
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Union of placeholders across all templates, first-seen order.
    pub fn placeholders(&self) -> &[PlaceholderName] {
        &self.union
    }

    pub fn has_placeholder(&self, placeholder: &str) -> bool {
        self.union.iter().any(|p| p.as_str() == placeholder)
    }

    pub fn template_ids(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|(id, _)| id.as_str())
    }

    /// Each placeholder with the templates that reference it.
    pub fn usages(&self) -> Vec<PlaceholderUsage> {
        self.union
            .iter()
            .map(|name| PlaceholderUsage {
                name: name.clone(),
                templates: self
                    .templates
                    .iter()
                    .filter(|(_, placeholders)| placeholders.contains(name))
                    .map(|(id, _)| id.clone())
                    .collect(),
            })
            .collect()
    }

    pub fn ready_for_mapping(&self) -> bool {
        !self.columns.is_empty() && !self.union.is_empty()
    }

    pub fn ready_to_generate(&self, mapping: &MappingStore) -> bool {
        if !self.ready_for_mapping() {
            return false;
        }
        let any_bound = self
            .union
            .iter()
            .any(|p| mapping.get_mapping(p.as_str()).is_some());
        if !any_bound {
            return false;
        }
        !self.multi_template || mapping.row_template_count() > 0
    }

    /// Drops mapping entries that no longer point at anything this registry knows.
    pub fn prune(&self, mapping: &mut MappingStore) {
        let placeholders: HashSet<&str> = self.union.iter().map(PlaceholderName::as_str).collect();
        let columns: HashSet<&str> = self.columns.iter().map(String::as_str).collect();
        let templates: HashSet<&str> = self.template_ids().collect();
        mapping.prune(&placeholders, &columns, self.row_count, &templates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ph(names: &[&str]) -> Vec<PlaceholderName> {
        names.iter().filter_map(|n| PlaceholderName::new(*n)).collect()
    }

    #[test]
    fn union_keeps_first_seen_order_across_templates() {
        let mut registry = FieldRegistry::new(true);
        registry.set_templates(vec![
            ("a".into(), ph(&["ten", "ngay"])),
            ("b".into(), ph(&["email", "ten"])),
        ]);
        let union: Vec<&str> = registry.placeholders().iter().map(|p| p.as_str()).collect();
        assert_eq!(union, vec!["ten", "ngay", "email"]);

        let usages = registry.usages();
        assert_eq!(usages[0].templates, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(usages[2].templates, vec!["b".to_string()]);
    }

    #[test]
    fn zero_columns_blocks_mapping() {
        let mut registry = FieldRegistry::new(false);
        registry.set_templates(vec![("t".into(), ph(&["ten"]))]);
        registry.set_columns(Vec::new(), 0);
        assert!(!registry.ready_for_mapping());
    }

    #[test]
    fn zero_placeholders_blocks_mapping() {
        let mut registry = FieldRegistry::new(false);
        registry.set_templates(vec![("t".into(), Vec::new())]);
        registry.set_columns(vec!["name".into()], 1);
        assert!(!registry.ready_for_mapping());
    }

    #[test]
    fn generation_needs_one_bound_placeholder() {
        let mut registry = FieldRegistry::new(false);
        registry.set_templates(vec![("t".into(), ph(&["ten", "email"]))]);
        registry.set_columns(vec!["name".into()], 1);
        let mut mapping = MappingStore::default();
        assert!(registry.ready_for_mapping());
        assert!(!registry.ready_to_generate(&mapping));

        mapping.set_mapping(PlaceholderName::new("ten").unwrap(), Some("name".into()));
        assert!(registry.ready_to_generate(&mapping));
    }

    #[test]
    fn multi_template_generation_needs_a_row_selection() {
        let mut registry = FieldRegistry::new(true);
        registry.set_templates(vec![("t".into(), ph(&["ten"]))]);
        registry.set_columns(vec!["name".into()], 2);
        let mut mapping = MappingStore::default();
        mapping.set_mapping(PlaceholderName::new("ten").unwrap(), Some("name".into()));
        assert!(!registry.ready_to_generate(&mapping));

        mapping.set_row_template(1, Some("t".into()));
        assert!(registry.ready_to_generate(&mapping));
    }
}
