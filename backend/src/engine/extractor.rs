//! # Placeholder Extractor
//!
//! Discovers the `{placeholder}` names a template references.
//!
//! A word processor is free to split what the reader sees as `{ho_ten}` into
//! several runs (`{ho_` + `ten}`) with markup in between, so the scan is a
//! heuristic made of several passes:
//!
//! 1. the raw markup of the main document part;
//! 2. the same markup with every tag stripped, which rejoins split runs;
//! 3. only when 1 and 2 found nothing: every other XML part of the container
//!    (headers, footers, notes...).
//!
//! Names are reported with character references resolved (`{R&amp;D}` in the
//! markup is the placeholder `R&D`), which is how the rendering engine and the
//! preview read them too.
//!
//! The heuristic sits behind [`PlaceholderScanner`] so it can be swapped for a
//! markup-aware parser without touching callers.

use crate::engine::container::{Container, MAIN_PART};
use crate::engine::error::TemplateError;
use crate::engine::xml::decode_text;
use common::model::place_holder::PlaceholderName;
use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Result of scanning a whole template container.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateScan {
    pub placeholders: Vec<PlaceholderName>,
    /// Set when the placeholders came from the fallback search of other parts.
    pub from_secondary_parts: bool,
}

/// Non-fatal guidance produced by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateNotice {
    /// The container opened fine but no placeholder was recognized.
    NoPlaceholdersFound,
}

impl TemplateScan {
    pub fn notice(&self) -> Option<TemplateNotice> {
        self.placeholders
            .is_empty()
            .then_some(TemplateNotice::NoPlaceholdersFound)
    }
}

/// Extracts placeholder names from template content.
pub trait PlaceholderScanner: Send + Sync {
    /// Placeholders referenced by one markup string, first-seen order, no duplicates.
    fn extract(&self, markup: &str) -> Vec<PlaceholderName>;

    /// Placeholders referenced by a whole template container.
    fn scan_container(&self, bytes: &[u8]) -> Result<TemplateScan, TemplateError>;
}

/// The regex-based multi-pass heuristic described in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexScanner;

impl PlaceholderScanner for RegexScanner {
    fn extract(&self, markup: &str) -> Vec<PlaceholderName> {
        extract(markup)
    }

    fn scan_container(&self, bytes: &[u8]) -> Result<TemplateScan, TemplateError> {
        scan_container(bytes)
    }
}

/// Ordered, deduplicating accumulator of placeholder names.
#[derive(Default)]
struct Collected {
    seen: HashSet<String>,
    names: Vec<PlaceholderName>,
}

impl Collected {
    fn push_captures(&mut self, text: &str) {
        for caps in PLACEHOLDER_RE.captures_iter(text) {
            let raw = &caps[1];
            // Angle brackets mean the match spanned markup, not a placeholder.
            if raw.contains('<') || raw.contains('>') {
                continue;
            }
            let decoded = decode_text(raw);
            let name = decoded.trim();
            if self.seen.contains(name) {
                continue;
            }
            if let Some(placeholder) = PlaceholderName::new(name) {
                self.seen.insert(name.to_string());
                self.names.push(placeholder);
            }
        }
    }
}

/// Runs the raw-markup pass and the tag-stripped pass over `markup`.
pub fn extract(markup: &str) -> Vec<PlaceholderName> {
    let mut collected = Collected::default();
    collected.push_captures(markup);
    let text = TAG_RE.replace_all(markup, "");
    collected.push_captures(&text);
    collected.names
}

/// Opens the container and runs every pass, falling back to secondary parts.
pub fn scan_container(bytes: &[u8]) -> Result<TemplateScan, TemplateError> {
    let container = Container::open(bytes).map_err(|e| TemplateError::Unreadable {
        reason: e.to_string(),
    })?;

    let main = container
        .text_part(MAIN_PART)
        .ok_or_else(|| TemplateError::Unreadable {
            reason: format!("missing main document part `{}`", MAIN_PART),
        })?;

    let placeholders = extract(&main);
    if !placeholders.is_empty() {
        return Ok(TemplateScan {
            placeholders,
            from_secondary_parts: false,
        });
    }

    debug!("No placeholders in {}, searching other parts", MAIN_PART);
    let mut collected = Collected::default();
    for name in container.xml_part_names().filter(|name| *name != MAIN_PART) {
        if let Some(markup) = container.text_part(name) {
            for placeholder in extract(&markup) {
                if collected.seen.insert(placeholder.as_str().to_string()) {
                    debug!("Found placeholder `{}` in {}", placeholder, name);
                    collected.names.push(placeholder);
                }
            }
        }
    }

    Ok(TemplateScan {
        from_secondary_parts: !collected.names.is_empty(),
        placeholders: collected.names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn names(found: &[PlaceholderName]) -> Vec<&str> {
        found.iter().map(PlaceholderName::as_str).collect()
    }

    fn docx(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<'_, ()> = FileOptions::default();
        for (name, body) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn keeps_first_seen_order_without_duplicates() {
        let found = extract("<w:t>{b} and {a} then {b} again {a}</w:t>");
        assert_eq!(names(&found), vec!["b", "a"]);
    }

    #[test]
    fn names_are_case_sensitive() {
        let found = extract("<w:t>{Name} {name}</w:t>");
        assert_eq!(names(&found), vec!["Name", "name"]);
    }

    #[test]
    fn trims_whitespace_inside_braces() {
        let found = extract("<w:t>{  ho_ten }</w:t>");
        assert_eq!(names(&found), vec!["ho_ten"]);
    }

    #[test]
    fn rejoins_placeholders_split_across_runs() {
        let markup = r#"<w:r><w:t>{ho_</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>ten}</w:t></w:r>"#;
        let found = extract(markup);
        assert_eq!(names(&found), vec!["ho_ten"]);
    }

    #[test]
    fn discards_blank_names() {
        assert!(extract("<w:t>{ } {}</w:t>").is_empty());
    }

    #[test]
    fn nested_braces_match_innermost_span() {
        let found = extract("<w:t>{outer {inner} x}</w:t>");
        assert_eq!(names(&found), vec!["inner"]);
    }

    #[test]
    fn raw_pass_results_come_before_stripped_pass_results() {
        let markup = r#"<w:t>{split</w:t><w:t>ted}</w:t><w:t>{whole}</w:t>"#;
        let found = extract(markup);
        assert_eq!(names(&found), vec!["whole", "splitted"]);
    }

    #[test]
    fn character_references_are_resolved_in_names() {
        let found = extract("<w:t>{R&amp;D} {&#x41;ge} {a&lt;b} {R&#38;D}</w:t>");
        assert_eq!(names(&found), vec!["R&D", "Age", "a<b"]);
    }

    #[test]
    fn non_zip_is_unreadable() {
        let err = scan_container(b"PK?not really").unwrap_err();
        assert!(matches!(err, TemplateError::Unreadable { .. }));
    }

    #[test]
    fn zip_without_main_part_is_unreadable() {
        let bytes = docx(&[("content.xml", "<office:document>{x}</office:document>")]);
        let err = scan_container(&bytes).unwrap_err();
        assert!(matches!(err, TemplateError::Unreadable { .. }));
    }

    #[test]
    fn document_without_placeholders_is_a_notice_not_an_error() {
        let bytes = docx(&[(MAIN_PART, "<w:document><w:t>Hello</w:t></w:document>")]);
        let scan = scan_container(&bytes).unwrap();
        assert!(scan.placeholders.is_empty());
        assert_eq!(scan.notice(), Some(TemplateNotice::NoPlaceholdersFound));
    }

    #[test]
    fn falls_back_to_headers_and_footers() {
        let bytes = docx(&[
            (MAIN_PART, "<w:document><w:t>Body</w:t></w:document>"),
            ("word/header1.xml", "<w:hdr><w:t>{company}</w:t></w:hdr>"),
            ("word/footer1.xml", "<w:ftr><w:t>{page_note} {company}</w:t></w:ftr>"),
        ]);
        let scan = scan_container(&bytes).unwrap();
        assert_eq!(names(&scan.placeholders), vec!["company", "page_note"]);
        assert!(scan.from_secondary_parts);
        assert_eq!(scan.notice(), None);
    }

    #[test]
    fn secondary_parts_ignored_when_body_has_placeholders() {
        let bytes = docx(&[
            (MAIN_PART, "<w:document><w:t>{ten}</w:t></w:document>"),
            ("word/header1.xml", "<w:hdr><w:t>{company}</w:t></w:hdr>"),
        ]);
        let scan = scan_container(&bytes).unwrap();
        assert_eq!(names(&scan.placeholders), vec!["ten"]);
        assert!(!scan.from_secondary_parts);
    }
}
