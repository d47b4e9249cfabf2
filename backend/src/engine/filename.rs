//! Output file names for rendered rows.
//!
//! Format: `[template_]ident_YYYY-MM-DD.<ext>`, where `ident` is the first
//! non-blank value of an identifying column, or `document_<row number>`.

use crate::engine::renderer::coerce;
use chrono::NaiveDate;
use common::model::datasource::DataRow;

/// Columns tried, in order, for a value that identifies the row's subject.
pub const DEFAULT_IDENTIFYING_COLUMNS: [&str; 5] =
    ["name", "Name", "Họ và tên", "Họ và tên ", "STT"];

const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

#[derive(Debug, Clone, PartialEq)]
pub struct OutputNaming {
    pub identifying_columns: Vec<String>,
    pub extension: String,
    pub date_stamp: NaiveDate,
}

impl OutputNaming {
    pub fn new(date_stamp: NaiveDate) -> Self {
        Self {
            identifying_columns: DEFAULT_IDENTIFYING_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            extension: "docx".to_string(),
            date_stamp,
        }
    }

    pub fn filename(&self, row_index: usize, row: &DataRow, template_prefix: Option<&str>) -> String {
        let ident = self
            .identifying_value(row)
            .unwrap_or_else(|| format!("document_{}", row_index + 1));
        let stamp = self.date_stamp.format("%Y-%m-%d");
        match template_prefix {
            Some(prefix) => format!("{}_{}_{}.{}", prefix, ident, stamp, self.extension),
            None => format!("{}_{}.{}", ident, stamp, self.extension),
        }
    }

    fn identifying_value(&self, row: &DataRow) -> Option<String> {
        self.identifying_columns
            .iter()
            .filter_map(|column| row.get(column))
            .find(|value| !value.is_blank())
            .map(|value| sanitize(&coerce(Some(value))))
    }
}

/// Replaces characters that are invalid in file names and collapses whitespace.
pub fn sanitize(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
