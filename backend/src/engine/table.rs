//! CSV implementation of [`TableReader`].

use crate::engine::error::TableError;
use crate::engine::ports::TableReader;
use chrono::NaiveDate;
use common::model::datasource::{CellValue, DataRow};
use csv::ReaderBuilder;
use std::collections::HashSet;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Reads UTF-8 CSV with a header line. The delimiter is picked from the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableReader;

impl TableReader for CsvTableReader {
    fn read_table(&self, bytes: &[u8]) -> Result<Vec<DataRow>, TableError> {
        let text = std::str::from_utf8(bytes).map_err(|e| TableError::Unreadable {
            reason: format!("not valid UTF-8: {}", e),
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let header_line = text
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| TableError::Unreadable {
                reason: "the file has no header line".to_string(),
            })?;
        let delimiter = detect_delimiter(header_line);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = reader.records();
        let header = loop {
            match records.next() {
                Some(record) => {
                    let record = record.map_err(unreadable)?;
                    if !is_blank(&record) {
                        break record;
                    }
                }
                None => return Ok(Vec::new()),
            }
        };
        let columns = unique_headers(header.iter().map(normalize_cell));

        let mut rows = Vec::new();
        for record in records {
            let record = record.map_err(unreadable)?;
            if is_blank(&record) {
                continue;
            }
            let row: DataRow = columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value = record.get(i).map(normalize_cell).unwrap_or_default();
                    (column.clone(), infer_value(&value))
                })
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }
}

fn unreadable(e: csv::Error) -> TableError {
    TableError::Unreadable {
        reason: e.to_string(),
    }
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

/// Most frequent candidate delimiter in the header; `,` on a tie or when none appear.
pub fn detect_delimiter(header: &str) -> u8 {
    let mut best = b',';
    let mut best_count = 0;
    for candidate in CANDIDATE_DELIMITERS {
        let count = header.bytes().filter(|b| *b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Trims, drops one pair of outer quotes and turns non-breaking spaces into spaces.
pub fn normalize_cell(cell: &str) -> String {
    let s = cell.trim();
    let s = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s);
    s.replace('\u{00A0}', " ").trim().to_string()
}

/// Empty titles become `column_<n>`; repeated titles get `_1`, `_2`, ... suffixes.
fn unique_headers(titles: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::new();
    for (i, title) in titles.enumerate() {
        let base = if title.is_empty() {
            format!("column_{}", i + 1)
        } else {
            title
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        seen.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}

/// Types a normalized cell.
///
/// Digit strings with a leading zero (`007`, phone numbers) stay text so no
/// digits are lost on substitution.
pub fn infer_value(value: &str) -> CellValue {
    if value.is_empty() {
        return CellValue::Empty;
    }
    if keeps_leading_zero(value) {
        return CellValue::Text(value.to_string());
    }
    if let Ok(number) = value.parse::<f64>() {
        if number.is_finite() && value.bytes().any(|b| b.is_ascii_digit()) {
            return CellValue::Number(number);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return CellValue::Date(date);
        }
    }
    CellValue::Text(value.to_string())
}

fn keeps_leading_zero(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    digits.len() > 1
        && digits.starts_with('0')
        && !digits.starts_with("0.")
        && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Vec<DataRow> {
        CsvTableReader.read_table(text.as_bytes()).unwrap()
    }

    #[test]
    fn picks_the_header_delimiter() {
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a\tb"), b'\t');
        assert_eq!(detect_delimiter("a|b|c,d"), b'|');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn reads_semicolon_table_with_bom() {
        let rows = read("\u{feff}name;amount;date\nAn;42;2024-01-05\nBinh;1.5;2024/02/01\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["name", "amount", "date"]);
        assert_eq!(rows[0].get("amount"), Some(&CellValue::Number(42.0)));
        assert_eq!(
            rows[1].get("date"),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()))
        );
    }

    #[test]
    fn header_only_table_has_no_rows() {
        assert!(read("name,email\n").is_empty());
    }

    #[test]
    fn blank_lines_are_skipped_and_short_rows_padded() {
        let rows = read("name,email\n\nAn\n,,\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("email"), Some(&CellValue::Empty));
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let rows = read("name,name,\nA,B,C\n");
        let columns: Vec<&str> = rows[0].columns().collect();
        assert_eq!(columns, vec!["name", "name_1", "column_3"]);
    }

    #[test]
    fn leading_zero_digits_stay_text() {
        assert_eq!(infer_value("0123"), CellValue::Text("0123".into()));
        assert_eq!(infer_value("0.5"), CellValue::Number(0.5));
        assert_eq!(infer_value("0"), CellValue::Number(0.0));
        assert_eq!(infer_value("NaN"), CellValue::Text("NaN".into()));
    }

    #[test]
    fn quoted_cells_with_nbsp_are_normalized() {
        assert_eq!(normalize_cell(" 'Nguyễn\u{00A0}An' "), "Nguyễn An");
        let rows = read("name,city\n\"Tran, B\",Hue\n");
        assert_eq!(rows[0].get("name"), Some(&CellValue::Text("Tran, B".into())));
    }

    #[test]
    fn invalid_utf8_is_unreadable() {
        let err = CsvTableReader.read_table(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, TableError::Unreadable { .. }));
    }
}
