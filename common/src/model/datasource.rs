use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A column header taken verbatim from the tabular input.
pub type ColumnName = String;

/// A single scalar cell of a data row.
///
/// Readers decide the variant; the merge engine only ever turns it back into a
/// string when a row is bound to a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    /// `true` for `Empty` and for text that is blank once trimmed.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) | CellValue::Date(_) => false,
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Empty => CellKind::Empty,
            CellValue::Text(_) => CellKind::Text,
            CellValue::Number(_) => CellKind::Number,
            CellValue::Date(_) => CellKind::Date,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

/// The inferred type of a cell, reported back to clients with column summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Text,
    Number,
    Date,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CellKind::Empty => "empty",
            CellKind::Text => "text",
            CellKind::Number => "number",
            CellKind::Date => "date",
        };
        f.write_str(label)
    }
}

/// One record of the dataset: an ordered mapping from column name to value.
///
/// Column order is the order the reader produced, which for the first row of a
/// dataset defines the column list offered for mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    cells: Vec<(ColumnName, CellValue)>,
}

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a cell, replacing the value in place if the column already exists.
    pub fn insert(&mut self, column: impl Into<ColumnName>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Builder form of [`DataRow::insert`].
    pub fn with(mut self, column: impl Into<ColumnName>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<C, V> FromIterator<(C, V)> for DataRow
where
    C: Into<ColumnName>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut row = DataRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position_on_overwrite() {
        let mut row = DataRow::new().with("name", "An").with("date", "x");
        row.insert("name", "Binh");

        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["name", "date"]);
        assert_eq!(row.get("name"), Some(&CellValue::Text("Binh".into())));
    }

    #[test]
    fn blank_text_counts_as_blank() {
        assert!(CellValue::Text("   ".into()).is_blank());
        assert!(CellValue::Empty.is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn cell_value_serializes_with_tag() {
        let json = serde_json::to_string(&CellValue::Number(3.5)).unwrap();
        assert_eq!(json, r#"{"type":"Number","value":3.5}"#);
    }
}
