//! Tabular data sources feeding the merge.

pub mod csv;
pub mod rows;
