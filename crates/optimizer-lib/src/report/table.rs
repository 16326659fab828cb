//! Normalized report tables
//!
//! Every report emits one of these: ordered column names plus rows of
//! loosely typed cells, the shape the spreadsheet renderer consumes. Rows
//! keep insertion order; the engine never sorts or deduplicates (the
//! (account_id, resource_id) uniqueness key is a collector contract).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column name carrying the per-row savings figure
pub const SAVINGS_COLUMN: &str = "estimated_savings";

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    /// Numeric view of the cell, when it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            CellValue::Text(_) | CellValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(v) => write!(f, "{v}"),
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Bool(v) => write!(f, "{}", if *v { "Yes" } else { "No" }),
        }
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

/// Round to two decimals, the precision every money figure is reported at
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One report's output table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl ReportTable {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Sum of the savings column, rounded to two decimals.
    ///
    /// 0.0 when the table is empty or has no savings column; non-numeric
    /// cells in the column contribute nothing.
    pub fn savings_sum(&self) -> f64 {
        let Some(idx) = self.column_index(SAVINGS_COLUMN) else {
            return 0.0;
        };
        let total: f64 = self
            .rows
            .iter()
            .filter_map(|row| row.get(idx).and_then(CellValue::as_f64))
            .sum();
        round2(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savings_sum_rounds() {
        let mut table = ReportTable::new(&["resource_id", SAVINGS_COLUMN]);
        table.push_row(vec!["a".into(), 10.333.into()]);
        table.push_row(vec!["b".into(), 5.111.into()]);
        assert_eq!(table.savings_sum(), 15.44);
    }

    #[test]
    fn test_savings_sum_without_column() {
        let mut table = ReportTable::new(&["resource_id", "finding"]);
        table.push_row(vec!["a".into(), "OVER_PROVISIONED".into()]);
        assert_eq!(table.savings_sum(), 0.0);
        assert_eq!(ReportTable::new(&[SAVINGS_COLUMN]).savings_sum(), 0.0);
    }

    #[test]
    fn test_savings_sum_skips_non_numeric() {
        let mut table = ReportTable::new(&[SAVINGS_COLUMN]);
        table.push_row(vec![CellValue::Text("".into())]);
        table.push_row(vec![12.5.into()]);
        assert_eq!(table.savings_sum(), 12.5);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::from(3.14159).to_string(), "3.14");
        assert_eq!(CellValue::from(true).to_string(), "Yes");
        assert_eq!(CellValue::from(7i64).to_string(), "7");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(189.5549), 189.55);
        assert_eq!(round2(-39.555), -39.56);
    }
}
