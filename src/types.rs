/// Core data structures for inventory tables
///
/// This module defines the request-scoped table that flows through the
/// pipeline: the loaded snapshot, the filtered copy, and the values the
/// report renderer writes back out.
use serde::{Deserialize, Serialize};

/// A single cell of an inventory table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    /// Parse a raw snapshot cell: blank is Null, anything else is kept as Text
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() { CellValue::Null } else { CellValue::Text(trimmed.to_string()) }
    }

    /// Number for text that reads as a finite number; other cells are returned unchanged
    pub fn into_numeric(self) -> Self {
        match self {
            CellValue::Text(s) => match s.parse::<f64>() {
                Ok(n) if n.is_finite() => CellValue::Number(n),
                _ => CellValue::Text(s),
            },
            other => other,
        }
    }

    /// Numeric view of the cell, if it holds a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view of the cell; numbers are rendered without a trailing ".0"
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            CellValue::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }

    /// Null or whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Console rendering
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Null => String::new(),
        }
    }
}

static NULL_CELL: CellValue = CellValue::Null;

/// Cell at `col`; positions past the end of a short row read as Null
pub fn cell(row: &[CellValue], col: usize) -> &CellValue {
    row.get(col).unwrap_or(&NULL_CELL)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 { format!("{}", n as i64) } else { format!("{}", n) }
}

/// A named-column table. Rows are stored in snapshot order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create a table, padding or truncating rows to the column count
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Convert the given columns to numbers where the text reads as one
    pub fn with_numeric_columns(mut self, columns: &[usize]) -> Table {
        for row in &mut self.rows {
            for &col in columns {
                if let Some(value) = row.get_mut(col) {
                    *value = std::mem::replace(value, CellValue::Null).into_numeric();
                }
            }
        }
        self
    }

    /// Build a new table holding the rows selected by `keep`, leaving `self` untouched
    pub fn retain_copy<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }
}

#[cfg(test)]
#[path = "data_structures_test.rs"]
mod data_structures_test;
