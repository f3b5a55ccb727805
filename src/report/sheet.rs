//! In-memory spreadsheet model.
//!
//! The renderer fills a `Sheet`; the xlsx encoder and the tests read it.

use super::layout::ReportLayout;
#[cfg(test)]
use crate::types::{CellValue, Table};
use std::collections::BTreeMap;

/// Display format for numeric cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberFormat {
    General,
    Fixed(u8),
}

impl NumberFormat {
    /// Excel number format code
    pub fn code(&self) -> String {
        match self {
            NumberFormat::General => "General".to_string(),
            NumberFormat::Fixed(0) => "0".to_string(),
            NumberFormat::Fixed(d) => format!("0.{}", "0".repeat(*d as usize)),
        }
    }
}

/// Presentation class of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// Title band and data header: bold, light text on dark fill
    Chrome,
    /// Summary field captions
    Label,
    /// Summary values
    Value(NumberFormat),
    /// Data table cells
    Data(NumberFormat),
}

/// What a cell holds
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(String),
    Number(f64),
    /// Formula text (with leading '=') and the value it evaluates to now
    Formula { formula: String, cached: Option<f64> },
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: CellContent,
    pub style: Style,
}

/// A horizontal merged range on one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub row: u32,
    pub first_col: u16,
    pub last_col: u16,
}

/// A rendered worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub layout: ReportLayout,
    /// Number of data table columns, starting at column A
    pub data_columns: u16,
    pub cells: BTreeMap<(u32, u16), Cell>,
    pub merges: Vec<Merge>,
    pub column_widths: BTreeMap<u16, f64>,
}

impl Sheet {
    pub fn new(name: &str, layout: ReportLayout, data_columns: u16) -> Self {
        Self {
            name: name.to_string(),
            layout,
            data_columns,
            cells: BTreeMap::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, row: u32, col: u16, content: CellContent, style: Style) {
        self.cells.insert((row, col), Cell { content, style });
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Text of a cell, if it holds text
    #[cfg(test)]
    pub fn text(&self, row: u32, col: u16) -> Option<&str> {
        match self.get(row, col).map(|c| &c.content) {
            Some(CellContent::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Merged range that starts at this cell, if any
    pub fn merge_at(&self, row: u32, col: u16) -> Option<&Merge> {
        self.merges.iter().find(|m| m.row == row && m.first_col == col)
    }

    /// Data table header names, read back from the header row
    #[cfg(test)]
    pub fn header(&self) -> Vec<String> {
        (0..self.data_columns).map(|col| self.text(self.layout.header_row, col).unwrap_or("").to_string()).collect()
    }

    /// Data rows read back as table values, ignoring styling
    #[cfg(test)]
    pub fn data_rows(&self) -> Vec<Vec<CellValue>> {
        (self.layout.first_data_row..=self.layout.last_data_row())
            .map(|row| {
                (0..self.data_columns)
                    .map(|col| match self.get(row, col).map(|c| &c.content) {
                        Some(CellContent::Text(s)) => CellValue::Text(s.clone()),
                        Some(CellContent::Number(n)) => CellValue::Number(*n),
                        Some(CellContent::Formula { cached, .. }) => cached.map_or(CellValue::Null, CellValue::Number),
                        Some(CellContent::Blank) | None => CellValue::Null,
                    })
                    .collect()
            })
            .collect()
    }

    /// The data block as a table
    #[cfg(test)]
    pub fn to_table(&self) -> Table {
        Table::new(self.header(), self.data_rows())
    }
}
