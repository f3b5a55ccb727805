//! Cell addressing for the report sheet.
//!
//! Every row and column position used by the renderer is derived here from
//! the configured band columns and the filtered row count. Rows and columns
//! are zero-based internally; `cell_ref` produces A1 notation.

use crate::error::GemError;

/// Reserved rows above the data header: title, summary labels, summary values
pub const RESERVED_ROWS: u32 = 3;

/// Zero-based index of XFD, the last column an xlsx sheet can hold
pub const MAX_COLUMN: u16 = 16_383;

/// Column letters for a zero-based index ("A", "Z", "AA", ...)
pub fn column_letter(index: u16) -> String {
    let mut n = index as u32 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Zero-based index for column letters (case-insensitive); None for anything
/// that is not a column on an xlsx sheet
pub fn column_index(letters: &str) -> Option<u16> {
    let letters = letters.trim();
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut n: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        n = n * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    u16::try_from(n - 1).ok().filter(|idx| *idx <= MAX_COLUMN)
}

/// A1-style reference for a zero-based cell position
pub fn cell_ref(row: u32, col: u16) -> String {
    format!("{}{}", column_letter(col), row + 1)
}

/// Positions of every band in one rendered report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    pub title_row: u32,
    pub title_first_col: u16,
    pub title_last_col: u16,
    pub label_row: u32,
    pub value_row: u32,
    pub summary_first_col: u16,
    pub header_row: u32,
    pub first_data_row: u32,
    pub data_rows: u32,
}

impl ReportLayout {
    /// Lay out a report for `data_rows` filtered rows
    pub fn new(title_first: &str, title_last: &str, summary_first: &str, data_rows: usize) -> Result<Self, GemError> {
        let title_first_col = parse_column("title_first_column", title_first)?;
        let title_last_col = parse_column("title_last_column", title_last)?;
        let summary_first_col = parse_column("summary_first_column", summary_first)?;
        if title_first_col > title_last_col {
            return Err(GemError::Config(format!("title band {}..{} runs backwards", title_first, title_last)));
        }
        let data_rows = u32::try_from(data_rows)
            .map_err(|_| GemError::RenderFailure(format!("{} rows exceed the sheet row limit", data_rows)))?;

        Ok(ReportLayout {
            title_row: 0,
            title_first_col,
            title_last_col,
            label_row: 1,
            value_row: 2,
            summary_first_col,
            header_row: RESERVED_ROWS,
            first_data_row: RESERVED_ROWS + 1,
            data_rows,
        })
    }

    /// Last data row (zero-based); equals the header row when there is no data
    pub fn last_data_row(&self) -> u32 {
        self.header_row + self.data_rows
    }

    /// A1 range covering the data cells of one column, e.g. "B5:B12"
    pub fn data_range(&self, col: u16) -> String {
        format!("{}:{}", cell_ref(self.first_data_row, col), cell_ref(self.last_data_row(), col))
    }

    /// Column of the n-th summary field
    pub fn summary_col(&self, position: usize) -> u16 {
        self.summary_first_col + position as u16
    }
}

fn parse_column(key: &str, letters: &str) -> Result<u16, GemError> {
    column_index(letters).ok_or_else(|| GemError::Config(format!("{} '{}' is not a column letter", key, letters)))
}
