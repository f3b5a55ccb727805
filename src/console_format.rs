/// Console formatting module - Pure rendering concerns
///
/// This module handles all console output formatting including:
/// - The summary block printed after a successful run
/// - A bordered preview of the first filtered rows
/// - Text truncation and padding for wide Unicode content
///
/// Everything writes through `TableWriter`, so output can go to stdout or
/// to a buffer in tests.
use crate::report::{Aggregate, Summary};
use crate::runner::Response;
use crate::types::{Table, cell};
use std::io::{self, Write};
use std::sync::OnceLock;
use term::color::Color;
use terminal_size::{Width, terminal_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const DEFAULT_CONSOLE_WIDTH: usize = 120;
const MIN_COLUMN_WIDTH: usize = 4;
const MAX_COLUMN_WIDTH: usize = 24;

/// Label column width in the summary block
const LABEL_WIDTH: usize = 22;

/// Writer for console output - configurable for color/plain text
pub struct TableWriter<W: Write> {
    writer: W,
    use_colors: bool,
}

impl<W: Write> TableWriter<W> {
    pub fn new(writer: W, use_colors: bool) -> Self {
        Self { writer, use_colors }
    }

    /// Consume the writer, returning the destination
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_colored(&mut self, text: &str, color: Color) -> io::Result<()> {
        if self.use_colors {
            if let Some(ref mut t) = term::stdout() {
                let _ = t.fg(color);
                let _ = t.write_all(text.as_bytes());
                let _ = t.reset();
                return Ok(());
            }
        }
        write!(self.writer, "{}", text)
    }

    /// Write the summary block for a completed request
    pub fn write_summary(&mut self, response: &Response) -> io::Result<()> {
        let s: &Summary = &response.summary;
        writeln!(self.writer)?;
        self.write_summary_line("Stones", &s.stone_count.to_string(), None)?;
        self.write_aggregate("Total carats", s.total_carats, 2)?;
        self.write_aggregate("Avg price per carat", s.avg_price_per_carat, 2)?;
        self.write_aggregate("Avg discount %", s.avg_discount_percent, 2)?;
        self.write_aggregate("Derived discount %", s.derived_discount_percent, 2)?;
        self.write_aggregate("Avg Rap price", s.avg_rap_price, 2)?;
        self.write_aggregate("Total value", s.total_value, 2)?;
        writeln!(self.writer)?;
        self.write_summary_line("Report", &response.artifact_name, None)?;
        self.write_summary_line("Available at", &response.artifact_reference, None)?;
        if let Some(err) = &response.delivery_error {
            self.write_summary_line("Delivery", err, Some(term::color::BRIGHT_RED))?;
        }
        writeln!(self.writer)
    }

    fn write_aggregate(&mut self, label: &str, value: Aggregate, decimals: usize) -> io::Result<()> {
        let color = value.is_undefined().then_some(term::color::BRIGHT_YELLOW);
        self.write_summary_line(label, &value.display(decimals), color)
    }

    fn write_summary_line(&mut self, label: &str, value: &str, color: Option<Color>) -> io::Result<()> {
        write!(self.writer, "  {}", truncate_with_padding(label, LABEL_WIDTH))?;
        match color {
            Some(c) => self.write_colored(value, c)?,
            None => write!(self.writer, "{}", value)?,
        }
        writeln!(self.writer)
    }

    /// Write a bordered preview of the first `max_rows` rows
    pub fn write_preview(&mut self, table: &Table, max_rows: usize) -> io::Result<()> {
        if max_rows == 0 || table.is_empty() {
            return Ok(());
        }

        let widths = preview_widths(table, max_rows, get_console_width());
        let shown = widths.len();

        write!(self.writer, "{}", border_line('┌', '┬', '┐', &widths))?;
        self.write_row(table.columns.iter().map(String::as_str), &widths)?;
        write!(self.writer, "{}", border_line('├', '┼', '┤', &widths))?;
        for row in table.rows.iter().take(max_rows) {
            let cells: Vec<String> = row.iter().map(|c| c.display()).collect();
            self.write_row(cells.iter().map(String::as_str), &widths)?;
        }
        write!(self.writer, "{}", border_line('└', '┴', '┘', &widths))?;

        let hidden_rows = table.row_count().saturating_sub(max_rows);
        let hidden_cols = table.columns.len() - shown;
        if hidden_rows > 0 || hidden_cols > 0 {
            writeln!(self.writer, "  ({} more rows, {} more columns)", hidden_rows, hidden_cols)?;
        }
        Ok(())
    }

    fn write_row<'a>(&mut self, cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> io::Result<()> {
        write!(self.writer, "│")?;
        for (cell, width) in cells.zip(widths) {
            write!(self.writer, " {} │", truncate_with_padding(cell, *width))?;
        }
        writeln!(self.writer)
    }
}

//
// Table Layout and Widths
//

/// Per-column content widths for the preview, limited to what fits the console.
///
/// Each column is sized to its widest sampled cell within fixed bounds;
/// trailing columns that would overflow `console_width` are dropped.
pub fn preview_widths(table: &Table, max_rows: usize, console_width: usize) -> Vec<usize> {
    let mut widths = Vec::new();
    // Leading "│" plus " " + content + " │" per column
    let mut used = 1;

    for (idx, header) in table.columns.iter().enumerate() {
        let content = table
            .rows
            .iter()
            .take(max_rows)
            .map(|row| display_width(&cell(row, idx).display()))
            .fold(display_width(header), usize::max)
            .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);

        if used + content + 3 > console_width {
            break;
        }
        used += content + 3;
        widths.push(content);
    }

    widths
}

fn border_line(left: char, mid: char, right: char, widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}\n", left, segments.join(&mid.to_string()), right)
}

fn get_terminal_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() { w as usize } else { DEFAULT_CONSOLE_WIDTH }
}

static CONSOLE_WIDTH: OnceLock<usize> = OnceLock::new();

/// Fix the console width instead of detecting it; only the first call wins
pub fn set_console_width(width: usize) {
    let _ = CONSOLE_WIDTH.set(width);
}

pub fn get_console_width() -> usize {
    *CONSOLE_WIDTH.get_or_init(get_terminal_width)
}

//
// Text Formatting Utilities
//

/// Count the display width of a string, accounting for wide Unicode characters
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate and pad string to exact width
pub fn truncate_with_padding(s: &str, width: usize) -> String {
    let display_w = display_width(s);
    if display_w <= width {
        return format!("{}{}", s, " ".repeat(width - display_w));
    }

    // Reserve space for "..."
    let target_width = if width >= 3 { width - 3 } else { width };
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let c_width = UnicodeWidthChar::width(c).unwrap_or(1);
        if current_width + c_width > target_width {
            break;
        }
        result.push(c);
        current_width += c_width;
    }

    if width >= 3 {
        result.push_str("...");
        current_width += 3;
    }
    if current_width < width {
        result.push_str(&" ".repeat(width - current_width));
    }
    result
}

/// Print the summary block to stdout
pub fn print_summary(response: &Response) {
    let mut writer = TableWriter::new(io::stdout(), true);
    let _ = writer.write_summary(response);
}

/// Print the preview table to stdout
pub fn print_preview(table: &Table, max_rows: usize) {
    let mut writer = TableWriter::new(io::stdout(), false);
    let _ = writer.write_preview(table, max_rows);
}

#[cfg(test)]
#[path = "console_format_test.rs"]
mod console_format_test;
