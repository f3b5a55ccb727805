//! Report export to xlsx.
//!
//! This module handles turning a rendered `Sheet` into workbook bytes.

use super::sheet::{CellContent, NumberFormat, Sheet, Style};
use crate::error::GemError;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Formula, Workbook, XlsxError};
use std::collections::HashMap;

/// Dark fill shared by the title band and the data header
const CHROME_FILL: u32 = 0x1F3864;
const LABEL_FILL: u32 = 0xD9E1F2;

impl From<XlsxError> for GemError {
    fn from(err: XlsxError) -> Self {
        GemError::RenderFailure(err.to_string())
    }
}

/// Build the workbook format for a style
fn format_for(style: Style) -> Format {
    match style {
        Style::Chrome => Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(CHROME_FILL))
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin),
        Style::Label => Format::new()
            .set_bold()
            .set_background_color(Color::RGB(LABEL_FILL))
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin),
        Style::Value(number) => with_number_format(Format::new().set_bold().set_border(FormatBorder::Thin), number),
        Style::Data(number) => with_number_format(Format::new().set_border(FormatBorder::Thin), number),
    }
}

fn with_number_format(format: Format, number: NumberFormat) -> Format {
    match number {
        NumberFormat::General => format,
        fixed => format.set_num_format(fixed.code()),
    }
}

/// Encode a rendered sheet as xlsx workbook bytes.
///
/// Formula cells carry their current value as the cached result so viewers
/// that do not recalculate still show the summary.
pub fn encode_xlsx(sheet: &Sheet) -> Result<Vec<u8>, GemError> {
    let mut workbook = Workbook::new();
    let mut formats: HashMap<Style, Format> = HashMap::new();

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for ((row, col), cell) in &sheet.cells {
            let format = formats.entry(cell.style).or_insert_with(|| format_for(cell.style));

            if let Some(merge) = sheet.merge_at(*row, *col) {
                let text = match &cell.content {
                    CellContent::Text(s) => s.as_str(),
                    _ => "",
                };
                worksheet.merge_range(merge.row, merge.first_col, merge.row, merge.last_col, text, format)?;
                continue;
            }
            if sheet.merges.iter().any(|m| m.row == *row && *col > m.first_col && *col <= m.last_col) {
                continue;
            }

            match &cell.content {
                CellContent::Text(s) => {
                    worksheet.write_string_with_format(*row, *col, s, format)?;
                }
                CellContent::Number(n) => {
                    worksheet.write_number_with_format(*row, *col, *n, format)?;
                }
                CellContent::Formula { formula, cached } => {
                    let mut f = Formula::new(formula);
                    if let Some(value) = cached {
                        f = f.set_result(value.to_string());
                    }
                    worksheet.write_formula_with_format(*row, *col, f, format)?;
                }
                CellContent::Blank => {
                    worksheet.write_blank(*row, *col, format)?;
                }
            }
        }

        for (col, width) in &sheet.column_widths {
            worksheet.set_column_width(*col, *width)?;
        }
        worksheet.set_freeze_panes(sheet.layout.first_data_row, 0)?;
    }

    Ok(workbook.save_to_buffer()?)
}
