//! Report sheet rendering.
//!
//! Lays out the title band, the summary band and the styled data table for
//! one filtered inventory. Formula ranges are computed from the actual row
//! count so the summary recomputes correctly when the sheet is edited.

use super::layout::{ReportLayout, cell_ref};
use super::sheet::{CellContent, Merge, NumberFormat, Sheet, Style};
use super::types::{Aggregate, DiscountLabel, Summary, SummaryMode};
use crate::config::ReportSettings;
use crate::error::GemError;
use crate::schema::{Field, Schema};
use crate::types::{CellValue, Table, cell};
use log::debug;

const MIN_COLUMN_WIDTH: f64 = 8.0;
const MAX_COLUMN_WIDTH: f64 = 40.0;
const WIDTH_SAMPLE_ROWS: usize = 200;

/// Summary band positions referenced by the derived discount formula
const AVG_PPC: usize = 2;
const AVG_RAP: usize = 5;

/// One cell pair (label over value) in the summary band
struct SummaryField {
    label: &'static str,
    value: Aggregate,
    format: NumberFormat,
    formula: Option<String>,
}

/// Render the filtered table and its summary into a sheet.
pub fn render_report(
    table: &Table,
    schema: &Schema,
    summary: &Summary,
    settings: &ReportSettings,
) -> Result<Sheet, GemError> {
    let layout = ReportLayout::new(
        &settings.title_first_column,
        &settings.title_last_column,
        &settings.summary_first_column,
        table.row_count(),
    )?;
    let data_columns = u16::try_from(table.columns.len())
        .map_err(|_| GemError::RenderFailure(format!("{} columns exceed the sheet column limit", table.columns.len())))?;

    debug!(
        "Rendering {} rows x {} columns, data range rows {}..={}",
        layout.data_rows,
        data_columns,
        layout.first_data_row + 1,
        layout.last_data_row() + 1
    );

    let mut sheet = Sheet::new(&settings.sheet_name, layout, data_columns);

    write_title_band(&mut sheet, &settings.title);
    write_summary_band(&mut sheet, schema, summary, settings);
    write_data_table(&mut sheet, table, schema);
    fit_column_widths(&mut sheet, table);

    Ok(sheet)
}

fn write_title_band(sheet: &mut Sheet, title: &str) {
    let (row, first, last) = (sheet.layout.title_row, sheet.layout.title_first_col, sheet.layout.title_last_col);
    sheet.set(row, first, CellContent::Text(title.to_string()), Style::Chrome);
    for col in first + 1..=last {
        sheet.set(row, col, CellContent::Blank, Style::Chrome);
    }
    if last > first {
        sheet.merges.push(Merge { row, first_col: first, last_col: last });
    }
}

fn write_summary_band(sheet: &mut Sheet, schema: &Schema, summary: &Summary, settings: &ReportSettings) {
    let fields = summary_fields(&sheet.layout, schema, summary, settings.discount_label);
    let (label_row, value_row) = (sheet.layout.label_row, sheet.layout.value_row);

    for (position, field) in fields.into_iter().enumerate() {
        let col = sheet.layout.summary_col(position);
        sheet.set(label_row, col, CellContent::Text(field.label.to_string()), Style::Label);

        let content = match (field.value, field.formula) {
            (Aggregate::Undefined, _) => CellContent::Text("N/A".to_string()),
            (Aggregate::Value(v), Some(formula)) if settings.summary_mode == SummaryMode::Formulas => {
                CellContent::Formula { formula, cached: Some(v) }
            }
            (Aggregate::Value(v), _) => CellContent::Number(v),
        };
        sheet.set(value_row, col, content, Style::Value(field.format));
    }
}

fn summary_fields(layout: &ReportLayout, schema: &Schema, summary: &Summary, label: DiscountLabel) -> Vec<SummaryField> {
    let range = |field: Field| schema.index(field).and_then(|col| u16::try_from(col).ok()).map(|col| layout.data_range(col));
    let over = |func: &str, field: Field| range(field).map(|r| format!("={}({})", func, r));
    let summary_cell = |position: usize| cell_ref(layout.value_row, layout.summary_col(position));

    let derived = SummaryField {
        label: "",
        value: summary.derived_discount_percent,
        format: NumberFormat::Fixed(2),
        formula: Some(format!("=({}/{}-1)*100", summary_cell(AVG_PPC), summary_cell(AVG_RAP))),
    };
    let mean = SummaryField {
        label: "",
        value: summary.avg_discount_percent,
        format: NumberFormat::Fixed(2),
        formula: over("AVERAGE", Field::DiscountPercent),
    };
    let (avg_disc, alt_disc) = match label {
        DiscountLabel::Derived => (SummaryField { label: "Avg Disc", ..derived }, SummaryField { label: "Disc (Row Mean)", ..mean }),
        DiscountLabel::Mean => (SummaryField { label: "Avg Disc", ..mean }, SummaryField { label: "Disc (PPC/Rap)", ..derived }),
    };

    vec![
        SummaryField {
            label: "Stones",
            value: Aggregate::Value(summary.stone_count as f64),
            format: NumberFormat::Fixed(0),
            formula: Some(format!("=ROWS({})", layout.data_range(0))),
        },
        SummaryField {
            label: "Total Cts",
            value: summary.total_carats,
            format: NumberFormat::Fixed(2),
            formula: over("SUM", Field::Carats),
        },
        SummaryField {
            label: "Avg PPC",
            value: summary.avg_price_per_carat,
            format: NumberFormat::Fixed(0),
            formula: over("AVERAGE", Field::PricePerCarat),
        },
        avg_disc,
        alt_disc,
        SummaryField {
            label: "Avg Rap",
            value: summary.avg_rap_price,
            format: NumberFormat::Fixed(0),
            formula: over("AVERAGE", Field::RapPrice),
        },
        SummaryField {
            label: "Total Value",
            value: summary.total_value,
            format: NumberFormat::Fixed(0),
            formula: over("SUM", Field::TotalValue),
        },
    ]
}

fn write_data_table(sheet: &mut Sheet, table: &Table, schema: &Schema) {
    let header_row = sheet.layout.header_row;
    for (col, name) in table.columns.iter().enumerate() {
        sheet.set(header_row, col as u16, CellContent::Text(name.clone()), Style::Chrome);
    }

    let formats: Vec<NumberFormat> = (0..table.columns.len()).map(|col| column_format(schema, col)).collect();

    for (offset, row) in table.rows.iter().enumerate() {
        let sheet_row = sheet.layout.first_data_row + offset as u32;
        for (col, value) in row.iter().take(formats.len()).enumerate() {
            let (content, style) = match value {
                CellValue::Number(n) => (CellContent::Number(*n), Style::Data(formats[col])),
                CellValue::Text(s) => (CellContent::Text(s.clone()), Style::Data(NumberFormat::General)),
                CellValue::Null => (CellContent::Blank, Style::Data(NumberFormat::General)),
            };
            sheet.set(sheet_row, col as u16, content, style);
        }
    }
}

/// Display precision for a data column: two decimals for carats and
/// discount rates, whole numbers for prices and values
fn column_format(schema: &Schema, col: usize) -> NumberFormat {
    let field = Field::ALL.iter().copied().find(|f| schema.index(*f) == Some(col));
    match field {
        Some(Field::Carats | Field::DiscountPercent) => NumberFormat::Fixed(2),
        Some(Field::PricePerCarat | Field::RapPrice | Field::TotalValue) => NumberFormat::Fixed(0),
        _ => NumberFormat::General,
    }
}

fn fit_column_widths(sheet: &mut Sheet, table: &Table) {
    for (col, name) in table.columns.iter().enumerate() {
        let widest = table
            .rows
            .iter()
            .take(WIDTH_SAMPLE_ROWS)
            .map(|row| cell(row, col).display().chars().count())
            .chain(std::iter::once(name.chars().count()))
            .max()
            .unwrap_or(0);
        let width = (widest as f64 + 2.0).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        sheet.column_widths.insert(col as u16, width);
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;
