//! Summary statistics for filtered inventories.
//!
//! This module handles aggregating a filtered table into the scalar
//! statistics shown in the report band and returned to the caller.

use super::types::{Aggregate, Summary};
use crate::schema::{Field, Schema};
use crate::types::{Table, cell};
use log::warn;

/// Calculate summary statistics from a filtered table.
///
/// # Arguments
/// * `table` - The filtered rows (callers only pass non-empty tables)
/// * `schema` - Column positions resolved for the same snapshot
///
/// # Returns
/// A `Summary` whose money and percentage fields are rounded to two decimals.
/// Columns that are absent or entirely null yield `Aggregate::Undefined`.
pub fn summarize(table: &Table, schema: &Schema) -> Summary {
    let total_carats = sum_column(table, schema, Field::Carats);
    let avg_ppc = mean_column(table, schema, Field::PricePerCarat);
    let avg_discount = mean_column(table, schema, Field::DiscountPercent);
    let avg_rap = mean_column(table, schema, Field::RapPrice);
    let total_value = sum_column(table, schema, Field::TotalValue);

    let derived_discount = derived_discount(avg_ppc, avg_rap);

    Summary {
        stone_count: table.row_count(),
        total_carats: total_carats.rounded(),
        avg_price_per_carat: avg_ppc.rounded(),
        avg_discount_percent: avg_discount.rounded(),
        avg_rap_price: avg_rap.rounded(),
        total_value: total_value.rounded(),
        derived_discount_percent: derived_discount.rounded(),
    }
}

/// Discount implied by the average price per carat against the average Rap price
pub fn derived_discount(avg_ppc: Aggregate, avg_rap: Aggregate) -> Aggregate {
    match (avg_ppc, avg_rap) {
        (Aggregate::Value(ppc), Aggregate::Value(rap)) if rap != 0.0 => Aggregate::Value((ppc / rap - 1.0) * 100.0),
        _ => Aggregate::Undefined,
    }
}

fn column_values(table: &Table, schema: &Schema, field: Field) -> Option<Vec<f64>> {
    let idx = schema.index(field)?;
    Some(table.rows.iter().filter_map(|row| cell(row, idx).as_f64()).collect())
}

fn sum_column(table: &Table, schema: &Schema, field: Field) -> Aggregate {
    match column_values(table, schema, field) {
        Some(values) if !values.is_empty() => Aggregate::Value(values.iter().sum()),
        _ => {
            warn!("No numeric '{}' values to sum; total is undefined", schema.header(field));
            Aggregate::Undefined
        }
    }
}

fn mean_column(table: &Table, schema: &Schema, field: Field) -> Aggregate {
    match column_values(table, schema, field) {
        Some(values) if !values.is_empty() => Aggregate::Value(values.iter().sum::<f64>() / values.len() as f64),
        _ => {
            warn!("No numeric '{}' values to average; mean is undefined", schema.header(field));
            Aggregate::Undefined
        }
    }
}
