//! Report type definitions.
//!
//! This module defines the summary statistics computed over a filtered
//! inventory and the rendering model the sheet builder works from.

use serde::Serialize;

/// A scalar statistic that may have no defined value.
///
/// Means over columns with no non-null values are `Undefined`, never zero.
/// Serializes as a number or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Aggregate {
    Value(f64),
    Undefined,
}

impl Aggregate {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Aggregate::Undefined)
    }

    /// Round to two decimal places
    pub fn rounded(self) -> Self {
        match self {
            Aggregate::Value(v) => Aggregate::Value(round2(v)),
            Aggregate::Undefined => Aggregate::Undefined,
        }
    }

    /// Console/label rendering with fixed decimals
    pub fn display(&self, decimals: usize) -> String {
        match self {
            Aggregate::Value(v) => format!("{:.*}", decimals, v),
            Aggregate::Undefined => "N/A".to_string(),
        }
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Aggregate statistics over a filtered inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of rows in the filtered table
    pub stone_count: usize,
    pub total_carats: Aggregate,
    pub avg_price_per_carat: Aggregate,
    /// Per-row mean of the discount column
    pub avg_discount_percent: Aggregate,
    pub avg_rap_price: Aggregate,
    pub total_value: Aggregate,
    /// `(avg_price_per_carat / avg_rap_price - 1) * 100`
    pub derived_discount_percent: Aggregate,
}

/// Which discount quantity the report band labels "Avg Disc".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountLabel {
    /// Derived from average PPC over average Rap price
    #[default]
    Derived,
    /// Mean of the per-row discount column
    Mean,
}

/// Whether the summary band holds live formulas or computed numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    #[default]
    Formulas,
    Values,
}
