//! Report generation module - summary statistics and the spreadsheet report.
//!
//! This module handles:
//! - Calculating summary statistics over a filtered inventory
//! - Laying out the title band, summary band and data table
//! - Building the in-memory sheet model
//! - Encoding the sheet as an xlsx workbook
//!
//! Console rendering is handled by the console_format module.
//!
//! # Module Organization
//!
//! - `types` - Summary, Aggregate and the report option enums
//! - `stats` - Summary statistics
//! - `layout` - Cell addressing derived from the row count
//! - `sheet` - In-memory sheet model, readable back as a table
//! - `render` - Sheet construction from a filtered table
//! - `export` - xlsx encoding

mod export;
pub(crate) mod layout;
mod render;
mod sheet;
mod stats;
mod types;

// Re-export types
pub use types::{Aggregate, DiscountLabel, Summary, SummaryMode};

// Re-export stats functions
pub use stats::{derived_discount, summarize};

// Re-export sheet model and rendering
pub use render::render_report;
pub use sheet::{CellContent, NumberFormat, Sheet, Style};

// Re-export export functions
pub use export::encode_xlsx;
