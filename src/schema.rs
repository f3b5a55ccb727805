/// Typed schema for inventory snapshots
///
/// Maps each logical field to the physical column header it lives under and
/// resolves those headers against a snapshot once, so later lookups are plain
/// column indices.
use crate::error::GemError;
use crate::types::Table;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;

/// A logical inventory attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Shape,
    Carats,
    Color,
    Clarity,
    Cut,
    Polish,
    Symmetry,
    Fluorescence,
    LabName,
    PricePerCarat,
    RapPrice,
    DiscountPercent,
    TotalValue,
    DepthPercent,
    TablePercent,
    CrownAngle,
    CrownHeight,
    PavilionAngle,
    PavilionDepth,
    Girdle,
    GirdlePercent,
    Culet,
}

impl Field {
    pub const ALL: [Field; 22] = [
        Field::Shape,
        Field::Carats,
        Field::Color,
        Field::Clarity,
        Field::Cut,
        Field::Polish,
        Field::Symmetry,
        Field::Fluorescence,
        Field::LabName,
        Field::PricePerCarat,
        Field::RapPrice,
        Field::DiscountPercent,
        Field::TotalValue,
        Field::DepthPercent,
        Field::TablePercent,
        Field::CrownAngle,
        Field::CrownHeight,
        Field::PavilionAngle,
        Field::PavilionDepth,
        Field::Girdle,
        Field::GirdlePercent,
        Field::Culet,
    ];

    /// Config key for this field
    pub fn key(&self) -> &'static str {
        match self {
            Field::Shape => "shape",
            Field::Carats => "carats",
            Field::Color => "color",
            Field::Clarity => "clarity",
            Field::Cut => "cut",
            Field::Polish => "polish",
            Field::Symmetry => "symmetry",
            Field::Fluorescence => "fluorescence",
            Field::LabName => "lab_name",
            Field::PricePerCarat => "price_per_carat",
            Field::RapPrice => "rap_price",
            Field::DiscountPercent => "discount_percent",
            Field::TotalValue => "total_value",
            Field::DepthPercent => "depth_percent",
            Field::TablePercent => "table_percent",
            Field::CrownAngle => "crown_angle",
            Field::CrownHeight => "crown_height",
            Field::PavilionAngle => "pavilion_angle",
            Field::PavilionDepth => "pavilion_depth",
            Field::Girdle => "girdle",
            Field::GirdlePercent => "girdle_percent",
            Field::Culet => "culet",
        }
    }

    /// Column header used when no override is configured
    pub fn default_column(&self) -> &'static str {
        match self {
            Field::Shape => "Shape",
            Field::Carats => "Cts",
            Field::Color => "Color",
            Field::Clarity => "Clarity",
            Field::Cut => "Cut",
            Field::Polish => "Polish",
            Field::Symmetry => "Symm",
            Field::Fluorescence => "Flour",
            Field::LabName => "Lab Name",
            Field::PricePerCarat => "PPC",
            Field::RapPrice => "Rap Price",
            Field::DiscountPercent => "Disc %",
            Field::TotalValue => "Total Value",
            Field::DepthPercent => "Depth %",
            Field::TablePercent => "Table %",
            Field::CrownAngle => "Crown Angle",
            Field::CrownHeight => "Crown Height",
            Field::PavilionAngle => "Pavilion Angle",
            Field::PavilionDepth => "Pavilion Depth",
            Field::Girdle => "Girdle",
            Field::GirdlePercent => "Girdle %",
            Field::Culet => "Culet",
        }
    }

    /// Fields holding measurements or prices rather than codes and identifiers
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Field::Carats
                | Field::PricePerCarat
                | Field::RapPrice
                | Field::DiscountPercent
                | Field::TotalValue
                | Field::DepthPercent
                | Field::TablePercent
                | Field::CrownAngle
                | Field::CrownHeight
                | Field::PavilionAngle
                | Field::PavilionDepth
                | Field::GirdlePercent
        )
    }

    /// Secondary geometry attributes only exist in some snapshot layouts
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            Field::DepthPercent
                | Field::TablePercent
                | Field::CrownAngle
                | Field::CrownHeight
                | Field::PavilionAngle
                | Field::PavilionDepth
                | Field::Girdle
                | Field::GirdlePercent
                | Field::Culet
        )
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }
}

/// Physical column header per logical field
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct ColumnNames {
    overrides: HashMap<String, String>,
}

impl ColumnNames {
    /// Build from config overrides, rejecting unknown field keys
    pub fn from_overrides(overrides: HashMap<String, String>) -> Result<Self, GemError> {
        for key in overrides.keys() {
            if Field::from_key(key).is_none() {
                return Err(GemError::Config(format!("unknown column mapping key '{}'", key)));
            }
        }
        Ok(Self { overrides })
    }

    pub fn validate(&self) -> Result<(), GemError> {
        Self::from_overrides(self.overrides.clone()).map(|_| ())
    }

    pub fn header_for(&self, field: Field) -> &str {
        self.overrides.get(field.key()).map(|s| s.as_str()).unwrap_or_else(|| field.default_column())
    }
}

/// Column indices for every field present in one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    indices: HashMap<Field, usize>,
    headers: HashMap<Field, String>,
}

impl Schema {
    /// Match configured headers against the snapshot (trimmed, case-insensitive)
    pub fn resolve(table: &Table, names: &ColumnNames) -> Schema {
        let mut indices = HashMap::new();
        let mut headers = HashMap::new();

        for field in Field::ALL {
            let wanted = names.header_for(field);
            headers.insert(field, wanted.to_string());
            if let Some(idx) = table.columns.iter().position(|c| c.trim().eq_ignore_ascii_case(wanted.trim())) {
                indices.insert(field, idx);
            }
        }

        debug!("Resolved {} of {} schema fields against {} columns", indices.len(), Field::ALL.len(), table.columns.len());

        Schema { indices, headers }
    }

    pub fn index(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// Resolved positions of the numeric fields, in column order
    pub fn numeric_columns(&self) -> Vec<usize> {
        let mut cols: Vec<usize> =
            self.indices.iter().filter(|(field, _)| field.is_numeric()).map(|(_, idx)| *idx).collect();
        cols.sort_unstable();
        cols.dedup();
        cols
    }

    /// Index of a field a caller cannot proceed without
    pub fn require(&self, field: Field, required_by: &str) -> Result<usize, GemError> {
        self.index(field).ok_or_else(|| GemError::SchemaMismatch {
            column: self.header(field).to_string(),
            required_by: required_by.to_string(),
        })
    }

    /// Header name the field is expected under
    pub fn header(&self, field: Field) -> &str {
        self.headers.get(&field).map(|s| s.as_str()).unwrap_or_else(|| field.default_column())
    }
}
