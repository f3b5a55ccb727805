/// Filter predicate engine
///
/// This module handles:
/// - Deserializing a FilterSpec from its JSON wire form
/// - Compiling a FilterSpec into typed predicates bound to snapshot columns
/// - Evaluating the predicates (logical AND) into a filtered copy of the table
///
/// Compilation does all validation, so an invalid grade or number is
/// reported before a single row is looked at.
use crate::error::GemError;
use crate::grades::{self, Scale};
use crate::schema::{Field, Schema};
use crate::types::{CellValue, Table, cell};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashSet;

/// Keys whose values are lists of codes
const LIST_KEYS: &[&str] = &["shape", "cut", "polish", "symmetry", "girdle", "culet", "fluorescence"];

/// A number given either as a JSON number or as numeric text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Number(f64),
    Text(String),
}

/// A boolean given either as a JSON bool or as text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

/// A single code or a list of codes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn values(&self) -> Vec<String> {
        let raw: Vec<&String> = match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v.iter().collect(),
        };
        raw.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    }
}

/// Declarative request criteria. Absent keys impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    pub shape: Option<OneOrMany>,
    pub certified: Option<Flag>,

    pub size_min: Option<Bound>,
    pub size_max: Option<Bound>,
    pub ppc_min: Option<Bound>,
    pub ppc_max: Option<Bound>,
    pub discount_min: Option<Bound>,
    pub discount_max: Option<Bound>,

    pub color_min: Option<String>,
    pub color_max: Option<String>,
    pub clarity_min: Option<String>,
    pub clarity_max: Option<String>,

    pub cut: Option<OneOrMany>,
    pub polish: Option<OneOrMany>,
    pub symmetry: Option<OneOrMany>,
    pub girdle: Option<OneOrMany>,
    pub culet: Option<OneOrMany>,
    pub fluorescence: Option<OneOrMany>,

    pub depth_min: Option<Bound>,
    pub depth_max: Option<Bound>,
    pub table_min: Option<Bound>,
    pub table_max: Option<Bound>,
    pub crown_angle_min: Option<Bound>,
    pub crown_angle_max: Option<Bound>,
    pub crown_height_min: Option<Bound>,
    pub crown_height_max: Option<Bound>,
    pub pavilion_angle_min: Option<Bound>,
    pub pavilion_angle_max: Option<Bound>,
    pub pavilion_depth_min: Option<Bound>,
    pub pavilion_depth_max: Option<Bound>,
    pub girdle_percent_min: Option<Bound>,
    pub girdle_percent_max: Option<Bound>,
}

impl FilterSpec {
    /// Parse the JSON object form; unknown keys and malformed values are client errors
    pub fn from_json(value: serde_json::Value) -> Result<Self, GemError> {
        serde_json::from_value(value).map_err(|e| GemError::invalid_filter("filter", "<filter>", e.to_string()))
    }
}

/// Apply `key=value` overrides onto a JSON filter object.
///
/// List keys split their value on commas.
pub fn apply_overrides(spec: &mut serde_json::Value, pairs: &[(String, String)]) -> Result<(), GemError> {
    if spec.is_null() {
        *spec = serde_json::Value::Object(serde_json::Map::new());
    }
    let map = spec
        .as_object_mut()
        .ok_or_else(|| GemError::invalid_filter("filter", "<filter>", "filter must be a JSON object"))?;

    for (key, value) in pairs {
        let entry = if LIST_KEYS.contains(&key.as_str()) {
            let items: Vec<serde_json::Value> =
                value.split(',').map(|s| serde_json::Value::String(s.trim().to_string())).collect();
            serde_json::Value::Array(items)
        } else {
            serde_json::Value::String(value.clone())
        };
        map.insert(key.clone(), entry);
    }

    Ok(())
}

/// One compiled criterion bound to a column index
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Lab name present (true) or absent (false)
    Certified { column: usize, certified: bool },

    /// Inclusive numeric range; either side may be open
    Range { key: &'static str, column: usize, min: Option<f64>, max: Option<f64> },

    /// Inclusive range over positions on a fixed grade scale
    Ordinal { scale: Scale, column: usize, min: usize, max: usize },

    /// Upper-cased cell value must be one of `values`
    OneOf { key: &'static str, column: usize, values: HashSet<String> },
}

impl Predicate {
    pub fn matches(&self, row: &[CellValue]) -> bool {
        match self {
            Predicate::Certified { column, certified } => !cell(row, *column).is_blank() == *certified,
            Predicate::Range { column, min, max, .. } => match cell(row, *column).as_f64() {
                Some(v) => min.is_none_or(|m| v >= m) && max.is_none_or(|m| v <= m),
                None => false,
            },
            Predicate::Ordinal { scale, column, min, max } => cell(row, *column)
                .as_text()
                .and_then(|grade| scale.index_of(&grade))
                .is_some_and(|idx| idx >= *min && idx <= *max),
            Predicate::OneOf { column, values, .. } => {
                cell(row, *column).as_text().is_some_and(|v| values.contains(&v.to_uppercase()))
            }
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Predicate::Certified { .. } => "certified",
            Predicate::Range { key, .. } | Predicate::OneOf { key, .. } => key,
            Predicate::Ordinal { scale, .. } => scale.as_str(),
        }
    }
}

/// Compile a filter against a resolved schema.
///
/// Predicates come out in a fixed order regardless of how the filter was written.
pub fn compile(spec: &FilterSpec, schema: &Schema) -> Result<Vec<Predicate>, GemError> {
    let mut predicates = Vec::new();

    if let Some(shape) = &spec.shape {
        let values: HashSet<String> = shape.values().iter().map(|code| grades::resolve_shape(code).to_uppercase()).collect();
        push_one_of(&mut predicates, schema, "shape", Field::Shape, values)?;
    }

    if let Some(flag) = &spec.certified {
        let certified = parse_flag("certified", flag)?;
        let column = schema.require(Field::LabName, "certified filter")?;
        predicates.push(Predicate::Certified { column, certified });
    }

    let numeric: [(&'static str, Field, &Option<Bound>, &Option<Bound>); 10] = [
        ("size", Field::Carats, &spec.size_min, &spec.size_max),
        ("ppc", Field::PricePerCarat, &spec.ppc_min, &spec.ppc_max),
        ("discount", Field::DiscountPercent, &spec.discount_min, &spec.discount_max),
        ("depth", Field::DepthPercent, &spec.depth_min, &spec.depth_max),
        ("table", Field::TablePercent, &spec.table_min, &spec.table_max),
        ("crown_angle", Field::CrownAngle, &spec.crown_angle_min, &spec.crown_angle_max),
        ("crown_height", Field::CrownHeight, &spec.crown_height_min, &spec.crown_height_max),
        ("pavilion_angle", Field::PavilionAngle, &spec.pavilion_angle_min, &spec.pavilion_angle_max),
        ("pavilion_depth", Field::PavilionDepth, &spec.pavilion_depth_min, &spec.pavilion_depth_max),
        ("girdle_percent", Field::GirdlePercent, &spec.girdle_percent_min, &spec.girdle_percent_max),
    ];
    for (key, field, min, max) in numeric {
        let min = min.as_ref().map(|b| parse_bound(&format!("{}_min", key), b)).transpose()?;
        let max = max.as_ref().map(|b| parse_bound(&format!("{}_max", key), b)).transpose()?;
        if min.is_none() && max.is_none() {
            continue;
        }
        if let Some(column) = column_for(schema, field, key)? {
            predicates.push(Predicate::Range { key, column, min, max });
        }
    }

    let ordinal = [
        (Scale::Color, Field::Color, &spec.color_min, &spec.color_max),
        (Scale::Clarity, Field::Clarity, &spec.clarity_min, &spec.clarity_max),
    ];
    for (scale, field, min, max) in ordinal {
        if let Some(predicate) = compile_ordinal(schema, scale, field, min.as_deref(), max.as_deref())? {
            predicates.push(predicate);
        }
    }

    let categorical: [(&'static str, Field, &Option<OneOrMany>); 5] = [
        ("cut", Field::Cut, &spec.cut),
        ("polish", Field::Polish, &spec.polish),
        ("symmetry", Field::Symmetry, &spec.symmetry),
        ("girdle", Field::Girdle, &spec.girdle),
        ("culet", Field::Culet, &spec.culet),
    ];
    for (key, field, codes) in categorical {
        if let Some(codes) = codes {
            let values: HashSet<String> = codes.values().iter().map(|c| c.to_uppercase()).collect();
            push_one_of(&mut predicates, schema, key, field, values)?;
        }
    }

    if let Some(codes) = &spec.fluorescence {
        let values: HashSet<String> = codes.values().iter().flat_map(|c| grades::expand_fluorescence(c)).collect();
        push_one_of(&mut predicates, schema, "fluorescence", Field::Fluorescence, values)?;
    }

    debug!("Compiled {} predicates: {:?}", predicates.len(), predicates.iter().map(|p| p.key()).collect::<Vec<_>>());

    Ok(predicates)
}

/// Keep the rows satisfying every predicate, as a new table
pub fn apply(table: &Table, predicates: &[Predicate]) -> Table {
    let filtered = table.retain_copy(|row| predicates.iter().all(|p| p.matches(row)));
    debug!("Filter kept {} of {} rows", filtered.row_count(), table.row_count());
    filtered
}

/// Compile and apply in one step
pub fn filter_table(table: &Table, spec: &FilterSpec, schema: &Schema) -> Result<Table, GemError> {
    let predicates = compile(spec, schema)?;
    Ok(apply(table, &predicates))
}

fn compile_ordinal(
    schema: &Schema,
    scale: Scale,
    field: Field,
    min: Option<&str>,
    max: Option<&str>,
) -> Result<Option<Predicate>, GemError> {
    if min.is_none() && max.is_none() {
        return Ok(None);
    }

    let resolve = |suffix: &str, grade: &str| {
        scale.index_of(grade).ok_or_else(|| {
            GemError::invalid_filter(
                &format!("{}_{}", scale.as_str(), suffix),
                grade,
                format!("not on the {} scale ({})", scale.as_str(), scale.grades().join(", ")),
            )
        })
    };

    let mut lo = min.map(|g| resolve("min", g)).transpose()?.unwrap_or(0);
    let mut hi = max.map(|g| resolve("max", g)).transpose()?.unwrap_or(scale.grades().len() - 1);
    if lo > hi {
        debug!("Swapping reversed {} bounds {}..{}", scale.as_str(), scale.grades()[lo], scale.grades()[hi]);
        std::mem::swap(&mut lo, &mut hi);
    }

    let column = schema.require(field, &format!("{} filter", scale.as_str()))?;
    Ok(Some(Predicate::Ordinal { scale, column, min: lo, max: hi }))
}

fn push_one_of(
    predicates: &mut Vec<Predicate>,
    schema: &Schema,
    key: &'static str,
    field: Field,
    values: HashSet<String>,
) -> Result<(), GemError> {
    if values.is_empty() {
        debug!("Ignoring empty '{}' criterion", key);
        return Ok(());
    }
    if let Some(column) = column_for(schema, field, key)? {
        predicates.push(Predicate::OneOf { key, column, values });
    }
    Ok(())
}

/// Column for a predicate: missing core columns are errors, missing geometry columns skip the predicate
fn column_for(schema: &Schema, field: Field, key: &str) -> Result<Option<usize>, GemError> {
    match schema.index(field) {
        Some(idx) => Ok(Some(idx)),
        None if field.is_optional() => {
            warn!("Snapshot has no '{}' column; skipping '{}' filter", schema.header(field), key);
            Ok(None)
        }
        None => schema.require(field, &format!("{} filter", key)).map(Some),
    }
}

fn parse_bound(key: &str, bound: &Bound) -> Result<f64, GemError> {
    let value = match bound {
        Bound::Number(n) => *n,
        Bound::Text(s) => {
            s.trim().parse::<f64>().map_err(|_| GemError::invalid_filter(key, s.as_str(), "not a number"))?
        }
    };
    if !value.is_finite() {
        return Err(GemError::invalid_filter(key, value.to_string(), "not a finite number"));
    }
    Ok(value)
}

fn parse_flag(key: &str, flag: &Flag) -> Result<bool, GemError> {
    match flag {
        Flag::Bool(b) => Ok(*b),
        Flag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(GemError::invalid_filter(key, s.as_str(), "expected true or false")),
        },
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod filter_test;
