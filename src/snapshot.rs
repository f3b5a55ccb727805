/// Inventory snapshot sources
///
/// This module handles:
/// - The `SnapshotSource` seam the pipeline loads inventory through
/// - Reading CSV snapshots from disk or over HTTP
/// - An in-memory source for tests and embedding
///
/// Any failure to obtain a snapshot is `SnapshotUnavailable`. A snapshot
/// with a header and no rows loads fine as an empty table.
use crate::error::GemError;
use crate::types::{CellValue, Table};
use log::debug;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

const USER_AGENT: &str = concat!("gem-report/", env!("CARGO_PKG_VERSION"));

/// Supplies the current inventory
pub trait SnapshotSource {
    fn load(&self) -> Result<Table, GemError>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}

/// Parse CSV text into a table; the first record is the header
pub fn parse_csv<R: Read>(reader: R) -> Result<Table, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::parse).collect());
    }

    Ok(Table::new(columns, rows))
}

/// CSV snapshot on the local filesystem
#[derive(Debug, Clone)]
pub struct CsvFileSnapshot {
    pub path: PathBuf,
}

impl CsvFileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for CsvFileSnapshot {
    fn load(&self) -> Result<Table, GemError> {
        debug!("Loading snapshot from {:?}", self.path);
        let file = std::fs::File::open(&self.path)
            .map_err(|e| GemError::SnapshotUnavailable(format!("{}: {}", self.path.display(), e)))?;
        let table =
            parse_csv(file).map_err(|e| GemError::SnapshotUnavailable(format!("{}: {}", self.path.display(), e)))?;
        debug!("Loaded {} rows x {} columns", table.row_count(), table.columns.len());
        Ok(table)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// CSV snapshot fetched with an HTTP GET
#[derive(Debug, Clone)]
pub struct HttpCsvSnapshot {
    pub url: String,
    pub timeout: Duration,
}

impl HttpCsvSnapshot {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self { url: url.into(), timeout }
    }
}

impl SnapshotSource for HttpCsvSnapshot {
    fn load(&self) -> Result<Table, GemError> {
        debug!("Fetching snapshot from {}", self.url);
        let resp = ureq::get(&self.url)
            .set("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .call()
            .map_err(|e| GemError::SnapshotUnavailable(format!("{}: {}", self.url, e)))?;
        let table = parse_csv(resp.into_reader())
            .map_err(|e| GemError::SnapshotUnavailable(format!("{}: {}", self.url, e)))?;
        debug!("Fetched {} rows x {} columns", table.row_count(), table.columns.len());
        Ok(table)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// A snapshot already in memory; `None` behaves as an unreachable source
#[derive(Debug, Clone)]
pub struct StaticSnapshot(pub Option<Table>);

impl SnapshotSource for StaticSnapshot {
    fn load(&self) -> Result<Table, GemError> {
        self.0.clone().ok_or_else(|| GemError::SnapshotUnavailable("static snapshot not available".to_string()))
    }

    fn describe(&self) -> String {
        "in-memory snapshot".to_string()
    }
}
