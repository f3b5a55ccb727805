use crate::config::AppConfig;
use crate::delivery::{Artifact, DeliveryAdapter, DeliveryMetadata};
use crate::error::GemError;
use crate::filter::{self, FilterSpec};
use crate::report::{self, Summary};
use crate::schema::Schema;
use crate::snapshot::SnapshotSource;
use crate::types::Table;
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const MAX_NAME_ATTEMPTS: usize = 1000;

/// One report request: who it is for and which stones to include
#[derive(Debug, Clone)]
pub struct Request {
    pub recipient: Option<String>,
    /// Raw FilterSpec object; validated when the request runs
    pub filter: serde_json::Value,
}

/// Result returned to the caller of a successful request
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub summary: Summary,
    pub artifact_name: String,
    /// Delivery locator, or the local path when delivery failed
    pub artifact_reference: String,
    pub row_count: usize,
    /// Set when delivery failed; the report itself was still produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_error: Option<String>,
}

/// A completed run, including the filtered rows for console preview
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub response: Response,
    pub filtered: Table,
}

/// Run one request end to end
///
/// Validation happens before the snapshot is touched. An empty filtered set
/// stops the run with `NoMatch` before anything is rendered or delivered.
pub fn run_request(
    request: &Request,
    snapshot: &dyn SnapshotSource,
    delivery: &dyn DeliveryAdapter,
    config: &AppConfig,
    output_dir: &Path,
) -> Result<RunOutcome, GemError> {
    // Step 1: Validate the request
    let recipient = request
        .recipient
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| GemError::MissingInput("recipient".to_string()))?;
    let spec = FilterSpec::from_json(request.filter.clone())?;

    // Step 2: Load and filter
    debug!("Loading snapshot from {}", snapshot.describe());
    let table = snapshot.load()?;
    let schema = Schema::resolve(&table, &config.columns);
    let table = table.with_numeric_columns(&schema.numeric_columns());
    let filtered = filter::filter_table(&table, &spec, &schema)?;
    info!("Filter kept {} of {} stones", filtered.row_count(), table.row_count());

    if filtered.is_empty() {
        return Err(GemError::NoMatch);
    }

    // Step 3: Summarize and render
    let summary = report::summarize(&filtered, &schema);
    let sheet = report::render_report(&filtered, &schema, &summary, &config.report)?;
    let bytes = report::encode_xlsx(&sheet)?;

    let base_name = artifact_name(&config.report.artifact_prefix, chrono::Local::now());
    let (artifact_name, local_path) = write_artifact(output_dir, &base_name, &bytes)?;
    let artifact = Artifact { name: artifact_name.clone(), bytes, local_path };

    // Step 4: Deliver; failures are reported but do not fail the request
    let meta = DeliveryMetadata { recipient: recipient.to_string(), artifact_name: artifact_name.clone() };
    let (artifact_reference, delivery_error) = match deliver(delivery, &artifact, &meta) {
        Ok(locator) => (locator, None),
        Err(e) => {
            warn!("Delivery of {} failed: {}", artifact_name, e);
            (artifact.local_path.display().to_string(), Some(e))
        }
    };

    Ok(RunOutcome {
        response: Response {
            summary,
            artifact_name,
            artifact_reference,
            row_count: filtered.row_count(),
            delivery_error,
        },
        filtered,
    })
}

fn deliver(delivery: &dyn DeliveryAdapter, artifact: &Artifact, meta: &DeliveryMetadata) -> Result<String, String> {
    let locator = delivery.store(artifact).map_err(|e| e.to_string())?;
    debug!("Stored {} at {}", artifact.name, locator);
    delivery.notify(meta, &locator).map_err(|e| e.to_string())?;
    Ok(locator)
}

/// Artifact file name, e.g. `inventory_20260105_143000.xlsx`
pub fn artifact_name<Tz: chrono::TimeZone>(prefix: &str, at: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.xlsx", prefix, at.format("%Y%m%d_%H%M%S"))
}

/// Name tried on the `attempt`th collision: `inventory_20260105_143000_2.xlsx`
fn numbered_name(base: &str, attempt: usize) -> String {
    if attempt < 2 {
        return base.to_string();
    }
    match base.strip_suffix(".xlsx") {
        Some(stem) => format!("{}_{}.xlsx", stem, attempt),
        None => format!("{}_{}", base, attempt),
    }
}

/// Write the workbook under a name no earlier report in `output_dir` holds
///
/// Files are created exclusively, so two requests finishing within the same
/// second get `_2`, `_3`, ... suffixes instead of overwriting each other.
fn write_artifact(output_dir: &Path, base_name: &str, bytes: &[u8]) -> Result<(String, PathBuf), GemError> {
    fs::create_dir_all(output_dir)
        .map_err(|e| GemError::RenderFailure(format!("cannot create {}: {}", output_dir.display(), e)))?;

    for attempt in 1..=MAX_NAME_ATTEMPTS {
        let name = numbered_name(base_name, attempt);
        let path = output_dir.join(&name);
        let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(GemError::RenderFailure(format!("cannot create {}: {}", path.display(), e))),
        };
        file.write_all(bytes)
            .map_err(|e| GemError::RenderFailure(format!("cannot write {}: {}", path.display(), e)))?;
        debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        return Ok((name, path));
    }

    Err(GemError::RenderFailure(format!(
        "no free file name for {} in {}",
        base_name,
        output_dir.display()
    )))
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
