/// Configuration resolution module
///
/// This module handles:
/// - Loading the TOML configuration file (every key has a default)
/// - Applying CLI overrides on top of it
/// - Reading the filter file and `--set` overrides into a request
/// - Validating band column letters and column mappings up front
use crate::cli::CliArgs;
use crate::error::GemError;
use crate::filter;
use crate::report::layout::ReportLayout;
use crate::report::{DiscountLabel, SummaryMode};
use crate::runner::Request;
use crate::schema::ColumnNames;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Excel rejects these in sheet names
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub report: ReportSettings,
    pub columns: ColumnNames,
    pub delivery: DeliverySettings,
}

/// `[report]` section: report layout and labeling
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// Caption written into the title band
    pub title: String,
    pub sheet_name: String,
    pub title_first_column: String,
    pub title_last_column: String,
    pub summary_first_column: String,
    pub summary_mode: SummaryMode,
    pub discount_label: DiscountLabel,
    /// Artifact file names start with this prefix
    pub artifact_prefix: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "Filtered Inventory Report".to_string(),
            sheet_name: "Report".to_string(),
            title_first_column: "F".to_string(),
            title_last_column: "P".to_string(),
            summary_first_column: "F".to_string(),
            summary_mode: SummaryMode::default(),
            discount_label: DiscountLabel::default(),
            artifact_prefix: "inventory".to_string(),
        }
    }
}

/// `[delivery]` section: remote storage and notification endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeliverySettings {
    /// Endpoint the workbook bytes are POSTed to; absent means local-only delivery
    pub upload_url: Option<String>,
    /// Endpoint granting public read access; `{id}` is replaced with the uploaded file id
    pub share_url_template: Option<String>,
    /// Shareable link; `{id}` is replaced with the uploaded file id
    pub link_template: Option<String>,
    /// Downstream workflow notified with one JSON row per report
    pub webhook_url: Option<String>,
    /// Remote folder the upload is filed under
    pub folder: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            upload_url: None,
            share_url_template: None,
            link_template: None,
            webhook_url: None,
            folder: None,
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Check everything that can be checked before a snapshot is loaded
    pub fn validate(&self) -> Result<(), GemError> {
        let r = &self.report;
        ReportLayout::new(&r.title_first_column, &r.title_last_column, &r.summary_first_column, 0)?;

        if r.sheet_name.is_empty() || r.sheet_name.chars().count() > 31 || r.sheet_name.contains(INVALID_SHEET_CHARS) {
            return Err(GemError::Config(format!("invalid sheet name '{}'", r.sheet_name)));
        }
        if r.artifact_prefix.contains(['/', '\\']) {
            return Err(GemError::Config(format!("artifact prefix '{}' must not contain path separators", r.artifact_prefix)));
        }

        self.columns.validate()
    }
}

/// Where the snapshot comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotLocation {
    File(PathBuf),
    Url(String),
}

/// A fully resolved invocation
#[derive(Debug, Clone)]
pub struct RequestPlan {
    pub request: Request,
    pub snapshot: SnapshotLocation,
    pub config: AppConfig,
    pub output_dir: PathBuf,
    pub remote_delivery: bool,
}

/// Default config file location, e.g. ~/.config/gem-report/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gem-report").join("config.toml"))
}

/// Parse configuration text
pub fn parse_config(text: &str) -> Result<AppConfig, GemError> {
    toml::from_str(text).map_err(|e| GemError::Config(e.to_string()))
}

/// Load and validate configuration.
///
/// An explicit path must exist; the default path is used only when present.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, GemError> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let config = match path {
        Some(p) => {
            debug!("Loading config from {:?}", p);
            let text = fs::read_to_string(&p)
                .map_err(|e| GemError::Config(format!("cannot read {}: {}", p.display(), e)))?;
            parse_config(&text)?
        }
        None => {
            debug!("No config file, using defaults");
            AppConfig::default()
        }
    };

    config.validate()?;
    Ok(config)
}

/// Read the filter file (if any) and apply `--set` overrides
pub fn load_filter(path: Option<&Path>, overrides: &[(String, String)]) -> Result<serde_json::Value, GemError> {
    let mut value = match path {
        Some(p) => {
            let text = fs::read_to_string(p)
                .map_err(|e| GemError::Config(format!("cannot read filter file {}: {}", p.display(), e)))?;
            serde_json::from_str(&text)
                .map_err(|e| GemError::invalid_filter("filter", p.display().to_string(), e.to_string()))?
        }
        None => serde_json::Value::Object(serde_json::Map::new()),
    };

    filter::apply_overrides(&mut value, overrides)?;
    Ok(value)
}

/// Build a complete RequestPlan from CLI arguments
pub fn build_request_plan(args: &CliArgs) -> Result<RequestPlan, GemError> {
    debug!("Building request plan from CLI args");

    let mut config = load_config(args.config.as_deref())?;
    if let Some(mode) = args.summary_mode {
        config.report.summary_mode = mode;
    }
    if let Some(label) = args.discount_label {
        config.report.discount_label = label;
    }

    let filter = load_filter(args.filter.as_deref(), &args.set)?;

    let snapshot = match (&args.inventory, &args.inventory_url) {
        (Some(path), None) => SnapshotLocation::File(path.clone()),
        (None, Some(url)) => SnapshotLocation::Url(url.clone()),
        _ => return Err(GemError::Config("exactly one inventory source is required".to_string())),
    };

    let remote_delivery = !args.no_delivery && config.delivery.upload_url.is_some();
    debug!("Snapshot {:?}, remote delivery {}", snapshot, remote_delivery);

    Ok(RequestPlan {
        request: Request { recipient: args.recipient.clone(), filter },
        snapshot,
        config,
        output_dir: args.get_output_dir(),
        remote_delivery,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
