use crate::report::{DiscountLabel, SummaryMode};
use clap::Parser;
use std::path::PathBuf;

/// Get the default cache directory for gem-report
/// Uses platform-specific cache directories:
/// - Linux: ~/.cache/gem-report
/// - macOS: ~/Library/Caches/gem-report
/// - Windows: %LOCALAPPDATA%/gem-report
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir().map(|p| p.join("gem-report")).unwrap_or_else(|| PathBuf::from(".gem-report"))
}

/// Parse a `key=value` filter override
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[derive(Parser, Debug, Clone)]
#[command(name = "gem-report")]
#[command(about = "Filter an inventory snapshot and render a styled spreadsheet report of the matches")]
#[command(version)]
pub struct CliArgs {
    /// Inventory snapshot CSV file
    #[arg(long, short = 'i', value_name = "PATH")]
    pub inventory: Option<PathBuf>,

    /// Fetch the inventory snapshot CSV from a URL instead of a file
    #[arg(long, value_name = "URL")]
    pub inventory_url: Option<String>,

    /// JSON file holding the filter criteria
    #[arg(long, short = 'f', value_name = "PATH")]
    pub filter: Option<PathBuf>,

    /// Set a single filter key, overriding the filter file
    /// List keys take comma-separated values: --set cut=EX,VG
    /// Can specify multiple: --set color_min=D --set color_max=G
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,

    /// Recipient identifier the report is prepared for (e.g. an email address)
    #[arg(long, short = 'r', value_name = "ID")]
    pub recipient: Option<String>,

    /// Directory the rendered report is written to
    /// Default: ~/.cache/gem-report/reports (Linux), ~/Library/Caches/gem-report/reports (macOS)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// TOML configuration file (default: <config dir>/gem-report/config.toml when present)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Summary band content, overriding the config file
    #[arg(long, value_enum, value_name = "MODE")]
    pub summary_mode: Option<SummaryMode>,

    /// Which discount quantity is labeled "Avg Disc", overriding the config file
    #[arg(long, value_enum, value_name = "SOURCE")]
    pub discount_label: Option<DiscountLabel>,

    /// Output the response as JSON
    #[arg(long)]
    pub json: bool,

    /// Keep the report local even when remote delivery is configured
    #[arg(long)]
    pub no_delivery: bool,

    /// Number of matching rows to echo to the console
    #[arg(long, default_value = "10")]
    pub preview_rows: usize,

    /// Override console width for testing (default: auto-detect)
    #[arg(long, value_name = "COLUMNS")]
    pub console_width: Option<usize>,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        match (&self.inventory, &self.inventory_url) {
            (Some(_), Some(_)) => Err("Cannot specify both --inventory and --inventory-url".to_string()),
            (None, None) => Err("Must specify an inventory snapshot with --inventory or --inventory-url".to_string()),
            _ => Ok(()),
        }
    }

    /// Get the output directory, using the default cache location if not specified
    pub fn get_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| default_cache_dir().join("reports"))
    }
}
