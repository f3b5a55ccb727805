mod cli;
mod config;
mod console_format;
mod delivery;
mod error;
mod filter;
mod grades;
mod report;
mod runner;
mod schema;
mod snapshot;
mod types;
mod ui;

use config::{RequestPlan, SnapshotLocation};
use delivery::{DeliveryAdapter, HttpDelivery, LocalDelivery};
use error::{ErrorResponse, GemError};
use log::debug;
use snapshot::{CsvFileSnapshot, HttpCsvSnapshot, SnapshotSource};
use std::time::Duration;

fn main() {
    env_logger::init();

    // Parse CLI arguments
    let args = cli::CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    // Set console width override if specified (for testing)
    if let Some(width) = args.console_width {
        console_format::set_console_width(width);
    }

    let result = config::build_request_plan(&args).and_then(|plan| execute(&plan));

    match result {
        Ok(outcome) => {
            if args.json {
                match serde_json::to_string_pretty(&outcome.response) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        ui::print_error(&format!("Failed to serialize response: {}", e));
                        std::process::exit(2);
                    }
                }
            } else {
                console_format::print_preview(&outcome.filtered, args.preview_rows);
                console_format::print_summary(&outcome.response);
            }
        }
        Err(e) => {
            if args.json {
                if let Ok(json) = serde_json::to_string_pretty(&ErrorResponse::from(&e)) {
                    println!("{}", json);
                }
            }
            ui::print_error(&e.to_string());
            std::process::exit(e.exit_code());
        }
    }
}

/// Wire the configured snapshot source and delivery adapter into the pipeline
fn execute(plan: &RequestPlan) -> Result<runner::RunOutcome, GemError> {
    let timeout = Duration::from_secs(plan.config.delivery.timeout_secs);
    let snapshot: Box<dyn SnapshotSource> = match &plan.snapshot {
        SnapshotLocation::File(path) => Box::new(CsvFileSnapshot::new(path)),
        SnapshotLocation::Url(url) => Box::new(HttpCsvSnapshot::new(url, timeout)),
    };

    let delivery: Box<dyn DeliveryAdapter> = match HttpDelivery::from_settings(&plan.config.delivery) {
        Some(http) if plan.remote_delivery => Box::new(http),
        _ => Box::new(LocalDelivery),
    };
    debug!("Snapshot source: {}", snapshot.describe());

    ui::status(&format!("filtering {}", snapshot.describe()));
    runner::run_request(&plan.request, snapshot.as_ref(), delivery.as_ref(), &plan.config, &plan.output_dir)
}
