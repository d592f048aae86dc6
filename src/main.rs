//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `rbl_status` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - The monitoring status line and exit code
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use rbl_status::initialization::init_logger_with;
use rbl_status::{evaluate_status, export_csv, perf_data, run_check, summary};
use rbl_status::{CheckStatus, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let warning = config.warning;
    let critical = config.critical;
    let csv_path = config.csv.clone();

    match run_check(config).await {
        Ok(report) => {
            if let Some(path) = csv_path {
                if let Err(e) = export_csv(&report.results, Some(&path)) {
                    log::warn!("Failed to write CSV report to {}: {e:#}", path.display());
                }
            }

            let status = evaluate_status(report.totals.servers_listed, warning, critical);
            println!(
                "RBL {}: {}|{}",
                status.label(),
                summary(&report),
                perf_data(&report)
            );
            process::exit(status.exit_code());
        }
        Err(e) => {
            // Fatal configuration or target-resolution errors map to UNKNOWN.
            println!("RBL {}: {e:#}", CheckStatus::Unknown.label());
            process::exit(CheckStatus::Unknown.exit_code());
        }
    }
}
