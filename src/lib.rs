//! rbl_status library: DNS block-list probing for SMTP hosts.
//!
//! This library checks whether a host — or every host in its /24 class-C
//! block — is present on one or more DNS-based block-lists (RBL) or
//! domain-based lists (RHSBL), and reports per-host listing state plus
//! aggregate counts.
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use rbl_status::{run_check, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::parse_from([
//!     "rbl_status",
//!     "192.0.2.10",
//!     "-s",
//!     "bl.example.org",
//! ]);
//!
//! let report = run_check(config).await?;
//! println!(
//!     "{} servers listed, {} timeouts",
//!     report.totals.servers_listed, report.totals.timeouts
//! );
//! # Ok(())
//! # }
//! ```
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or call library functions from within an async context.

pub mod classify;
pub mod config;
pub mod dns;
pub mod error_handling;
pub mod initialization;
pub mod models;
pub mod planner;
pub mod report;
pub mod resolver;
pub mod scanner;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::CheckError;
pub use models::{AggregateResult, IpScanResult};
pub use report::{evaluate_status, export_csv, perf_data, summary, CheckStatus};
pub use run::{run_check, CheckReport};

// Internal run module (contains the main check logic)
mod run {
    use anyhow::{Context, Result};
    use log::info;

    use crate::classify::Classifier;
    use crate::config::Config;
    use crate::initialization::init_transport;
    use crate::models::{AggregateResult, CheckMode, IpScanResult};
    use crate::planner::ensure_sources;
    use crate::resolver::ConcurrentResolver;
    use crate::scanner::{resolve_target, RangeScanner};
    use crate::config;

    /// Results of one check run.
    #[derive(Debug, Clone)]
    pub struct CheckReport {
        /// The configured target host, as given.
        pub target: String,
        /// Number of list servers each IP was checked against.
        pub servers_checked: usize,
        /// One entry per scanned IP, in scan order.
        pub results: Vec<IpScanResult>,
        /// Aggregate totals across all scanned IPs.
        pub totals: AggregateResult,
        /// Elapsed wall-clock time in seconds.
        pub elapsed_seconds: f64,
    }

    /// Runs a block-list check with the provided configuration.
    ///
    /// This is the main entry point for the library. It resolves the target,
    /// scans it (or its class-C block) against the configured list servers,
    /// and returns the per-IP results plus aggregate totals.
    ///
    /// # Errors
    ///
    /// Fails before any scanning begins when no list sources are configured,
    /// a server entry carries an unknown list type tag, the worker count is
    /// zero, or (in single-host mode) the target host cannot be resolved.
    pub async fn run_check(config: Config) -> Result<CheckReport> {
        let servers = config::parse_server_specs(&config.servers)?;
        let rhservers = config::parse_server_specs(&config.rhservers)?;

        // Class-C scanning is IP-only by definition.
        let ip_only = config.ip_only || config.class_c;
        ensure_sources(&servers, &rhservers, ip_only)?;

        let mode = if config.whitelist {
            CheckMode::Whitelist
        } else {
            CheckMode::Blacklist
        };

        let transport = init_transport(&config);
        let resolver =
            ConcurrentResolver::new(transport.clone(), config.workers, config.query_timeout())?;

        let start_time = std::time::Instant::now();

        let target = resolve_target(&config.host, ip_only, transport.as_ref())
            .await
            .with_context(|| format!("Failed to resolve target host '{}'", config.host))?;
        info!(
            "checking {} ({}) against {} RBL and {} RHSBL server(s)",
            config.host,
            target.base,
            servers.len(),
            rhservers.len()
        );

        let scanner = RangeScanner::new(
            &resolver,
            Classifier::new(mode),
            &servers,
            &rhservers,
            ip_only,
        );
        let outcome = scanner.scan(&target, config.class_c).await?;

        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        info!(
            "scanned {} host(s) in {:.2}s: {} listed server(s), {} timeout(s)",
            outcome.results.len(),
            elapsed_seconds,
            outcome.totals.servers_listed,
            outcome.totals.timeouts
        );

        Ok(CheckReport {
            target: config.host,
            servers_checked: servers.len() + if ip_only { 0 } else { rhservers.len() },
            results: outcome.results,
            totals: outcome.totals,
            elapsed_seconds,
        })
    }
}
