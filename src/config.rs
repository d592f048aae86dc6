use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error_handling::CheckError;
use crate::models::{ListMatch, ServerSpec};

// constants (used as defaults)
/// Default size of the outstanding-query window.
pub const DEFAULT_WORKERS: usize = 10;
/// Default per-wait-cycle query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 15;
/// Default resolver retry attempts (configured once into the transport).
pub const DEFAULT_RETRIES: usize = 2;
/// Per-attempt timeout of the underlying resolver in seconds.
pub const RESOLVER_ATTEMPT_TIMEOUT_SECS: u64 = 5;
/// Usable last-octet range of a class-C block.
pub const CLASS_C_FIRST_OCTET: u8 = 1;
pub const CLASS_C_LAST_OCTET: u8 = 254;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to
/// most verbose (Trace). Used with the `--log-level` CLI option.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Command-line options and configuration.
///
/// This struct is automatically generated by `clap` from the field
/// attributes. All options have sensible defaults and can be overridden via
/// command-line flags.
///
/// # Examples
///
/// ```bash
/// # Check one host against two blacklists
/// rbl_status mail.example.com -s bl.spamcop.net -s zen.spamhaus.org
///
/// # Scan the whole /24 around the host
/// rbl_status 192.0.2.10 -s bl.spamcop.net --class-c
///
/// # Whitelist check with an explicit confirmation pattern
/// rbl_status 192.0.2.10 -s "list.dnswl.org:WL=127.0" --whitelist
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rbl_status",
    about = "Checks whether an SMTP host (or its /24 block) is listed on DNS block-lists."
)]
pub struct Config {
    /// Target host: an IPv4 address or a hostname.
    #[arg(value_parser)]
    pub host: String,

    /// IP-based list server, repeatable. Format: suffix[:BL=pat|:WL=pat]
    #[arg(short = 's', long = "server")]
    pub servers: Vec<String>,

    /// Domain-based (RHSBL) list server, repeatable. Same format.
    #[arg(long = "rhserver")]
    pub rhservers: Vec<String>,

    /// Maximum number of outstanding DNS queries.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-wait-cycle query timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_QUERY_TIMEOUT_SECS)]
    pub query_timeout: u64,

    /// Resolver retry attempts per query.
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: usize,

    /// Only issue IP-based queries; skip RHSBL even if configured.
    #[arg(long)]
    pub ip_only: bool,

    /// Scan the target's whole class-C block (last octets 1-254).
    #[arg(long)]
    pub class_c: bool,

    /// Whitelist mode: absence from a list counts as listed.
    #[arg(long)]
    pub whitelist: bool,

    /// Listed-server count at or above which the check is WARNING.
    #[arg(long, default_value_t = 1)]
    pub warning: usize,

    /// Listed-server count at or above which the check is CRITICAL.
    #[arg(long, default_value_t = 1)]
    pub critical: usize,

    /// Write a per-IP CSV report to this path.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Restrict lookups to IPv4 answers.
    #[arg(long)]
    pub ipv4_only: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }
}

/// Parses configured server entries into [`ServerSpec`]s.
///
/// Each entry is a list suffix, optionally tagged with a confirmation
/// pattern: `bl.example.org`, `bl.example.org:BL=127.0.0.2` or
/// `wl.example.org:WL=127.0`.
///
/// # Errors
///
/// Returns `CheckError::UnknownListType` if an entry carries a tag that is
/// neither `BL=` nor `WL=`. This is fatal at configuration-parsing time.
pub fn parse_server_specs(entries: &[String]) -> Result<Vec<ServerSpec>, CheckError> {
    entries
        .iter()
        .map(|entry| {
            let entry = entry.trim();
            match entry.split_once(':') {
                None => Ok(ServerSpec::generic(entry)),
                Some((suffix, tag)) => {
                    let matcher = if let Some(pattern) = tag.strip_prefix("BL=") {
                        ListMatch::Blacklist(pattern.to_string())
                    } else if let Some(pattern) = tag.strip_prefix("WL=") {
                        ListMatch::Whitelist(pattern.to_string())
                    } else {
                        return Err(CheckError::UnknownListType(entry.to_string()));
                    };
                    Ok(ServerSpec {
                        suffix: suffix.to_string(),
                        matcher,
                    })
                }
            }
        })
        .collect()
}
