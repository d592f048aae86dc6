//! Logger and DNS resolver initialization.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use log::LevelFilter;

use crate::config::{Config, LogFormat, RESOLVER_ATTEMPT_TIMEOUT_SECS};
use crate::dns::HickoryTransport;
use crate::error_handling::InitializationError;
use crate::resolver::DnsTransport;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting. The logger reads from the
/// `RUST_LOG` environment variable by default, but the provided `level`
/// overrides it, so `--log-level` always wins while `RUST_LOG` still works
/// for quick per-module debugging.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger was already
/// installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    // The resolver logs a warning for every malformed UDP reply it shrugs
    // off; at list-query volume that is pure noise.
    builder.filter_module("hickory_proto", LevelFilter::Error);
    builder.filter_module("hickory_resolver", LevelFilter::Warn);
    builder.filter_module("rbl_status", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };
                writeln!(
                    buf,
                    "{} [{}] {}",
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init() instead of init(): tests may initialize more than once.
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// Builds the DNS transport for a check run.
///
/// The retry count, per-attempt timeout and forced protocol family are
/// configured once into the resolver here; the scheduling loop never sees
/// them. `ndots = 0` keeps search domains from being appended to list query
/// names.
pub fn init_transport(config: &Config) -> Arc<dyn DnsTransport> {
    let mut builder = TokioResolver::builder_with_config(
        ResolverConfig::default(),
        TokioConnectionProvider::default(),
    );

    let opts = builder.options_mut();
    opts.timeout = Duration::from_secs(RESOLVER_ATTEMPT_TIMEOUT_SECS);
    opts.attempts = config.retries;
    opts.ndots = 0;
    if config.ipv4_only {
        opts.ip_strategy = LookupIpStrategy::Ipv4Only;
    }

    Arc::new(HickoryTransport::new(builder.build()))
}
