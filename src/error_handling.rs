use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Fatal error conditions for a check run.
///
/// All of these abort the run before (or instead of) scanning and map to the
/// UNKNOWN severity at the binary boundary. Per-query timeouts and missing
/// records are *not* errors; they are absorbed into the result model.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Neither RBL servers nor (usable) RHSBL servers were configured.
    #[error("no RBL or RHSBL list sources configured")]
    NoListSources,

    /// The target host has neither a usable forward nor reverse mapping.
    #[error("unable to resolve target host '{0}'")]
    TargetUnresolvable(String),

    /// A server spec carried a tag that is neither `BL=` nor `WL=`.
    #[error("server list entry '{0}': unknown list type (expected BL=<pattern> or WL=<pattern>)")]
    UnknownListType(String),

    /// Worker count of zero makes the resolution window unable to progress.
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,
}
