//! Configuration errors, exit codes and structured error reporting.

use serde::Serialize;
use std::path::PathBuf;

/// Errors detected before scanning starts.
///
/// Any of these aborts the run with [`ExitCode::ConfigError`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The hash algorithm name is not one of `md5`, `sha256`.
    #[error("Unknown hash algorithm '{0}' (expected: md5|sha256)")]
    UnknownHashAlgorithm(String),

    /// A filename pattern is not a valid regular expression.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compilation error
        #[source]
        source: regex::Error,
    },

    /// The block size must be between one byte and
    /// [`MAX_BLOCK_SIZE`](crate::config::MAX_BLOCK_SIZE).
    #[error("Invalid block size {0}: must be between 1 byte and 1 GiB")]
    InvalidBlockSize(u64),

    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    MissingConfigFile(PathBuf),

    /// The layered configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Exit codes for the blockdupe application.
///
/// - 0: Success (scan completed, whether or not duplicates were found)
/// - 1: General error (unexpected failure)
/// - 2: Configuration error (nothing was scanned)
/// - 130: Interrupted by user (Ctrl+C); partial results were printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Invalid options or configuration.
    ConfigError = 2,
    /// Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "BD000",
            Self::GeneralError => "BD001",
            Self::ConfigError => "BD002",
            Self::Interrupted => "BD130",
        }
    }

    /// Exit code for a fatal application error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<ConfigError>().is_some() {
            Self::ConfigError
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "BD002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
