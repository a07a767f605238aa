//! Command-line interface definitions for blockdupe.
//!
//! This module defines all CLI arguments using the clap derive API. Options
//! left unset on the command line fall back to the config file and
//! environment (see [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # Scan the current directory (non-recursive)
//! blockdupe
//!
//! # Scan two trees recursively, ignoring build output
//! blockdupe -r ~/photos /mnt/backup -E target -E .git
//!
//! # Only consider JPEG and PNG files, hashing 64 KiB blocks with SHA-256
//! blockdupe -r ~/photos -P '.*\.jpe?g,.*\.png' -B 64KiB -H sha256
//!
//! # JSON output for scripting
//! blockdupe -r ~/photos --output json
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::scanner::HashAlgorithm;

/// Find duplicate files by comparing them block by block.
///
/// Files are bucketed by size, then compared one block at a time so that
/// differing files are told apart after reading as little as possible.
#[derive(Debug, Parser)]
#[command(name = "blockdupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Paths to scan (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Exclude files whose path relative to the scanned root contains this
    /// fragment (can be specified multiple times)
    #[arg(short = 'E', long = "exclude-path", value_name = "FRAGMENT")]
    pub exclude_paths: Vec<PathBuf>,

    /// Only consider files whose name matches one of these regular
    /// expressions (separated by ',', ';' or ':', case-insensitive)
    #[arg(short = 'P', long, value_name = "REGEXES")]
    pub patterns: Option<String>,

    /// Block size used for comparison (default: 1024)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(short = 'B', long, value_name = "SIZE", value_parser = parse_size)]
    pub block_size: Option<u64>,

    /// Minimum file size to consider (default: 1)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(short = 'S', long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Hash algorithm for block digests: md5 or sha256 (default: md5)
    #[arg(short = 'H', long = "hash", value_name = "ALGORITHM", value_parser = parse_hash)]
    pub hash: Option<HashAlgorithm>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ignore config files and BLOCKDUPE_* environment variables
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the merged configuration as TOML and exit without scanning
    #[arg(long)]
    pub print_config: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for the duplicate report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One path per line, groups separated by a blank line
    #[default]
    Text,
    /// Pretty-printed JSON document with groups and summary
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports the following formats:
/// - Plain numbers: "1024" (bytes)
/// - Decimal suffixes: "1KB", "1MB", "1GB", "1TB" (powers of 1000)
/// - Binary suffixes: "1KiB", "1MiB", "1GiB", "1TiB" (powers of 1024)
///
/// Suffixes are case-insensitive. Decimal points are supported (e.g., "1.5MB").
///
/// # Errors
///
/// Returns an error message if the input is empty, not a number, negative,
/// or has an unknown suffix.
///
/// # Examples
///
/// ```
/// use blockdupe::cli::parse_size;
///
/// assert_eq!(parse_size("4KiB").unwrap(), 4096);
/// assert_eq!(parse_size("1.5MB").unwrap(), 1_500_000);
/// ```
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a hash algorithm name (`md5` or `sha256`, case-insensitive).
///
/// # Errors
///
/// Returns the [`ConfigError`](crate::error::ConfigError) message for
/// unknown names.
pub fn parse_hash(s: &str) -> Result<HashAlgorithm, String> {
    s.parse().map_err(|e: crate::error::ConfigError| e.to_string())
}
