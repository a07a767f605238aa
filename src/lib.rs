//! blockdupe - block-by-block duplicate file finder
//!
//! Files are grouped by exact size, then compared one block digest at a
//! time in an incremental tree, so files that differ are told apart after
//! reading only their common prefix and files of unique size are never
//! read at all.
//!
//! - [`scanner`]: candidate discovery and block hashing
//! - [`duplicates`]: the dedup tree, group traversal and scan orchestration
//! - [`output`]: text and JSON reports

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::{Config, ScanSettings};
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application, writing the report to stdout.
///
/// # Errors
///
/// Returns an error for invalid configuration (downcasts to
/// [`error::ConfigError`]) or when the report cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run_app_to(cli, &mut out)
}

/// Run the application, writing the report to `out`.
///
/// Configuration is validated before anything is scanned. Scan and read
/// errors are logged and do not change the exit code; an interrupted scan
/// reports what it found and returns [`ExitCode::Interrupted`].
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_to<W: Write>(cli: Cli, out: &mut W) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.print_config {
        let config = Config::load(&cli)?;
        ScanSettings::from_config(&config, cli.paths.clone())?;
        let text = config.to_toml().context("Failed to render configuration")?;
        out.write_all(text.as_bytes())
            .context("Failed to write configuration")?;
        return Ok(ExitCode::Success);
    }

    let settings = ScanSettings::resolve(&cli)?;
    log::debug!(
        "Block size {}, hash {}, recursive {}, min size {}",
        settings.block_size,
        settings.algorithm,
        settings.walker.recursive,
        settings.walker.min_size
    );

    let shutdown = signal::install_handler().context("Failed to set up Ctrl+C handling")?;

    let config = FinderConfig::default()
        .with_block_size(settings.block_size)
        .with_algorithm(settings.algorithm)
        .with_walker_config(settings.walker)
        .with_shutdown_flag(shutdown.get_flag())
        .with_progress_callback(Arc::new(Progress::new(cli.quiet)));

    let (tree, summary) = DuplicateFinder::new(config).scan(&settings.roots);
    summary.log();

    let exit_code = if summary.interrupted {
        ExitCode::Interrupted
    } else {
        ExitCode::Success
    };

    match cli.output {
        OutputFormat::Text => TextOutput::new(&mut *out)
            .write_all(tree.groups())
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(tree.groups(), &summary, exit_code)
            .write_to(out, true)
            .context("Failed to write report")?,
    }

    Ok(exit_code)
}
