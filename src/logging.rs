//! Logging setup for blockdupe.
//!
//! Uses the `log` facade with the `env_logger` backend. Everything goes to
//! stderr so stdout carries nothing but the duplicate report.
//!
//! The level is chosen by, in priority order:
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. `--quiet` (errors only) or `--verbose` (debug, trace)
//! 3. info
//!
//! Non-fatal scan and hash errors are logged at `warn`, the end-of-scan
//! summary at `info`, per-file decisions at `debug` and `trace`.
//!
//! ```rust,no_run
//! use blockdupe::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logger from CLI verbosity flags.
///
/// Only the first call in a process installs a logger; later calls are
/// ignored, which lets tests drive [`run_app`](crate::run_app) repeatedly.
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = env::var_os("RUST_LOG").is_some();

    let mut builder = Builder::new();
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }
    builder.target(env_logger::Target::Stderr);
    configure_format(&mut builder, verbose);

    if builder.try_init().is_ok() {
        log::debug!("Logging initialized at level: {}", current_level_name());
    }
}

/// Map the CLI flags to a level filter. `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Compact `LEVEL message` lines; with `-v` the module path is added, and
/// debug builds prefix a timestamp.
fn configure_format(builder: &mut Builder, verbose: u8) {
    let with_module = verbose >= 1;
    let with_timestamp = cfg!(debug_assertions);

    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);

        if with_timestamp {
            write!(buf, "{} ", buf.timestamp_seconds())?;
        }
        write!(buf, "{style}{level:<5}{style:#} ")?;
        if with_module {
            write!(buf, "[{}] ", record.module_path().unwrap_or("unknown"))?;
        }
        writeln!(buf, "{}", record.args())
    });
}

/// Name of the currently active maximum log level.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
