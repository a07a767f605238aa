//! Output formatters for duplicate scan results.
//!
//! - [`TextOutput`]: one path per line, groups separated by a blank line
//! - [`JsonOutput`]: groups plus summary for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::duplicates::DuplicateFinder;
//! use blockdupe::output::TextOutput;
//! use std::path::PathBuf;
//!
//! let (tree, _summary) = DuplicateFinder::with_defaults().scan(&[PathBuf::from(".")]);
//!
//! let stdout = std::io::stdout();
//! TextOutput::new(stdout.lock()).write_all(tree.groups()).unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
