//! Duplicate detection.
//!
//! - [`tree`]: the incremental size/block-digest tree
//! - [`groups`]: traversal yielding confirmed duplicate groups
//! - [`finder`]: scan orchestration over one or more roots

pub mod finder;
pub mod groups;
pub mod tree;

pub use finder::{DuplicateFinder, FinderConfig, ScanSummary};
pub use groups::{DuplicateGroup, Groups};
pub use tree::{DedupTree, TreeStats};
