//! Candidate filters: filename patterns and exclude-path fragments.
//!
//! Patterns are case-insensitive regular expressions matched against the
//! whole file name. Several patterns may be given in one string, separated
//! by `,`, `;` or `:`.
//!
//! Exclude fragments are relative paths. A path is excluded when its
//! components, relative to the root it was found under, contain the
//! fragment's components as a contiguous run at any depth.
//!
//! # Example
//!
//! ```
//! use blockdupe::scanner::{ExcludeSet, PatternSet};
//! use std::path::Path;
//!
//! let patterns = PatternSet::parse(r".*\.jpe?g;.*\.png").unwrap();
//! assert!(patterns.matches_name("Holiday.JPG"));
//! assert!(!patterns.matches_name("notes.txt"));
//!
//! let excludes = ExcludeSet::new(["build/test"]);
//! assert!(excludes.matches(Path::new("project/build/test/x.txt")));
//! assert!(!excludes.matches(Path::new("project/build/tests/x.txt")));
//! ```

use std::ffi::OsString;
use std::path::{Component, Path};

use regex::{Regex, RegexBuilder};

use crate::error::ConfigError;

/// Separators accepted between patterns.
const PATTERN_SEPARATORS: [char; 3] = [',', ';', ':'];

/// Compiled set of filename patterns.
///
/// An empty set matches every file.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Parse a separator-delimited pattern list.
    ///
    /// Empty items are ignored, so `""` yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for the first pattern that
    /// does not compile.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let mut patterns = Vec::new();
        for raw in list.split(PATTERN_SEPARATORS) {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let regex = RegexBuilder::new(&format!("^(?:{raw})$"))
                .case_insensitive(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    pattern: raw.to_string(),
                    source,
                })?;
            patterns.push(regex);
        }
        Ok(Self { patterns })
    }

    /// Number of patterns in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set is empty (matches everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check a bare file name against the set.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|re| re.is_match(name))
    }

    /// Check the file name of `path` against the set.
    #[must_use]
    pub fn matches_path(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.matches_name(&name)
    }
}

/// Set of relative path fragments to exclude.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    fragments: Vec<Vec<OsString>>,
}

impl ExcludeSet {
    /// Build a set from relative path fragments.
    ///
    /// `.` and empty components are dropped; a fragment that ends up with no
    /// components is ignored.
    pub fn new<I, P>(fragments: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let fragments = fragments
            .into_iter()
            .map(|p| normal_components(p.as_ref()))
            .filter(|parts| !parts.is_empty())
            .collect();
        Self { fragments }
    }

    /// Number of fragments in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Check a path relative to its scan root.
    #[must_use]
    pub fn matches(&self, relative: &Path) -> bool {
        if self.fragments.is_empty() {
            return false;
        }
        let parts = normal_components(relative);
        self.fragments.iter().any(|fragment| {
            parts
                .windows(fragment.len())
                .any(|window| window == fragment.as_slice())
        })
    }
}

fn normal_components(path: &Path) -> Vec<OsString> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_os_string()),
            Component::ParentDir => Some(OsString::from("..")),
            _ => None,
        })
        .collect()
}
