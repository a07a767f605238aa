//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, the candidate supplier of the
//! dedup pipeline. It traverses one scan root and yields a [`FileEntry`] for
//! every regular file that passes the configured filters.
//!
//! # Features
//!
//! - Recursive or single-level traversal
//! - Entries sorted by file name for deterministic output
//! - Exclude-path fragments, pruning whole directories
//! - Case-insensitive filename patterns
//! - Minimum size filtering
//! - Graceful shutdown via atomic flag
//!
//! Symbolic links are never followed and never offered as candidates.
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for candidate discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root.
    ///
    /// The root may be a directory or a single regular file.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Path of `path` relative to the scan root.
    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Whether a directory entry survives the exclude fragments.
    fn is_included(&self, entry: &DirEntry) -> bool {
        let keep = !self.config.excludes.matches(self.relative(entry.path()));
        if !keep {
            log::trace!("Excluding: {}", entry.path().display());
        }
        keep
    }

    /// Apply size and pattern filters to a discovered file.
    fn accept(&self, path: PathBuf, size: u64) -> Option<FileEntry> {
        if size < self.config.min_size {
            log::trace!("Skipping file below minimum size ({}): {}", size, path.display());
            return None;
        }
        if !self.config.patterns.matches_path(&path) {
            log::trace!("Skipping file not matching patterns: {}", path.display());
            return None;
        }
        Some(FileEntry::new(path, size))
    }

    /// Walk the root, yielding candidate file entries.
    ///
    /// Returns an iterator over [`FileEntry`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration; a missing
    /// root yields a single [`ScanError::NotFound`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use blockdupe::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} candidates", files.len());
    /// ```
    pub fn walk(&self) -> Box<dyn Iterator<Item = Result<FileEntry, ScanError>> + '_> {
        let metadata = match std::fs::metadata(&self.root) {
            Ok(m) => m,
            Err(e) => {
                let err = ScanError::from_io(&self.root, e);
                log::debug!("Cannot scan root: {}", err);
                return Box::new(std::iter::once(Err(err)));
            }
        };

        if metadata.is_file() {
            let entry = self.accept(self.root.clone(), metadata.len());
            return Box::new(entry.map(Ok).into_iter());
        }

        if !metadata.is_dir() {
            return Box::new(std::iter::once(Err(ScanError::NotAFileOrDirectory(
                self.root.clone(),
            ))));
        }

        let mut walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name();
        if !self.config.recursive {
            walk_dir = walk_dir.max_depth(1);
        }

        let entries = walk_dir
            .into_iter()
            .filter_entry(move |entry| self.is_included(entry))
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    return false;
                }
                true
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(&entry),
                Err(e) => Some(Err(self.handle_walk_error(e))),
            });

        Box::new(entries)
    }

    /// Turn one walk entry into a candidate, if it is one.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<FileEntry, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }
        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", entry.path().display());
            return None;
        }
        if !file_type.is_file() {
            log::trace!("Skipping special file: {}", entry.path().display());
            return None;
        }

        match entry.metadata() {
            Ok(metadata) => self.accept(entry.path().to_path_buf(), metadata.len()).map(Ok),
            Err(e) => Some(Err(self.handle_walk_error(e))),
        }
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        match error.into_io_error() {
            Some(io) => ScanError::from_io(&path, io),
            None => ScanError::Io {
                path,
                source: std::io::Error::other("filesystem loop detected"),
            },
        }
    }
}
