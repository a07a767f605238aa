//! Scan orchestration: walk every root and feed candidates to the tree.
//!
//! # Overview
//!
//! [`DuplicateFinder::scan`] drives a single sequential pipeline:
//!
//! 1. **Walk** each root with [`Walker`], applying size, pattern and exclude
//!    filters.
//! 2. **Dedupe paths**: a file reachable from several (overlapping) roots is
//!    offered once, keyed by its canonical path.
//! 3. **Insert** each candidate into the [`DedupTree`], which reads only as
//!    many blocks as needed.
//!
//! Errors never abort the scan. Walk errors and per-file read errors are
//! logged at `warn` and collected in the [`ScanSummary`].
//!
//! The shutdown flag is checked between two insertions, so an interrupted
//! scan still yields a consistent tree holding every file inserted so far.
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let (tree, summary) = finder.scan(&[PathBuf::from(".")]);
//!
//! for group in tree.groups() {
//!     println!("{:?}", group.paths);
//! }
//! println!("Reclaimable: {}", summary.reclaimable_display());
//! ```

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::tree::DedupTree;
use crate::progress::{ProgressCallback, PHASE_SCAN};
use crate::scanner::{FileEntry, HashAlgorithm, HashError, ScanError, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Block size for comparisons.
    pub block_size: NonZeroUsize,
    /// Hash algorithm for block digests.
    pub algorithm: HashAlgorithm,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("block_size", &self.block_size)
            .field("algorithm", &self.algorithm)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            block_size: NonZeroUsize::new(1024).unwrap_or(NonZeroUsize::MIN),
            algorithm: HashAlgorithm::default(),
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the block size.
    #[must_use]
    pub fn with_block_size(mut self, block_size: NonZeroUsize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the hash algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Candidates offered to the tree
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Paths skipped because an overlapping root already offered them
    pub skipped_repeats: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one original per group)
    pub duplicate_files: usize,
    /// Space that removing the duplicates would free
    pub reclaimable_space: u64,
    /// Blocks read and digested
    pub blocks_hashed: u64,
    /// Bytes read from disk
    pub bytes_read: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Walk errors (skipped paths)
    pub scan_errors: Vec<ScanError>,
    /// Read errors (files dropped from comparison)
    pub hash_errors: Vec<HashError>,
}

impl ScanSummary {
    /// Percentage of the candidate bytes taken up by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Fraction of the candidate bytes that had to be read, in percent.
    #[must_use]
    pub fn read_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.bytes_read as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }

    /// Number of non-fatal errors of either kind.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.scan_errors.len() + self.hash_errors.len()
    }

    /// Fill the group-derived fields from a finished tree.
    fn record_groups(&mut self, tree: &DedupTree) {
        for group in tree.groups() {
            self.duplicate_groups += 1;
            self.duplicate_files += group.duplicate_count();
            self.reclaimable_space += group.reclaimable_space();
        }
        let stats = tree.stats();
        self.blocks_hashed = stats.blocks_hashed;
        self.bytes_read = stats.bytes_read;
    }

    /// Write the summary to the log at info level.
    pub fn log(&self) {
        log::info!(
            "Scanned {} files ({}) in {:.2?}{}",
            self.total_files,
            self.total_size_display(),
            self.scan_duration,
            if self.interrupted { ", interrupted" } else { "" }
        );
        log::info!(
            "Read {} in {} blocks ({:.1}% of candidate bytes)",
            ByteSize::b(self.bytes_read),
            self.blocks_hashed,
            self.read_percentage()
        );
        log::info!(
            "Found {} duplicate groups, {} duplicate files, {} reclaimable ({:.1}%)",
            self.duplicate_groups,
            self.duplicate_files,
            self.reclaimable_display(),
            self.wasted_percentage()
        );
        if self.skipped_repeats > 0 {
            log::info!(
                "Skipped {} paths reached through overlapping roots",
                self.skipped_repeats
            );
        }
        if self.error_count() > 0 {
            log::warn!(
                "{} paths could not be scanned, {} files could not be read",
                self.scan_errors.len(),
                self.hash_errors.len()
            );
        }
    }
}

/// Duplicate finder that walks roots and fills a [`DedupTree`].
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Scan `roots` in order and return the filled tree with statistics.
    ///
    /// This never fails: unreadable roots, directories and files are
    /// reported in the summary and skipped.
    pub fn scan(&self, roots: &[PathBuf]) -> (DedupTree, ScanSummary) {
        let start_time = Instant::now();
        let mut tree = DedupTree::new(self.config.block_size, self.config.algorithm);
        let mut summary = ScanSummary::default();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_SCAN, 0);
        }

        for root in roots {
            if self.config.is_shutdown_requested() {
                break;
            }
            log::info!("Scanning {}", root.display());
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_message(&format!("Scanning {}", root.display()));
            }
            self.scan_root(root, &mut tree, &mut seen, &mut summary);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_SCAN);
        }

        summary.hash_errors.extend(tree.take_errors());
        summary.record_groups(&tree);
        summary.interrupted = self.config.is_shutdown_requested();
        summary.scan_duration = start_time.elapsed();

        if summary.interrupted {
            log::info!("Scan interrupted by shutdown signal, results are partial");
        }

        (tree, summary)
    }

    fn scan_root(
        &self,
        root: &Path,
        tree: &mut DedupTree,
        seen: &mut HashSet<PathBuf>,
        summary: &mut ScanSummary,
    ) {
        let mut walker = Walker::new(root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        for result in walker.walk() {
            if self.config.is_shutdown_requested() {
                break;
            }
            match result {
                Ok(entry) => self.offer(entry, tree, seen, summary),
                Err(e) => {
                    log::warn!("{}", e);
                    summary.scan_errors.push(e);
                }
            }
        }
    }

    /// Insert one candidate unless it was already offered through another root.
    fn offer(
        &self,
        entry: FileEntry,
        tree: &mut DedupTree,
        seen: &mut HashSet<PathBuf>,
        summary: &mut ScanSummary,
    ) {
        let key = entry
            .path
            .canonicalize()
            .unwrap_or_else(|_| entry.path.clone());
        if !seen.insert(key) {
            log::debug!("Skipping repeated path {}", entry.path.display());
            summary.skipped_repeats += 1;
            return;
        }

        summary.total_files += 1;
        summary.total_size += entry.size;

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_progress(summary.total_files, &entry.path.to_string_lossy());
        }

        if let Err(e) = tree.insert(entry.path, entry.size) {
            log::warn!("Skipping unreadable file: {}", e);
            summary.hash_errors.push(e);
        }
    }
}
