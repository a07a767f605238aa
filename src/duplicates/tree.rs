//! Incremental block-hash dedup tree.
//!
//! # Overview
//!
//! Files are partitioned first by exact size and then by a chain of
//! per-block digests. Each bucket owns a tree of [`BlockNode`]s; a node at
//! depth `d` holds the files whose first `d` blocks are identical.
//!
//! Files are inserted one at a time. A file is only read when another file
//! of the same size reaches the same node, and then only one block at a
//! time, so comparison cost is proportional to the common prefix rather
//! than to file size. A file whose size is unique is never opened.
//!
//! ```text
//! size 10 ─ root ─┬─ d(0123) ─┬─ d(4567) ─ d(89..) : [a, b]   <- group
//!                 │           └─ d(45x7) : [c]                <- unique
//!                 └─ d(zzzz) : [e]                            <- unresolved
//! ```
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::duplicates::DedupTree;
//! use blockdupe::scanner::HashAlgorithm;
//! use std::num::NonZeroUsize;
//! use std::path::PathBuf;
//!
//! let mut tree = DedupTree::new(NonZeroUsize::new(1024).unwrap(), HashAlgorithm::Md5);
//! tree.insert(PathBuf::from("a.bin"), 4096).unwrap();
//! tree.insert(PathBuf::from("b.bin"), 4096).unwrap();
//!
//! for group in tree.groups() {
//!     println!("{} bytes: {:?}", group.size, group.paths);
//! }
//! ```

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::scanner::{block_count, BlockHasher, BlockReader, Digest, HashAlgorithm, HashError};

use super::groups::Groups;

/// Node of the per-size digest chain.
///
/// `paths` holds either a single unresolved occupant, or the files that
/// terminated here. `children` is only populated once an occupant has been
/// split, and then `paths` is empty.
#[derive(Debug, Default)]
pub(crate) struct BlockNode {
    pub(crate) paths: Vec<PathBuf>,
    pub(crate) children: BTreeMap<Digest, BlockNode>,
}

impl BlockNode {
    fn is_vacant(&self) -> bool {
        self.paths.is_empty() && self.children.is_empty()
    }
}

/// I/O counters for one tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Files that entered the tree
    pub files: usize,
    /// Blocks read and digested
    pub blocks_hashed: u64,
    /// Bytes read from disk (excluding zero padding)
    pub bytes_read: u64,
}

/// Size-partitioned, digest-chained dedup tree.
///
/// Exclusively owned by the ingestion loop while files are inserted; once
/// ingestion is done it can be shared immutably and walked with
/// [`groups`](Self::groups) any number of times.
#[derive(Debug)]
pub struct DedupTree {
    block_size: NonZeroUsize,
    hasher: BlockHasher,
    buckets: BTreeMap<u64, BlockNode>,
    stats: TreeStats,
    errors: Vec<HashError>,
}

impl DedupTree {
    /// Create an empty tree comparing blocks of `block_size` bytes.
    #[must_use]
    pub fn new(block_size: NonZeroUsize, algorithm: HashAlgorithm) -> Self {
        Self {
            block_size,
            hasher: BlockHasher::new(algorithm, block_size),
            buckets: BTreeMap::new(),
            stats: TreeStats::default(),
            errors: Vec::new(),
        }
    }

    /// Configured block size.
    #[must_use]
    pub fn block_size(&self) -> NonZeroUsize {
        self.block_size
    }

    /// Configured hash algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.hasher.algorithm()
    }

    /// I/O counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    /// Number of files held by the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stats.files
    }

    /// Whether no file has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats.files == 0
    }

    /// Number of distinct file sizes seen.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Take the errors of files evicted while being split.
    ///
    /// An occupant that can no longer be read when a later file needs to be
    /// compared against it is dropped from the tree; its error lands here.
    pub fn take_errors(&mut self) -> Vec<HashError> {
        std::mem::take(&mut self.errors)
    }

    /// Lazy traversal over the confirmed duplicate groups.
    ///
    /// Buckets are visited in ascending size order, nodes in pre-order.
    /// Each call starts a fresh, independent traversal.
    #[must_use]
    pub fn groups(&self) -> Groups<'_> {
        Groups::new(&self.buckets)
    }

    /// Insert one candidate file of `size` bytes.
    ///
    /// `size` must be the file's length at discovery. The file is read only
    /// as far as needed to tell it apart from the files already in its
    /// bucket.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be read. The file is then
    /// not part of the tree and the rest of the tree is unaffected.
    pub fn insert(&mut self, path: PathBuf, size: u64) -> Result<(), HashError> {
        let block_size = self.block_size;
        let blocks = block_count(size, block_size);
        let Self {
            hasher,
            buckets,
            stats,
            errors,
            ..
        } = self;

        let mut node = buckets.entry(size).or_default();
        if node.is_vacant() {
            log::trace!("New size bucket {} for {}", size, path.display());
            node.paths.push(path);
            stats.files += 1;
            return Ok(());
        }

        let mut incoming = BlockReader::open(&path, size)?;
        let mut depth: u64 = 0;

        loop {
            // Read the incoming block before touching the node, so a failure
            // here leaves the node as it was.
            let digest = hasher.digest_block(&mut incoming, depth)?;
            stats.blocks_hashed += 1;
            stats.bytes_read += block_bytes(size, depth, block_size);

            if node.children.is_empty() {
                debug_assert_eq!(node.paths.len(), 1, "unsplit node must hold one occupant");
                if let Some(occupant) = node.paths.pop() {
                    match occupant_digest(hasher, &occupant, size, depth) {
                        Ok(split) => {
                            stats.blocks_hashed += 1;
                            stats.bytes_read += block_bytes(size, depth, block_size);
                            log::trace!(
                                "Split {} at depth {} ({})",
                                occupant.display(),
                                depth,
                                split
                            );
                            node.children
                                .entry(split)
                                .or_default()
                                .paths
                                .push(occupant);
                        }
                        Err(e) => {
                            log::warn!("Dropping {}: {}", occupant.display(), e);
                            errors.push(e);
                            // the incoming file replaces the evicted occupant
                            node.paths.push(path);
                            return Ok(());
                        }
                    }
                }
            }

            node = node.children.entry(digest).or_default();
            depth += 1;

            if depth == blocks {
                log::trace!("{} terminated at depth {}", path.display(), depth);
                node.paths.push(path);
                stats.files += 1;
                return Ok(());
            }

            if node.is_vacant() {
                node.paths.push(path);
                stats.files += 1;
                return Ok(());
            }
        }
    }
}

/// Bytes actually present in block `index` of a `size`-byte file.
fn block_bytes(size: u64, index: u64, block_size: NonZeroUsize) -> u64 {
    let block_size = block_size.get() as u64;
    size.saturating_sub(index.saturating_mul(block_size))
        .min(block_size)
}

/// Digest block `depth` of an occupant that is being split.
///
/// The handle is opened for this one block and closed on return.
fn occupant_digest(
    hasher: &mut BlockHasher,
    path: &Path,
    size: u64,
    depth: u64,
) -> Result<Digest, HashError> {
    let mut reader = BlockReader::open(path, size)?;
    hasher.digest_block(&mut reader, depth)
}
