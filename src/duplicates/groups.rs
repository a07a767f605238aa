//! Duplicate groups and the traversal that extracts them.
//!
//! # Overview
//!
//! [`Groups`] walks a finished [`DedupTree`](super::DedupTree) and yields
//! one [`DuplicateGroup`] per node holding two or more files. Nodes with a
//! single file (unresolved or confirmed unique) are skipped.
//!
//! Order is deterministic: size buckets ascending, then a pre-order walk of
//! each bucket's digest tree (a node's own files before its children,
//! children in digest order).
//!
//! The cursor is an explicit stack of child iterators, one per depth, so a
//! traversal can stop anywhere, be cloned, and resume later. Traversals only
//! borrow the tree, so several can run over the same tree at once.
//!
//! # Example
//!
//! ```no_run
//! use blockdupe::duplicates::DedupTree;
//! use blockdupe::scanner::HashAlgorithm;
//! use std::num::NonZeroUsize;
//!
//! let tree = DedupTree::new(NonZeroUsize::new(1024).unwrap(), HashAlgorithm::Md5);
//!
//! let mut groups = tree.groups();
//! let first = groups.next();
//! let snapshot = groups.clone();
//! assert_eq!(groups.count(), snapshot.count());
//! # let _ = first;
//! ```

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::tree::BlockNode;
use crate::scanner::Digest;

/// Confirmed group of byte-identical files.
///
/// Borrows its paths from the tree it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup<'a> {
    /// File size in bytes (shared by all files in the group)
    pub size: u64,
    /// Paths of the identical files, in insertion order
    pub paths: &'a [PathBuf],
}

impl<'a> DuplicateGroup<'a> {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.paths.len() as u64
    }

    /// Space that removing every copy but one would free.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }
}

/// Lazy, restartable traversal over the duplicate groups of a tree.
///
/// Created by [`DedupTree::groups`](super::DedupTree::groups).
#[derive(Debug, Clone)]
pub struct Groups<'a> {
    buckets: btree_map::Iter<'a, u64, BlockNode>,
    size: u64,
    stack: Vec<btree_map::Values<'a, Digest, BlockNode>>,
}

impl<'a> Groups<'a> {
    pub(crate) fn new(buckets: &'a BTreeMap<u64, BlockNode>) -> Self {
        Self {
            buckets: buckets.iter(),
            size: 0,
            stack: Vec::new(),
        }
    }

    /// Current depth of the cursor within its bucket.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Enter `node`: schedule its children and report it if it is a group.
    fn visit(&mut self, node: &'a BlockNode) -> Option<DuplicateGroup<'a>> {
        if !node.children.is_empty() {
            self.stack.push(node.children.values());
        }
        (node.paths.len() >= 2).then(|| DuplicateGroup {
            size: self.size,
            paths: &node.paths,
        })
    }
}

impl<'a> Iterator for Groups<'a> {
    type Item = DuplicateGroup<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(children) = self.stack.last_mut() {
                match children.next() {
                    Some(node) => {
                        if let Some(group) = self.visit(node) {
                            return Some(group);
                        }
                    }
                    None => {
                        self.stack.pop();
                    }
                }
                continue;
            }

            let (&size, root) = self.buckets.next()?;
            self.size = size;
            if let Some(group) = self.visit(root) {
                return Some(group);
            }
        }
    }
}

impl std::iter::FusedIterator for Groups<'_> {}
