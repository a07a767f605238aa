//! Per-block content digests.
//!
//! # Overview
//!
//! This module provides the hash primitive used by the dedup tree:
//!
//! - [`HashAlgorithm`]: the closed set of supported algorithms (MD5, SHA-256)
//! - [`Digest`]: a fixed-size, ordered digest value usable as a map key
//! - [`BlockReader`]: a scoped file handle reading fixed-size blocks
//! - [`BlockHasher`]: a reusable engine that turns one block into a [`Digest`]
//!
//! Only the block being compared is ever read. The last block of a file is
//! zero-padded to the configured block size before hashing, so every digest
//! covers exactly `block_size` bytes.
//!
//! # Example
//!
//! ```
//! use blockdupe::scanner::{BlockHasher, HashAlgorithm};
//! use std::num::NonZeroUsize;
//!
//! let block_size = NonZeroUsize::new(4).unwrap();
//! let mut hasher = BlockHasher::new(HashAlgorithm::Md5, block_size);
//!
//! let a = hasher.digest(b"abcd");
//! let b = hasher.digest(b"abcd");
//! assert_eq!(a, b);
//! assert_eq!(a.as_bytes().len(), 16);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use sha2::Sha256;

use super::HashError;
use crate::error::ConfigError;

/// Largest digest produced by any supported algorithm (SHA-256).
pub const MAX_DIGEST_LEN: usize = 32;

/// Hash algorithm used for block digests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5 (16-byte digests). Fast, and collisions require adversarial input.
    #[default]
    Md5,
    /// SHA-256 (32-byte digests).
    Sha256,
}

impl HashAlgorithm {
    /// Length in bytes of digests produced by this algorithm.
    #[must_use]
    pub fn digest_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha256 => 32,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" => Ok(Self::Sha256),
            _ => Err(ConfigError::UnknownHashAlgorithm(s.to_string())),
        }
    }
}

/// Digest of one block.
///
/// Stored inline so it can be copied and used as an ordered map key
/// without allocation. Digests from different algorithms never meet in
/// the same tree.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest {
    len: u8,
    bytes: [u8; MAX_DIGEST_LEN],
}

impl Digest {
    /// Build a digest from raw bytes.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is longer than [`MAX_DIGEST_LEN`].
    #[must_use]
    pub fn from_slice(raw: &[u8]) -> Self {
        assert!(
            raw.len() <= MAX_DIGEST_LEN,
            "digest of {} bytes exceeds {MAX_DIGEST_LEN}",
            raw.len()
        );
        let mut bytes = [0u8; MAX_DIGEST_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Self {
            len: raw.len() as u8,
            bytes,
        }
    }

    /// The digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Lowercase hexadecimal rendering.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.as_bytes() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

/// Number of blocks a file of `size` bytes occupies.
///
/// An empty file still has one (all-zero) block so that it terminates
/// after a single comparison step.
#[must_use]
pub fn block_count(size: u64, block_size: NonZeroUsize) -> u64 {
    size.div_ceil(block_size.get() as u64).max(1)
}

/// Scoped read handle over one file, reading whole blocks.
///
/// The handle is opened for one comparison and dropped as soon as the
/// comparison at that file is finished.
#[derive(Debug)]
pub struct BlockReader {
    file: File,
    path: PathBuf,
    size: u64,
    position: u64,
}

impl BlockReader {
    /// Open `path`, whose length was `size` bytes when it was discovered.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Changed`] if the file is no longer `size` bytes
    /// long, or another [`HashError`] if it cannot be opened.
    pub fn open(path: &Path, size: u64) -> Result<Self, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let actual = file
            .metadata()
            .map_err(|e| HashError::from_io(path, e))?
            .len();
        if actual != size {
            return Err(HashError::Changed {
                path: path.to_path_buf(),
                expected: size,
                actual,
            });
        }
        Ok(Self {
            file,
            path: path.to_path_buf(),
            size,
            position: 0,
        })
    }

    /// Read block `index` into `buf`, zero-padding past end-of-file.
    ///
    /// `buf.len()` is the block size.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Truncated`] if the file ends before the length
    /// recorded at discovery, or another [`HashError`] on I/O failure.
    pub fn read_block(&mut self, index: u64, buf: &mut [u8]) -> Result<(), HashError> {
        let block_size = buf.len() as u64;
        let offset = index.saturating_mul(block_size);
        let wanted = self.size.saturating_sub(offset).min(block_size) as usize;

        if offset != self.position {
            self.file
                .seek(SeekFrom::Start(offset))
                .map_err(|e| HashError::from_io(&self.path, e))?;
        }

        if let Err(e) = self.file.read_exact(&mut buf[..wanted]) {
            // cursor is unknown after a failed read
            self.position = u64::MAX;
            return Err(if e.kind() == ErrorKind::UnexpectedEof {
                HashError::Truncated {
                    path: self.path.clone(),
                    expected: self.size,
                }
            } else {
                HashError::from_io(&self.path, e)
            });
        }
        buf[wanted..].fill(0);
        self.position = offset + wanted as u64;
        Ok(())
    }
}

enum Engine {
    Md5(Md5),
    Sha256(Sha256),
}

impl Engine {
    fn digest(&mut self, block: &[u8]) -> Digest {
        match self {
            Self::Md5(state) => {
                state.update(block);
                Digest::from_slice(&state.finalize_reset())
            }
            Self::Sha256(state) => {
                state.update(block);
                Digest::from_slice(&state.finalize_reset())
            }
        }
    }
}

/// Reusable block digest engine.
///
/// Holds one digest state and one block-sized scratch buffer. Every call
/// finalizes and resets the state, so calls never leak into each other.
pub struct BlockHasher {
    algorithm: HashAlgorithm,
    engine: Engine,
    scratch: Vec<u8>,
}

impl fmt::Debug for BlockHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockHasher")
            .field("algorithm", &self.algorithm)
            .field("block_size", &self.scratch.len())
            .finish()
    }
}

impl BlockHasher {
    /// Create a hasher for `algorithm` over blocks of `block_size` bytes.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, block_size: NonZeroUsize) -> Self {
        let engine = match algorithm {
            HashAlgorithm::Md5 => Engine::Md5(Md5::new()),
            HashAlgorithm::Sha256 => Engine::Sha256(Sha256::new()),
        };
        Self {
            algorithm,
            engine,
            scratch: vec![0; block_size.get()],
        }
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The configured block size in bytes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.scratch.len()
    }

    /// Digest one full block.
    ///
    /// Callers zero-pad short final blocks themselves; `block` is expected
    /// to be exactly [`block_size`](Self::block_size) bytes long.
    pub fn digest(&mut self, block: &[u8]) -> Digest {
        debug_assert_eq!(block.len(), self.scratch.len());
        self.engine.digest(block)
    }

    /// Read block `index` through `reader` and digest it.
    ///
    /// # Errors
    ///
    /// Propagates the reader's [`HashError`].
    pub fn digest_block(&mut self, reader: &mut BlockReader, index: u64) -> Result<Digest, HashError> {
        reader.read_block(index, &mut self.scratch)?;
        Ok(self.engine.digest(&self.scratch))
    }
}
