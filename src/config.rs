//! Layered configuration.
//!
//! Settings are merged with figment, later layers winning:
//!
//! 1. [`Config::default()`]
//! 2. a TOML file: `--config <PATH>` if given, otherwise `config.toml` in the
//!    platform config directory when it exists
//! 3. environment variables prefixed with `BLOCKDUPE_` (e.g. `BLOCKDUPE_HASH=sha256`)
//! 4. command-line flags
//!
//! Exclude fragments accumulate across layers instead of replacing each
//! other. [`ScanSettings::resolve`] validates the merged result.
//!
//! ```toml
//! block_size = 4096
//! min_size = 1
//! hash = "sha256"
//! recursive = true
//! patterns = '.*\.jpe?g,.*\.png'
//! exclude_paths = [".git", "node_modules"]
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::scanner::{ExcludeSet, HashAlgorithm, PatternSet, WalkerConfig};

/// Default block size in bytes.
pub const DEFAULT_BLOCK_SIZE: u64 = 1024;

/// Largest accepted block size (1 GiB). The dedup tree allocates one
/// block-sized buffer up front.
pub const MAX_BLOCK_SIZE: u64 = 1 << 30;

/// Default minimum file size in bytes.
pub const DEFAULT_MIN_SIZE: u64 = 1;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "BLOCKDUPE_";

/// Raw, unvalidated settings as they appear in files and the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Block size in bytes.
    pub block_size: u64,
    /// Files smaller than this are never candidates.
    pub min_size: u64,
    /// Hash algorithm for block digests.
    pub hash: HashAlgorithm,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Separator-delimited filename regexes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<String>,
    /// Relative path fragments to exclude.
    pub exclude_paths: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            min_size: DEFAULT_MIN_SIZE,
            hash: HashAlgorithm::default(),
            recursive: false,
            patterns: None,
            exclude_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Default config file location for this platform, if one can be determined.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockdupe", "blockdupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the defaults < file < environment layers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingConfigFile`] if `file` was given
    /// explicitly but does not exist. A missing default file is not an error.
    pub fn figment(file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match file {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
                }
                log::debug!("Loading config from {}", path.display());
                figment = figment.admerge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
                    log::debug!("Loading config from {}", path.display());
                    figment = figment.admerge(Toml::file(path));
                }
            }
        }

        Ok(figment.admerge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load the fully merged configuration for a command line.
    ///
    /// With `--no-config` only the defaults and the flags are merged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer is missing or malformed.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let base = if cli.no_config {
            Figment::from(Serialized::defaults(Config::default()))
        } else {
            Self::figment(cli.config.as_deref())?
        };
        let config = base
            .admerge(Serialized::defaults(CliOverrides::from(cli)))
            .extract()?;
        Ok(config)
    }

    /// Render as a TOML document that can be used as a config file.
    ///
    /// # Errors
    ///
    /// Returns the serializer error for values TOML cannot represent
    /// (e.g. non-UTF-8 exclude paths).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// The subset of [`Config`] the command line actually set.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    block_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<HashAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recursive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    patterns: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclude_paths: Vec<PathBuf>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            block_size: cli.block_size,
            min_size: cli.min_size,
            hash: cli.hash,
            // a bare flag can only turn recursion on
            recursive: cli.recursive.then_some(true),
            patterns: cli.patterns.clone(),
            exclude_paths: cli.exclude_paths.clone(),
        }
    }
}

/// Validated settings for one scan.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Roots to scan, in command-line order.
    pub roots: Vec<PathBuf>,
    /// Block size for the dedup tree.
    pub block_size: NonZeroUsize,
    /// Hash algorithm for block digests.
    pub algorithm: HashAlgorithm,
    /// Candidate filters.
    pub walker: WalkerConfig,
}

impl ScanSettings {
    /// Merge all configuration layers for `cli` and validate them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unreadable config, a block size of zero
    /// or above [`MAX_BLOCK_SIZE`], or a pattern that is not a valid regex.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let config = Config::load(cli)?;
        Self::from_config(&config, cli.paths.clone())
    }

    /// Validate an already merged [`Config`].
    ///
    /// An empty `roots` list means the current directory.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve).
    pub fn from_config(config: &Config, roots: Vec<PathBuf>) -> Result<Self, ConfigError> {
        let block_size = Some(config.block_size)
            .filter(|&size| size <= MAX_BLOCK_SIZE)
            .and_then(|size| usize::try_from(size).ok())
            .and_then(NonZeroUsize::new)
            .ok_or(ConfigError::InvalidBlockSize(config.block_size))?;

        let patterns = match config.patterns.as_deref() {
            Some(list) => PatternSet::parse(list)?,
            None => PatternSet::default(),
        };

        let roots = if roots.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            roots
        };

        let walker = WalkerConfig::default()
            .with_recursive(config.recursive)
            .with_min_size(config.min_size)
            .with_patterns(patterns)
            .with_excludes(ExcludeSet::new(&config.exclude_paths));

        Ok(Self {
            roots,
            block_size,
            algorithm: config.hash,
            walker,
        })
    }
}
