//! Application configuration management.
//!
//! Settings are layered with `figment`, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: the explicit `--config` path, or `config.toml` in the
//!    platform config directory if it exists
//! 3. Environment variables prefixed with `DUPESCOUT_`
//!    (e.g. `DUPESCOUT_WORKERS=8`)
//! 4. Command-line flags, applied by the CLI layer after loading
//!
//! # Example
//!
//! ```toml
//! workers = 8
//! quick_hash_window = 4096
//! ignore_patterns = ["node_modules/", "*.tmp"]
//! skip_hidden = true
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::duplicates::{default_workers, FinderConfig};
use crate::scanner::{Blake3Hasher, WalkerConfig, XxQuickHasher, FULL_HASH_CHUNK, QUICK_HASH_WINDOW};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPESCOUT_";

/// Errors raised while loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A provider failed or a value had the wrong type.
    #[error("Invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("Invalid value for '{field}': {message}")]
    Invalid {
        /// The offending key
        field: &'static str,
        /// Why it was rejected
        message: String,
    },

    /// A regex filter does not compile.
    #[error("Invalid regex '{pattern}': {source}")]
    Regex {
        /// The offending pattern
        pattern: String,
        /// The compile error
        #[source]
        source: regex::Error,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads per hashing stage.
    pub workers: usize,
    /// Bytes read from each end of a file by the quick digest.
    pub quick_hash_window: usize,
    /// Buffer size for streaming the full digest.
    pub full_hash_chunk: usize,
    /// Minimum file size to consider.
    pub min_size: Option<u64>,
    /// Maximum file size to consider.
    pub max_size: Option<u64>,
    /// Gitignore-style patterns excluded from the walk.
    pub ignore_patterns: Vec<String>,
    /// File names matching any of these are excluded.
    pub exclude_regex: Vec<String>,
    /// If non-empty, only file names matching one of these are included.
    pub include_regex: Vec<String>,
    /// Follow symbolic links.
    pub follow_symlinks: bool,
    /// Skip dot-files and dot-directories.
    pub skip_hidden: bool,
    /// Admit zero-byte files as candidates.
    pub include_empty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            quick_hash_window: QUICK_HASH_WINDOW,
            full_hash_chunk: FULL_HASH_CHUNK,
            min_size: None,
            max_size: None,
            ignore_patterns: Vec::new(),
            exclude_regex: Vec::new(),
            include_regex: Vec::new(),
            follow_symlinks: false,
            skip_hidden: false,
            include_empty: false,
        }
    }
}

impl Config {
    /// The platform-specific default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupescout", "dupescout")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the layered provider chain without extracting it.
    ///
    /// With `path == None` the default location is used if it exists.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = path.map(Path::to_path_buf).or_else(Self::default_path);
        if let Some(file) = file {
            log::debug!("Reading configuration from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the file and environment layers.
    ///
    /// Values are not range-checked here: command-line overrides still have
    /// to be applied, so call [`Config::validate`] on the final result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an explicit path is missing or a provider
    /// fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(p) = path {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.to_path_buf()));
            }
        }

        let config: Self = Self::figment(path).extract().map_err(Box::new)?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Check value ranges and compile the regex filters.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid {
                field: "workers",
                message: "must be at least 1".to_string(),
            });
        }
        if self.quick_hash_window == 0 {
            return Err(ConfigError::Invalid {
                field: "quick_hash_window",
                message: "must be at least 1 byte".to_string(),
            });
        }
        if self.full_hash_chunk == 0 {
            return Err(ConfigError::Invalid {
                field: "full_hash_chunk",
                message: "must be at least 1 byte".to_string(),
            });
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(ConfigError::Invalid {
                    field: "min_size",
                    message: format!("{min} is larger than max_size {max}"),
                });
            }
        }
        compile_all(&self.include_regex)?;
        compile_all(&self.exclude_regex)?;
        Ok(())
    }

    /// Walker settings derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Regex` if a filter does not compile.
    pub fn walker_config(&self) -> Result<WalkerConfig, ConfigError> {
        Ok(WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
            include_empty: self.include_empty,
            ..WalkerConfig::default()
        }
        .with_size_bounds(self.min_size, self.max_size)
        .with_ignore_patterns(self.ignore_patterns.clone())
        .with_include_regex(compile_all(&self.include_regex)?)
        .with_exclude_regex(compile_all(&self.exclude_regex)?))
    }

    /// Engine settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_workers(self.workers)
            .with_quick_hasher(Arc::new(XxQuickHasher::with_window(self.quick_hash_window)))
            .with_full_hasher(Arc::new(Blake3Hasher::with_chunk_size(self.full_hash_chunk)))
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| ConfigError::Regex {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}
