//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk, with gitignore-style, regex and
//!   size filtering
//! - The two digest capabilities used by the duplicate engine: a fast
//!   partial quick digest and a strong whole-content digest
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Quick (XxHash64 head/tail) and full (BLAKE3 streaming) digests
//!
//! # Example
//!
//! ```no_run
//! use dupescout::duplicates::Stats;
//! use dupescout::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let config = WalkerConfig {
//!     min_size: Some(1024), // Skip files under 1KB
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let stats = Arc::new(Stats::new());
//! let walker = Walker::new(vec![PathBuf::from(".")], config);
//! let buckets = walker.collect_buckets(&stats).unwrap();
//! println!("{} distinct sizes", buckets.len());
//! ```

pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// Re-export main types
pub use hasher::{
    hash_to_hex, Blake3Hasher, FullDigest, FullHash, QuickDigest, XxQuickHasher,
    EMPTY_QUICK_DIGEST, FULL_HASH_CHUNK, QUICK_HASH_WINDOW,
};
pub use walker::Walker;

/// A discovered file: the unit of input to the duplicate engine.
///
/// Produced by the traversal layer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes at discovery time
    pub size: u64,
}

impl FileRecord {
    /// Create a new FileRecord.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// Configuration for directory walking.
///
/// Controls filtering, symlink handling, and other walk behavior.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Admit zero-byte files as records. They are skipped by default
    /// since every empty file is trivially identical to every other.
    pub include_empty: bool,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,

    /// Glob patterns to ignore (gitignore-style).
    pub ignore_patterns: Vec<String>,

    /// Only file names matching at least one of these are kept (if any).
    pub include_regex: Vec<regex::Regex>,

    /// File names matching any of these are dropped.
    pub exclude_regex: Vec<regex::Regex>,
}

impl WalkerConfig {
    /// Set the gitignore-style ignore patterns.
    #[must_use]
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Set the regex include filters.
    #[must_use]
    pub fn with_include_regex(mut self, patterns: Vec<regex::Regex>) -> Self {
        self.include_regex = patterns;
        self
    }

    /// Set the regex exclude filters.
    #[must_use]
    pub fn with_exclude_regex(mut self, patterns: Vec<regex::Regex>) -> Self {
        self.exclude_regex = patterns;
        self
    }

    /// Set the size bounds.
    #[must_use]
    pub fn with_size_bounds(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An ignore pattern could not be compiled.
    #[error("Invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Why it was rejected
        message: String,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while hashing `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
