//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct which traverses one or more
//! root directories and turns every accepted regular file into a
//! [`FileRecord`]. The result is bucketed by size to form the input of the
//! duplicate engine.
//!
//! # Features
//!
//! - Parallel directory traversal using jwalk (rayon underneath)
//! - Gitignore-style pattern matching via the `ignore` crate; ignored
//!   directories are pruned rather than descended
//! - Size, regex, hidden-file, symlink and zero-byte filtering
//! - Overlapping roots are collapsed so no file is visited twice
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupescout::duplicates::Stats;
//! use dupescout::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let stats = Arc::new(Stats::new());
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")], WalkerConfig::default());
//! let buckets = walker.collect_buckets(&stats).unwrap();
//! println!("{} files in {} size buckets", stats.total_files(), buckets.len());
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use crate::duplicates::{group_by_size, SizeBuckets, Stats};
use crate::progress::{ProgressCallback, WALKING_PHASE};

use super::{FileRecord, ScanError, WalkerConfig};

/// Directory walker for parallel file discovery.
pub struct Walker {
    /// Root paths to walk
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("roots", &self.roots)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .finish_non_exhaustive()
    }
}

/// Ignore matcher for one root.
struct RootMatcher {
    root: PathBuf,
    gitignore: Option<Gitignore>,
}

impl RootMatcher {
    /// Check if a path should be ignored based on configured patterns.
    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let Some(gi) = &self.gitignore else {
            return false;
        };
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let normalized = if cfg!(windows) {
            relative.to_string_lossy().replace('\\', "/")
        } else {
            relative.to_string_lossy().into_owned()
        };
        gi.matched(normalized, is_dir).is_ignore()
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

impl Walker {
    /// Create a new walker over the given roots.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupescout::scanner::{Walker, WalkerConfig};
    /// use std::path::PathBuf;
    ///
    /// let walker = Walker::new(vec![PathBuf::from(".")], WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self {
            roots,
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops iteration
    /// as soon as possible and returns what it has collected.
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

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Validate the roots and collapse duplicates and nested roots.
    ///
    /// # Errors
    ///
    /// Returns `ScanError` if a root does not exist or is not a directory.
    pub fn resolve_roots(&self) -> Result<Vec<PathBuf>, ScanError> {
        let mut resolved = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ScanError::NotFound(root.clone()),
                std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(root.clone()),
                _ => ScanError::Io {
                    path: root.clone(),
                    source: e,
                },
            })?;
            if !metadata.is_dir() {
                return Err(ScanError::NotADirectory(root.clone()));
            }
            let canonical = root.canonicalize().map_err(|e| ScanError::Io {
                path: root.clone(),
                source: e,
            })?;
            resolved.push(canonical);
        }

        // Shorter paths first so ancestors are kept before descendants
        resolved.sort_by_key(|p| p.components().count());
        let mut kept: Vec<PathBuf> = Vec::with_capacity(resolved.len());
        for root in resolved {
            if let Some(ancestor) = kept.iter().find(|k| root.starts_with(k)) {
                log::info!(
                    "Skipping root {} (already covered by {})",
                    root.display(),
                    ancestor.display()
                );
                continue;
            }
            kept.push(root);
        }
        kept.sort();
        Ok(kept)
    }

    /// Build the gitignore matcher for a root from the configured patterns.
    fn build_matcher(&self, root: &Path) -> Result<RootMatcher, ScanError> {
        if self.config.ignore_patterns.is_empty() {
            return Ok(RootMatcher {
                root: root.to_path_buf(),
                gitignore: None,
            });
        }

        let mut builder = GitignoreBuilder::new(root);
        for pattern in &self.config.ignore_patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| ScanError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
        }
        let gitignore = builder.build().map_err(|e| ScanError::InvalidPattern {
            pattern: self.config.ignore_patterns.join(", "),
            message: e.to_string(),
        })?;

        Ok(RootMatcher {
            root: root.to_path_buf(),
            gitignore: (!gitignore.is_empty()).then_some(gitignore),
        })
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if self.config.min_size.is_some_and(|min| size < min) {
            return false;
        }
        if self.config.max_size.is_some_and(|max| size > max) {
            return false;
        }
        true
    }

    /// Check if a file name passes regex filters.
    fn passes_regex_filter(&self, path: &Path) -> bool {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        // If include patterns are specified, at least one must match
        if !self.config.include_regex.is_empty()
            && !self.config.include_regex.iter().any(|re| re.is_match(&filename))
        {
            return false;
        }

        !self.config.exclude_regex.iter().any(|re| re.is_match(&filename))
    }

    /// Walk every root, returning the accepted files.
    ///
    /// Per-entry errors are logged and counted in `stats.error_count`; they
    /// never stop the walk.
    ///
    /// # Errors
    ///
    /// Returns `ScanError` if a root is invalid or an ignore pattern does
    /// not compile.
    pub fn walk(&self, stats: &Arc<Stats>) -> Result<Vec<FileRecord>, ScanError> {
        let roots = self.resolve_roots()?;
        let matchers = roots
            .iter()
            .map(|root| self.build_matcher(root))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(callback) = &self.progress_callback {
            callback.on_phase_start(WALKING_PHASE, 0);
        }

        let mut records = Vec::new();
        let mut seen = HashSet::new();
        for matcher in matchers {
            if self.is_shutdown_requested() {
                break;
            }
            log::info!("Walking {}", matcher.root.display());
            self.walk_root(Arc::new(matcher), stats, &mut seen, &mut records);
        }

        if let Some(callback) = &self.progress_callback {
            callback.on_phase_end(WALKING_PHASE);
        }

        log::info!(
            "Walk complete: {} files accepted, {} files and {} directories skipped, {} errors",
            records.len(),
            stats.skipped_files(),
            stats.skipped_dirs(),
            stats.error_count()
        );
        Ok(records)
    }

    fn walk_root(
        &self,
        matcher: Arc<RootMatcher>,
        stats: &Arc<Stats>,
        seen: &mut HashSet<PathBuf>,
        records: &mut Vec<FileRecord>,
    ) {
        let skip_hidden = self.config.skip_hidden;
        let prune_matcher = Arc::clone(&matcher);
        let prune_stats = Arc::clone(stats);

        let walk_dir = WalkDir::new(&matcher.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(false)
            .sort(true)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                // Pruning here keeps jwalk from descending into rejected directories
                children.retain(|child| {
                    let Ok(entry) = child else { return true };
                    let is_dir = entry.file_type().is_dir();
                    if skip_hidden && is_hidden(entry.file_name()) {
                        log::trace!("Skipping hidden entry: {}", entry.path().display());
                        if is_dir {
                            prune_stats.inc_skipped_dirs();
                        } else {
                            prune_stats.inc_skipped_files();
                        }
                        return false;
                    }
                    if prune_matcher.is_ignored(&entry.path(), is_dir) {
                        log::trace!("Ignoring entry: {}", entry.path().display());
                        if is_dir {
                            prune_stats.inc_skipped_dirs();
                        } else {
                            prune_stats.inc_skipped_files();
                        }
                        return false;
                    }
                    true
                });
            });

        for entry_result in walk_dir {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                break;
            }

            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| matcher.root.clone(), Path::to_path_buf);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    stats.inc_error_count();
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }

            let path = entry.path();
            if file_type.is_symlink() && !self.config.follow_symlinks {
                log::trace!("Skipping symlink: {}", path.display());
                stats.inc_skipped_files();
                continue;
            }

            let metadata = match std::fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        log::debug!("File vanished during walk: {}", path.display());
                    } else {
                        log::warn!("Failed to read metadata for {}: {}", path.display(), e);
                    }
                    stats.inc_error_count();
                    continue;
                }
            };

            if !metadata.is_file() {
                stats.inc_skipped_files();
                continue;
            }

            if let Some(record) = self.accept_file(path, metadata.len(), stats) {
                if seen.insert(record.path.clone()) {
                    stats.inc_total_files();
                    if let Some(callback) = &self.progress_callback {
                        callback.on_progress(records.len() + 1, &record.path.to_string_lossy());
                    }
                    records.push(record);
                }
            }
        }
    }

    /// Apply the per-file filters, counting rejections.
    fn accept_file(&self, path: PathBuf, size: u64, stats: &Stats) -> Option<FileRecord> {
        if size == 0 && !self.config.include_empty {
            log::debug!("Skipping empty file: {}", path.display());
            stats.inc_skipped_files();
            return None;
        }

        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            stats.inc_skipped_files();
            return None;
        }

        if !self.passes_regex_filter(&path) {
            log::trace!("Skipping file due to regex filter: {}", path.display());
            stats.inc_skipped_files();
            return None;
        }

        log::trace!("Accepted {} ({} bytes)", path.display(), size);
        Some(FileRecord::new(path, size))
    }

    /// Walk every root and bucket the accepted files by size.
    ///
    /// # Errors
    ///
    /// See [`Walker::walk`].
    pub fn collect_buckets(&self, stats: &Arc<Stats>) -> Result<SizeBuckets, ScanError> {
        Ok(group_by_size(self.walk(stats)?))
    }
}
