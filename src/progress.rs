//! Progress reporting using indicatif.
//!
//! The engine reports through the [`ProgressCallback`] trait; [`Progress`]
//! is the terminal implementation, drawing a spinner while walking and one
//! bar per hashing stage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Phase name used by the directory walker.
pub const WALKING_PHASE: &str = "walking";

/// Progress callback for duplicate finding phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline. Methods are called from worker
/// threads concurrently.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ("walking", "quick_hash", "full_hash")
    /// * `total` - Total number of items to process (0 if unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items finished so far (1-based)
    /// * `path` - Path just processed, empty if it failed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been fully hashed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    quick: Mutex<Option<ProgressBar>>,
    full: Mutex<Option<ProgressBar>>,
    hashed_bytes: AtomicU64,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupescout::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// assert!(progress.is_quiet());
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let multi = MultiProgress::new();
        if quiet {
            multi.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self {
            multi,
            walking: Mutex::new(None),
            quick: Mutex::new(None),
            full: Mutex::new(None),
            hashed_bytes: AtomicU64::new(0),
            quiet,
        }
    }

    /// Whether output is suppressed.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Bytes fully hashed since the full-hash phase started.
    #[must_use]
    pub fn hashed_bytes(&self) -> u64 {
        self.hashed_bytes.load(Ordering::Relaxed)
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn quick_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn full_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {prefix} {msg} {per_sec} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            WALKING_PHASE => Some(&self.walking),
            crate::duplicates::QUICK_HASH_PHASE => Some(&self.quick),
            crate::duplicates::FULL_HASH_PHASE => Some(&self.full),
            _ => None,
        }
    }

    /// The bar of the most recently started phase that is still running.
    fn active_bar(&self) -> Option<ProgressBar> {
        [&self.full, &self.quick, &self.walking]
            .into_iter()
            .find_map(|slot| slot.lock().ok().and_then(|guard| guard.clone()))
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if phase == crate::duplicates::FULL_HASH_PHASE {
            self.hashed_bytes.store(0, Ordering::Relaxed);
        }
        if self.quiet {
            return;
        }

        let pb = match phase {
            WALKING_PHASE => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking directories");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            crate::duplicates::QUICK_HASH_PHASE => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::quick_style());
                pb.set_message("Quick hashing");
                pb
            }
            crate::duplicates::FULL_HASH_PHASE => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::full_style());
                pb.set_message("Full hashing");
                pb
            }
            other => {
                log::debug!("Ignoring unknown progress phase: {}", other);
                return;
            }
        };

        if let Some(Ok(mut guard)) = self.slot(phase).map(Mutex::lock) {
            *guard = Some(pb);
        }
    }

    fn on_item_completed(&self, bytes: u64) {
        let total = self.hashed_bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        if let Ok(guard) = self.full.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_prefix(format!("{} hashed", ByteSize::b(total)));
            }
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if let Some(pb) = self.active_bar() {
            pb.set_position(current as u64);
            if !path.is_empty() {
                pb.set_message(truncate_path(path, 30));
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        let message = match phase {
            WALKING_PHASE => "Walking complete",
            crate::duplicates::QUICK_HASH_PHASE => "Quick hashing complete",
            crate::duplicates::FULL_HASH_PHASE => "Full hashing complete",
            _ => return,
        };
        if let Some(Ok(mut guard)) = self.slot(phase).map(Mutex::lock) {
            if let Some(pb) = guard.take() {
                pb.finish_with_message(message);
            }
        }
    }

    fn on_message(&self, message: &str) {
        if let Some(pb) = self.active_bar() {
            pb.set_message(message.to_string());
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let keep: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{keep}");
    }

    format!(".../{file_name}")
}
