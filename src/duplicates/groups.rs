//! Size buckets and candidate selection.
//!
//! # Overview
//!
//! Grouping by exact size is the cheapest duplicate filter: files of
//! different sizes can never be identical, and a bucket holding a single
//! file can be discarded without touching the disk.
//!
//! # Example
//!
//! ```
//! use dupescout::duplicates::{group_by_size, select_candidates};
//! use dupescout::scanner::FileRecord;
//!
//! let buckets = group_by_size(vec![
//!     FileRecord::new("/a.txt", 100),
//!     FileRecord::new("/b.txt", 100),
//!     FileRecord::new("/c.txt", 200),
//! ]);
//! assert_eq!(buckets.len(), 2);
//!
//! // Only the 100-byte bucket has two members
//! let candidates = select_candidates(&buckets);
//! assert_eq!(candidates.len(), 2);
//! ```

use std::collections::{HashMap, HashSet};

use crate::scanner::FileRecord;

use super::FinderError;

/// Files grouped by exact byte size. Every record in a bucket has the
/// bucket's size.
pub type SizeBuckets = HashMap<u64, Vec<FileRecord>>;

/// Group records by size, dropping repeated paths.
///
/// Unlike [`select_candidates`], singleton buckets are kept: this is the
/// raw input the engine accepts.
#[must_use]
pub fn group_by_size(records: impl IntoIterator<Item = FileRecord>) -> SizeBuckets {
    let mut seen = HashSet::new();
    let mut buckets = SizeBuckets::new();

    for record in records {
        if !seen.insert(record.path.clone()) {
            log::trace!("Dropping repeated path: {}", record.path.display());
            continue;
        }
        buckets.entry(record.size).or_default().push(record);
    }

    buckets
}

/// Check the bucket invariant: every record matches its bucket's size.
///
/// # Errors
///
/// Returns [`FinderError::BucketSizeMismatch`] for the first offending record.
pub fn validate_buckets(buckets: &SizeBuckets) -> Result<(), FinderError> {
    for (&size, records) in buckets {
        if let Some(bad) = records.iter().find(|r| r.size != size) {
            return Err(FinderError::BucketSizeMismatch {
                size,
                path: bad.path.clone(),
                actual: bad.size,
            });
        }
    }
    Ok(())
}

/// Flatten every bucket with two or more members into the candidate list.
///
/// Pure filtering: no I/O. The result is ordered by size (largest first)
/// and then by path so that work is queued deterministically.
#[must_use]
pub fn select_candidates(buckets: &SizeBuckets) -> Vec<FileRecord> {
    let mut eliminated = 0usize;
    let mut candidates: Vec<FileRecord> = Vec::new();

    for (size, records) in buckets {
        if records.len() < 2 {
            eliminated += records.len();
            if let Some(only) = records.first() {
                log::trace!("Eliminated unique size {}: {}", size, only.path.display());
            }
            continue;
        }
        log::debug!(
            "Size group {} bytes: {} potential duplicates",
            size,
            records.len()
        );
        candidates.extend(records.iter().cloned());
    }

    candidates.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));

    log::info!(
        "Candidate selection: {} candidates, {} eliminated by unique size",
        candidates.len(),
        eliminated
    );

    candidates
}
