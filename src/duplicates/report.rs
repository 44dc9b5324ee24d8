//! Confirmed duplicate groups and the final report.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::scanner::{hash_to_hex, FileRecord};

use super::finder::FullKey;
use super::{Stats, StatsSnapshot};

/// A set of two or more files confirmed to share identical content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Sequential id, 1-based, in report order
    pub id: usize,
    /// Number of files (always `files.len()`, at least 2)
    pub count: usize,
    /// Size of each file in bytes
    pub size: u64,
    /// Bytes reclaimable by keeping one copy: `size * (count - 1)`
    pub wasted_space: u64,
    /// Full content digest as lowercase hex
    pub hash: String,
    /// Member paths, sorted (serialized lossily)
    #[serde(serialize_with = "serialize_paths_lossy")]
    pub files: Vec<PathBuf>,
}

fn serialize_paths_lossy<S: Serializer>(paths: &[PathBuf], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(paths.iter().map(|p| p.to_string_lossy()))
}

impl DuplicateGroup {
    /// Number of redundant copies (all but one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.count.saturating_sub(1)
    }

    /// Total bytes occupied by all copies.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.count as u64
    }
}

/// Result of one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// When the report was assembled
    pub scan_date: DateTime<Utc>,
    /// Counters at the end of the run
    pub stats: StatsSnapshot,
    /// Sum of `wasted_space` over all groups
    pub total_wasted_space: u64,
    /// Confirmed groups, largest waste first
    pub groups: Vec<DuplicateGroup>,
    /// The run stopped early on a shutdown request; `groups` is empty
    #[serde(default)]
    pub interrupted: bool,
}

impl DuplicateReport {
    /// A report with no groups, carrying the statistics gathered so far.
    #[must_use]
    pub fn empty(stats: &Stats) -> Self {
        Self {
            scan_date: Utc::now(),
            stats: stats.snapshot(),
            total_wasted_space: 0,
            groups: Vec::new(),
            interrupted: false,
        }
    }

    /// An empty report flagged as interrupted.
    #[must_use]
    pub fn interrupted(stats: &Stats) -> Self {
        Self {
            interrupted: true,
            ..Self::empty(stats)
        }
    }

    /// Whether any duplicates were confirmed.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Total number of files across all groups.
    #[must_use]
    pub fn duplicate_file_count(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }
}

/// Turn full-hash groups into the final report.
///
/// Groups with fewer than two members are dropped. Files are sorted by
/// path, groups by descending wasted space and then first path, and ids
/// are assigned in that order. Duplicate counters in `stats` are bumped
/// once per emitted group.
#[must_use]
pub fn assemble_report(groups: HashMap<FullKey, Vec<FileRecord>>, stats: &Stats) -> DuplicateReport {
    let mut assembled: Vec<DuplicateGroup> = groups
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(key, files)| {
            let mut paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
            paths.sort();
            let count = paths.len();
            DuplicateGroup {
                id: 0,
                count,
                size: key.size,
                wasted_space: key.size * (count as u64 - 1),
                hash: hash_to_hex(&key.digest),
                files: paths,
            }
        })
        .collect();

    assembled.sort_by(|a, b| {
        b.wasted_space
            .cmp(&a.wasted_space)
            .then_with(|| a.files.first().cmp(&b.files.first()))
    });

    let mut total_wasted_space = 0u64;
    for (index, group) in assembled.iter_mut().enumerate() {
        group.id = index + 1;
        total_wasted_space += group.wasted_space;
        stats.inc_duplicate_groups();
        stats.add_duplicate_files(group.count as u64);
        log::debug!(
            "Duplicate group {} ({}): {} files, {} bytes each",
            group.id,
            group.hash,
            group.count,
            group.size
        );
    }

    DuplicateReport {
        scan_date: Utc::now(),
        stats: stats.snapshot(),
        total_wasted_space,
        groups: assembled,
        interrupted: false,
    }
}
