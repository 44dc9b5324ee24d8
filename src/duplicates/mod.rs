//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size buckets and candidate selection (stage 0)
//! - Quick head/tail digest comparison (stage 1)
//! - Full content digest comparison (stage 2)
//! - Report assembly with deterministic ordering
//! - Shared atomic run statistics

pub mod finder;
pub mod groups;
pub mod pool;
pub mod report;
pub mod stats;

pub use finder::{
    default_workers, full_hash_stage, quick_hash_stage, DuplicateFinder, FinderConfig,
    FinderError, FullHashOutput, FullKey, QuickHashOutput, QuickKey, StageConfig,
    FULL_HASH_PHASE, QUICK_HASH_PHASE,
};
pub use groups::{group_by_size, select_candidates, validate_buckets, SizeBuckets};
pub use pool::{run_pool, PoolOutcome};
pub use report::{assemble_report, DuplicateGroup, DuplicateReport};
pub use stats::{Stats, StatsSnapshot};
