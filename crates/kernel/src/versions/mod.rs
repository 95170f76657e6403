//! Content version history: snapshots, diffs and rollback.

pub mod diff;
mod service;

pub use diff::{COMPARED_FIELDS, DiffItem, VersionComparison, compare_versions};
pub use service::{RollbackOutcome, VersionService};
