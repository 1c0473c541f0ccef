//! merge
//!
//! The repository-fusion engine: ref reconciliation, subtree tree merging,
//! and merge-commit synthesis.
//!
//! # Modules
//!
//! - [`catalog`] - Union of ref names across sources, per-source tips
//! - [`tree`] - Pure N-way tree merge with exhaustive overlap detection
//! - [`commit`] - Multi-parent commit synthesis with derived authorship
//! - [`orchestrator`] - Ref-by-ref driver producing [`MergedRef`] records
//!
//! # Design
//!
//! The merge and catalog components have no output side effects. Results
//! flow upward as structured values ([`MergedRef`], [`OverlapEntry`]); the
//! CLI layer decides what to print.

pub mod catalog;
pub mod commit;
pub mod orchestrator;
pub mod tree;

pub use orchestrator::RepoMerger;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::types::{Oid, RefKind};

/// Two sources colliding at an output path during a tree merge.
///
/// For exact-path collisions both paths are equal; for file-vs-directory
/// collisions `path_b` lies under `path_a`.
#[derive(Debug, Clone, Serialize)]
pub struct OverlapEntry {
    /// Display name of the first colliding source.
    pub source_a: String,
    /// Colliding path contributed by the first source.
    pub path_a: String,
    /// Display name of the second colliding source.
    pub source_b: String,
    /// Colliding path contributed by the second source.
    pub path_b: String,
}

impl std::fmt::Display for OverlapEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path_a == self.path_b {
            write!(
                f,
                "trees overlap at '{}' (from {} and {})",
                self.path_a, self.source_a, self.source_b
            )
        } else {
            write!(
                f,
                "trees overlap: '{}' (from {}) collides with '{}' (from {})",
                self.path_a, self.source_a, self.path_b, self.source_b
            )
        }
    }
}

/// The outcome record for one ref, created once at the end of that ref's
/// processing and never mutated.
///
/// A record is emitted for every processed ref, including refs whose merge
/// failed on overlaps; those carry `commit: None` and the overlap list.
#[derive(Debug, Clone, Serialize)]
pub struct MergedRef {
    /// Kind of the ref (branch or tag).
    pub kind: RefKind,
    /// Short ref name (e.g. `main`, `v1.0`).
    pub name: String,
    /// Id of the synthesized commit; `None` if the merge failed.
    pub commit: Option<Oid>,
    /// Display names of sources lacking this ref, in config order.
    pub missing: Vec<String>,
    /// The commit message used (or that would have been used).
    pub message: String,
    /// Every colliding pair found; empty on success.
    pub overlaps: Vec<OverlapEntry>,
    /// The inherited committer timestamp; `None` if the merge failed.
    pub commit_time: Option<DateTime<Utc>>,
}

impl MergedRef {
    /// Whether every source contributed to this ref.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Whether a commit was synthesized and the destination ref updated.
    pub fn is_merged(&self) -> bool {
        self.commit.is_some()
    }
}

/// The commit message for a merged ref.
pub fn merge_message(kind: RefKind, name: &str) -> String {
    format!("Merge {} '{}' from multiple repositories", kind, name)
}
