//! merge::commit
//!
//! Merge-commit synthesis: wrap a merged tree into a new multi-parent
//! commit with derived authorship.
//!
//! # Derivation rules
//!
//! - Parent list: the contributing tip ids, in config iteration order.
//! - Timestamp and timezone: taken from the contributing commit with the
//!   strictly latest committer time; on a tie, the earliest config in
//!   order wins.
//! - Identity: always the destination repository's operator identity,
//!   never a source author's. Only the *when* is inherited.
//!
//! On overlap the synthesis writes nothing and returns the overlap list as
//! a distinct variant, so the orchestrator can skip the ref update while
//! still recording a result.

use crate::core::config::SubtreeConfig;
use crate::core::types::Oid;
use crate::git::{Git, GitError};
use crate::merge::tree::{self, TreeMergeOutcome};
use crate::merge::OverlapEntry;

/// Result of a synthesis attempt: a written commit or the collisions that
/// prevented one.
#[derive(Debug)]
pub enum SynthesisOutcome {
    /// The merge commit was written (no ref has been moved yet).
    Merged {
        /// Id of the new commit.
        commit: Oid,
        /// The inherited committer time, seconds since epoch.
        when_secs: i64,
    },
    /// Sources collided; no object was written.
    Overlapping(Vec<OverlapEntry>),
}

/// Synthesize one merge commit from the given (config, tip) pairs.
///
/// `tips` must be non-empty and in config iteration order; its order
/// becomes the parent order of the new commit.
pub fn create_merge_commit(
    git: &Git,
    tips: &[(&SubtreeConfig, Oid)],
    message: &str,
) -> Result<SynthesisOutcome, GitError> {
    if tips.is_empty() {
        return Err(GitError::Internal {
            message: "merge commit requested with no contributing commits".to_string(),
        });
    }

    let mut sources = Vec::with_capacity(tips.len());
    for (config, tip) in tips {
        sources.push(git.tree_entries(tip, config.directory())?);
    }

    let entries = match tree::merge_entries(&sources) {
        TreeMergeOutcome::Merged(entries) => entries,
        TreeMergeOutcome::Overlapping(overlaps) => {
            let named = overlaps
                .into_iter()
                .map(|o| OverlapEntry {
                    source_a: tips[o.source_a].0.name().to_string(),
                    path_a: o.path_a,
                    source_b: tips[o.source_b].0.name().to_string(),
                    path_b: o.path_b,
                })
                .collect();
            return Ok(SynthesisOutcome::Overlapping(named));
        }
    };

    let tree = git.write_tree(&entries)?;
    let (when_secs, when_offset) = latest_committer_time(git, tips)?;

    let parents: Vec<Oid> = tips.iter().map(|(_, tip)| tip.clone()).collect();
    let commit = git.write_merge_commit(&tree, &parents, message, when_secs, when_offset)?;

    Ok(SynthesisOutcome::Merged { commit, when_secs })
}

/// Pick the latest committer time among the contributing commits.
///
/// Strict comparison: a later commit replaces the candidate only when its
/// time is greater, so ties resolve to the earliest config in order.
fn latest_committer_time(
    git: &Git,
    tips: &[(&SubtreeConfig, Oid)],
) -> Result<(i64, i32), GitError> {
    let mut latest: Option<(i64, i32)> = None;
    for (_, tip) in tips {
        let (secs, offset) = git.committer_time(tip)?;
        if latest.map_or(true, |(latest_secs, _)| secs > latest_secs) {
            latest = Some((secs, offset));
        }
    }
    latest.ok_or_else(|| GitError::Internal {
        message: "no committer time available".to_string(),
    })
}
