//! merge::orchestrator
//!
//! Drives ref-by-ref processing: fetches all sources, collects per-ref
//! tips, invokes synthesis, updates destination refs, and records
//! completeness.
//!
//! # Per-ref lifecycle
//!
//! ```text
//! Discovered -> TipsCollected -> TreeMerged -> RefUpdated      (success)
//!                             \-> OverlapDetected -> MergeSkipped (failure)
//! ```
//!
//! Both terminal states produce a [`MergedRef`] record. A ref whose merge
//! fails on overlaps is never created or moved; remaining refs continue
//! processing. Storage and fetch errors abort the whole run.

use std::path::Path;

use chrono::DateTime;

use crate::core::config::{ConfigSet, SubtreeConfig};
use crate::core::types::{Oid, RefKind};
use crate::git::{Git, GitError};
use crate::merge::catalog::RefCatalog;
use crate::merge::commit::{self, SynthesisOutcome};
use crate::merge::{merge_message, MergedRef};

/// Branches considered for the final work-tree checkout, in order.
const PRIMARY_BRANCHES: [&str; 2] = ["main", "master"];

/// Merges N source repositories into one destination repository.
pub struct RepoMerger {
    git: Git,
    configs: ConfigSet,
}

impl RepoMerger {
    /// Open (or create) the destination repository at `output`.
    pub fn new(output: &Path, configs: ConfigSet) -> Result<Self, GitError> {
        let git = Git::open_or_init(output)?;
        Ok(Self { git, configs })
    }

    /// Access the destination repository handle.
    pub fn git(&self) -> &Git {
        &self.git
    }

    /// Fetch every source, then merge every shared ref.
    ///
    /// Branches are processed before tags. Returns one [`MergedRef`] per
    /// processed ref, in processing order.
    pub fn run(&self) -> Result<Vec<MergedRef>, GitError> {
        for config in &self.configs {
            self.git.fetch_source(config)?;
        }

        let catalog = RefCatalog::enumerate(&self.git, &self.configs)?;

        let mut results = Vec::new();
        for (kind, name) in catalog.refs() {
            if let Some(merged) = self.merge_ref(kind, name)? {
                results.push(merged);
            }
        }

        // Leave a populated work tree behind if a primary branch was
        // merged. Best effort only: every ref is already updated, and a
        // destination without a usable work tree (a bare repository, an
        // obstructed file) still holds a fully merged ref set.
        let _ = self.git.checkout_branch(&PRIMARY_BRANCHES);

        Ok(results)
    }

    /// Merge a single ref across all sources that have it.
    ///
    /// Returns `None` only for the defensive case of a cataloged ref no
    /// source actually has (it should not have appeared at all).
    fn merge_ref(&self, kind: RefKind, name: &str) -> Result<Option<MergedRef>, GitError> {
        let mut tips: Vec<(&SubtreeConfig, Oid)> = Vec::new();
        let mut missing: Vec<String> = Vec::new();

        for config in &self.configs {
            match RefCatalog::tip(&self.git, config, kind, name)? {
                Some(tip) => tips.push((config, tip)),
                None => missing.push(config.name().to_string()),
            }
        }

        if tips.is_empty() {
            return Ok(None);
        }

        let message = merge_message(kind, name);

        let merged = match commit::create_merge_commit(&self.git, &tips, &message)? {
            SynthesisOutcome::Merged { commit, when_secs } => {
                let log_message = format!("tributary: merge {} '{}'", kind, name);
                self.git.set_ref(kind, name, &commit, &log_message)?;

                MergedRef {
                    kind,
                    name: name.to_string(),
                    commit: Some(commit),
                    missing,
                    message,
                    overlaps: Vec::new(),
                    commit_time: DateTime::from_timestamp(when_secs, 0),
                }
            }
            SynthesisOutcome::Overlapping(overlaps) => MergedRef {
                kind,
                name: name.to_string(),
                commit: None,
                missing,
                message,
                overlaps,
                commit_time: None,
            },
        };

        Ok(Some(merged))
    }
}
