//! merge::catalog
//!
//! Enumerates the union of ref names across all fetched sources and
//! resolves per-source tips.
//!
//! # Ordering
//!
//! Names are deduped per kind and kept in first-seen order across configs
//! in their input order, so runs over the same inputs always process refs
//! in the same sequence. Branches are listed before tags.

use crate::core::config::{ConfigSet, SubtreeConfig};
use crate::core::types::{Oid, RefKind};
use crate::git::{Git, GitError};

/// The union of branch and tag names across all sources.
#[derive(Debug)]
pub struct RefCatalog {
    branches: Vec<String>,
    tags: Vec<String>,
}

impl RefCatalog {
    /// Enumerate every branch and tag name any source has.
    pub fn enumerate(git: &Git, configs: &ConfigSet) -> Result<Self, GitError> {
        Ok(Self {
            branches: union_of(git, configs, RefKind::Branch)?,
            tags: union_of(git, configs, RefKind::Tag)?,
        })
    }

    /// Branch names, first-seen order.
    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    /// Tag names, first-seen order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// All refs in processing order: every branch, then every tag.
    pub fn refs(&self) -> impl Iterator<Item = (RefKind, &str)> {
        self.branches
            .iter()
            .map(|name| (RefKind::Branch, name.as_str()))
            .chain(self.tags.iter().map(|name| (RefKind::Tag, name.as_str())))
    }

    /// Resolve one source's tip commit for a ref, or `None` if the source
    /// lacks it.
    pub fn tip(
        git: &Git,
        config: &SubtreeConfig,
        kind: RefKind,
        name: &str,
    ) -> Result<Option<Oid>, GitError> {
        git.source_tip(config, kind, name)
    }
}

fn union_of(git: &Git, configs: &ConfigSet, kind: RefKind) -> Result<Vec<String>, GitError> {
    let mut names: Vec<String> = Vec::new();
    for config in configs {
        for name in git.source_ref_names(config, kind)? {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    Ok(names)
}
