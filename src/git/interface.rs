//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in
//! tributary. No other module imports `git2`. It covers exactly the
//! storage-collaborator surface the merge engine needs:
//!
//! - Open or initialize the destination repository
//! - Fetch a source repository into a per-source ref namespace
//! - Enumerate a source's branches and tags and resolve their tips
//! - Flatten a commit's tree into (path, mode, id) entries under a prefix
//! - Build a tree from explicit entries and insert a multi-parent commit
//! - Create or move destination refs
//!
//! # Source ref namespace
//!
//! Each fetched source keeps its refs under a private namespace in the
//! destination repository:
//!
//! ```text
//! refs/sources/<name>/heads/*   branches
//! refs/sources/<name>/tags/*    tags
//! ```
//!
//! Source names are unique within a [`ConfigSet`](crate::core::config::ConfigSet),
//! so namespaces never collide.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants. Any error from this
//! layer is fatal to the whole run: once an object-store or fetch
//! operation fails mid-run, destination consistency cannot be assumed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::config::SubtreeConfig;
use crate::core::types::{Oid, RefKind, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Destination repository could not be opened or created.
    #[error("cannot open or create repository at {path}: {message}")]
    OpenFailed {
        /// The destination path
        path: PathBuf,
        /// The underlying error
        message: String,
    },

    /// Fetching a source repository failed.
    #[error("fetch from '{source_name}' failed: {message}")]
    FetchFailed {
        /// Display name of the source
        source_name: String,
        /// The underlying error
        message: String,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// A tree could not be assembled from the given entries.
    ///
    /// This indicates an internal invariant violation: overlap detection
    /// is supposed to reject any entry set that cannot form a valid tree.
    #[error("cannot build tree: entry '{path}' conflicts with a directory of the same name")]
    UnbuildableTree {
        /// The conflicting entry path
        path: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
        }
    }
}

/// One file-level entry of a (possibly prefixed) flattened tree.
///
/// Blobs, symlinks, and submodule (gitlink) entries appear here with their
/// raw git file mode; subtrees are flattened away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Full path from the merged-tree root.
    pub path: String,
    /// Raw git file mode (e.g. `0o100644`, `0o100755`, `0o120000`, `0o160000`).
    pub mode: i32,
    /// Object id of the blob (or commit, for gitlinks).
    pub id: Oid,
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. One long-lived
/// handle to the destination repository is shared across all ref merges.
pub struct Git {
    /// The underlying git2 repository (the destination).
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git").field("path", &self.repo.path()).finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening
    // =========================================================================

    /// Open the destination repository, creating it if it does not exist.
    pub fn open_or_init(path: &Path) -> Result<Self, GitError> {
        let repo = match git2::Repository::open(path) {
            Ok(repo) => repo,
            Err(_) => git2::Repository::init(path).map_err(|e| GitError::OpenFailed {
                path: path.to_path_buf(),
                message: e.message().to_string(),
            })?,
        };

        Ok(Self { repo })
    }

    /// Path to the repository's working directory (or `.git` dir if bare).
    pub fn work_dir(&self) -> &Path {
        self.repo.workdir().unwrap_or_else(|| self.repo.path())
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch a source's branches and tags into its private ref namespace.
    ///
    /// Branches land under `refs/sources/<name>/heads/`, tags under
    /// `refs/sources/<name>/tags/`. Tag auto-following is disabled so no
    /// refs leak into the destination's own `refs/tags/` namespace.
    pub fn fetch_source(&self, config: &SubtreeConfig) -> Result<(), GitError> {
        let mut remote =
            self.repo
                .remote_anonymous(config.url())
                .map_err(|e| GitError::FetchFailed {
                    source_name: config.name().to_string(),
                    message: e.message().to_string(),
                })?;

        let refspecs = [
            format!("+refs/heads/*:{}*", source_ref_prefix(config, RefKind::Branch)),
            format!("+refs/tags/*:{}*", source_ref_prefix(config, RefKind::Tag)),
        ];
        let refspecs: Vec<&str> = refspecs.iter().map(String::as_str).collect();

        let mut opts = git2::FetchOptions::new();
        opts.download_tags(git2::AutotagOption::None);

        remote
            .fetch(&refspecs, Some(&mut opts), None)
            .map_err(|e| GitError::FetchFailed {
                source_name: config.name().to_string(),
                message: e.message().to_string(),
            })
    }

    // =========================================================================
    // Source Ref Enumeration and Resolution
    // =========================================================================

    /// List the short ref names of one kind that a fetched source has.
    ///
    /// Names are returned in the repository's iteration order, which is
    /// sorted and therefore stable across runs.
    pub fn source_ref_names(
        &self,
        config: &SubtreeConfig,
        kind: RefKind,
    ) -> Result<Vec<String>, GitError> {
        let prefix = source_ref_prefix(config, kind);
        let pattern = format!("{}*", prefix);

        let refs = self
            .repo
            .references_glob(&pattern)
            .map_err(|e| GitError::from_git2(e, &pattern))?;

        let mut names = Vec::new();
        for reference in refs {
            let reference = reference.map_err(|e| GitError::from_git2(e, &pattern))?;
            // Skip refs with non-UTF8 names
            if let Some(name) = reference.name() {
                if let Some(short) = name.strip_prefix(&prefix) {
                    names.push(short.to_string());
                }
            }
        }

        Ok(names)
    }

    /// Resolve a source's tip commit for a ref, if the source has it.
    ///
    /// Annotated tags are peeled to commits. A tag that does not peel to a
    /// commit (e.g. a tag of a tree) cannot contribute a tip and counts as
    /// absent.
    pub fn source_tip(
        &self,
        config: &SubtreeConfig,
        kind: RefKind,
        name: &str,
    ) -> Result<Option<Oid>, GitError> {
        let refname = format!("{}{}", source_ref_prefix(config, kind), name);

        let reference = match self.repo.find_reference(&refname) {
            Ok(r) => r,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, &refname)),
        };

        match reference.peel_to_commit() {
            Ok(commit) => Ok(Some(Oid::new(commit.id().to_string())?)),
            Err(_) => Ok(None),
        }
    }

    // =========================================================================
    // Tree Reading
    // =========================================================================

    /// Flatten a commit's tree into file-level entries, sorted by path.
    ///
    /// If `prefix` is not `"."`, every path is placed under it. Submodule
    /// entries are carried through as gitlinks rather than descended into.
    pub fn tree_entries(&self, commit: &Oid, prefix: &str) -> Result<Vec<TreeEntry>, GitError> {
        let commit = self.find_commit(commit)?;
        let tree = commit
            .tree()
            .map_err(|e| GitError::from_git2(e, &commit.id().to_string()))?;

        let base = if prefix == "." { "" } else { prefix };
        let mut entries = Vec::new();
        self.collect_entries(&tree, base, &mut entries)?;
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn collect_entries(
        &self,
        tree: &git2::Tree<'_>,
        base: &str,
        out: &mut Vec<TreeEntry>,
    ) -> Result<(), GitError> {
        for entry in tree.iter() {
            let name = match entry.name() {
                Some(n) => n,
                None => {
                    return Err(GitError::Internal {
                        message: format!("non-UTF8 entry name in tree {}", tree.id()),
                    })
                }
            };
            let path = if base.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", base, name)
            };

            if entry.kind() == Some(git2::ObjectType::Tree) {
                let subtree = self
                    .repo
                    .find_tree(entry.id())
                    .map_err(|e| GitError::from_git2(e, &entry.id().to_string()))?;
                self.collect_entries(&subtree, &path, out)?;
            } else {
                out.push(TreeEntry {
                    path,
                    mode: entry.filemode(),
                    id: Oid::new(entry.id().to_string())?,
                });
            }
        }
        Ok(())
    }

    /// Read a commit's committer timestamp as (seconds, minutes-from-UTC).
    pub fn committer_time(&self, commit: &Oid) -> Result<(i64, i32), GitError> {
        let commit = self.find_commit(commit)?;
        let when = commit.committer().when();
        Ok((when.seconds(), when.offset_minutes()))
    }

    // =========================================================================
    // Object Writing
    // =========================================================================

    /// Build and insert a tree from flat file-level entries.
    ///
    /// Entries are assembled into nested tree objects; writes are
    /// content-addressed, so identical input always yields the same id.
    pub fn write_tree(&self, entries: &[TreeEntry]) -> Result<Oid, GitError> {
        let mut root = DirNode::default();
        for entry in entries {
            root.insert(&entry.path, entry)?;
        }

        let id = self.write_dir(&root)?;
        Ok(Oid::new(id.to_string())?)
    }

    fn write_dir(&self, dir: &DirNode) -> Result<git2::Oid, GitError> {
        let mut builder = self
            .repo
            .treebuilder(None)
            .map_err(|e| GitError::from_git2(e, "treebuilder"))?;

        for (name, node) in &dir.children {
            match node {
                Node::Leaf { mode, id } => {
                    let oid = parse_oid(id)?;
                    builder
                        .insert(name, oid, *mode)
                        .map_err(|e| GitError::from_git2(e, name))?;
                }
                Node::Dir(sub) => {
                    let sub_id = self.write_dir(sub)?;
                    builder
                        .insert(name, sub_id, 0o040000)
                        .map_err(|e| GitError::from_git2(e, name))?;
                }
            }
        }

        builder
            .write()
            .map_err(|e| GitError::from_git2(e, "tree write"))
    }

    /// Insert a new multi-parent commit and return its id.
    ///
    /// Author and committer are the destination's operator identity stamped
    /// with the given time. No ref is created or moved.
    pub fn write_merge_commit(
        &self,
        tree: &Oid,
        parents: &[Oid],
        message: &str,
        when_secs: i64,
        when_offset: i32,
    ) -> Result<Oid, GitError> {
        let tree_id = parse_oid(tree)?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::from_git2(e, tree.as_str()))?;

        let mut parent_commits = Vec::with_capacity(parents.len());
        for parent in parents {
            parent_commits.push(self.find_commit(parent)?);
        }
        let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();

        let (name, email) = self.operator_identity();
        let when = git2::Time::new(when_secs, when_offset);
        let signature = git2::Signature::new(&name, &email, &when)
            .map_err(|e| GitError::from_git2(e, "signature"))?;

        let id = self
            .repo
            .commit(None, &signature, &signature, message, &tree, &parent_refs)
            .map_err(|e| GitError::from_git2(e, "commit"))?;

        Ok(Oid::new(id.to_string())?)
    }

    /// The destination's configured operator identity as (name, email).
    ///
    /// Falls back to a fixed `tributary` identity when the destination has
    /// no `user.name`/`user.email` configured.
    pub fn operator_identity(&self) -> (String, String) {
        match self.repo.signature() {
            Ok(sig) => (
                sig.name().unwrap_or("tributary").to_string(),
                sig.email().unwrap_or("tributary@localhost").to_string(),
            ),
            Err(_) => ("tributary".to_string(), "tributary@localhost".to_string()),
        }
    }

    // =========================================================================
    // Destination Ref Updates
    // =========================================================================

    /// Create or move a destination branch or tag ref to a commit.
    ///
    /// The target object is already durably written by the time this is
    /// called, so a ref never points at partially-merged state.
    pub fn set_ref(
        &self,
        kind: RefKind,
        name: &str,
        target: &Oid,
        log_message: &str,
    ) -> Result<(), GitError> {
        let refname = kind.destination_ref(name);
        let oid = parse_oid(target)?;

        self.repo
            .reference(&refname, oid, true, log_message)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        Ok(())
    }

    /// Check out the first of the given branches that exists, if any.
    ///
    /// Used after a merge run to leave the destination's work tree
    /// populated. Returns the branch that was checked out.
    pub fn checkout_branch(&self, candidates: &[&str]) -> Result<Option<String>, GitError> {
        for name in candidates {
            let refname = RefKind::Branch.destination_ref(name);
            if self.repo.find_reference(&refname).is_err() {
                continue;
            }

            self.repo
                .set_head(&refname)
                .map_err(|e| GitError::from_git2(e, &refname))?;

            let mut opts = git2::build::CheckoutBuilder::new();
            opts.force();
            self.repo
                .checkout_head(Some(&mut opts))
                .map_err(|e| GitError::from_git2(e, &refname))?;

            return Ok(Some(name.to_string()));
        }

        Ok(None)
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn find_commit(&self, oid: &Oid) -> Result<git2::Commit<'_>, GitError> {
        let id = parse_oid(oid)?;
        self.repo
            .find_commit(id)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }
}

/// Ref namespace prefix for one source and kind, with trailing slash.
fn source_ref_prefix(config: &SubtreeConfig, kind: RefKind) -> String {
    format!("refs/sources/{}/{}/", config.name(), kind.namespace())
}

fn parse_oid(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|_| GitError::InvalidOid {
        oid: oid.as_str().to_string(),
    })
}

/// In-memory directory node used while assembling nested trees.
#[derive(Default)]
struct DirNode {
    children: BTreeMap<String, Node>,
}

enum Node {
    Leaf { mode: i32, id: Oid },
    Dir(DirNode),
}

impl DirNode {
    fn insert(&mut self, path: &str, entry: &TreeEntry) -> Result<(), GitError> {
        match path.split_once('/') {
            None => {
                // Overlap detection runs before tree building, so a leaf
                // already present here is an internal invariant violation.
                if self.children.contains_key(path) {
                    return Err(GitError::UnbuildableTree {
                        path: entry.path.clone(),
                    });
                }
                self.children.insert(
                    path.to_string(),
                    Node::Leaf {
                        mode: entry.mode,
                        id: entry.id.clone(),
                    },
                );
                Ok(())
            }
            Some((head, rest)) => {
                let node = self
                    .children
                    .entry(head.to_string())
                    .or_insert_with(|| Node::Dir(DirNode::default()));
                match node {
                    Node::Dir(dir) => dir.insert(rest, entry),
                    Node::Leaf { .. } => Err(GitError::UnbuildableTree {
                        path: entry.path.clone(),
                    }),
                }
            }
        }
    }
}
