//! Tributary - fuse multiple Git repositories into one, preserving every history
//!
//! Tributary merges N independently-versioned source repositories into a
//! single destination repository. Each source's full commit history is
//! preserved untouched; its content is relocated under a configured
//! subdirectory (or the root). For every branch or tag name shared across
//! sources, tributary synthesizes one new merge commit whose parents are
//! the sources' tips for that ref and whose tree combines their
//! path-remapped trees.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, drives the merge)
//! - [`merge`] - Ref catalog, tree merge, commit synthesis, orchestration
//! - [`core`] - Domain types and source configuration
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Output utilities
//!
//! # Correctness Invariants
//!
//! 1. Source commits are never altered or re-parented; only new top-level
//!    merge commits are added
//! 2. Identical output paths from different sources are a hard conflict,
//!    never auto-merged; every colliding pair is reported
//! 3. A destination ref is only ever pointed at an object that has already
//!    been durably written
//! 4. Object writes are content-addressed, so re-running over identical
//!    input yields identical ids

pub mod cli;
pub mod core;
pub mod git;
pub mod merge;
pub mod ui;
