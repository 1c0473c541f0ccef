//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and
//! writes flow through this interface. No other module should import
//! `git2`.
//!
//! # Responsibilities
//!
//! - Destination repository creation and opening
//! - Fetching sources into per-source ref namespaces
//! - Source ref enumeration and tip resolution
//! - Tree flattening (read) and tree assembly (write)
//! - Multi-parent commit insertion
//! - Destination ref creation and movement
//!
//! # Invariants
//!
//! - No other module calls git2 directly
//! - All operations return strong types (Oid, RefKind, TreeEntry)
//! - Object writes are content-addressed and idempotent; a ref is only
//!   ever pointed at an object that has already been written

mod interface;

pub use interface::{Git, GitError, TreeEntry};
