//! core
//!
//! Core domain types for tributary.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, RefKind
//! - [`config`] - Source configuration: SubtreeConfig, ConfigSet
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Configuration is parsed once at startup and immutable afterwards

pub mod config;
pub mod types;
