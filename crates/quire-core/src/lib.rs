//! Quire Core: shared error types and identifier utilities.
//!
//! This crate provides the foundational types used across all Quire crates.
//! It has no internal Quire dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`slug`]: Slug normalization and derivation from file paths

pub mod error;
pub mod slug;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use slug::{slug_from_path, slugify};
