//! Metadata header extraction for Quire documents.
//!
//! A document is a text file that starts with a YAML header delimited by
//! `---` lines, followed by free-form body text:
//!
//! ```markdown
//! ---
//! title: Spring Summit
//! date: 2025-04-12
//! tags:
//!   - rust
//!   - community
//! ---
//!
//! The body starts here and is passed through untouched.
//! ```
//!
//! This crate only splits the header from the body and parses the YAML.
//! Checking the header against a schema is the job of `quire-schema`.
//!
//! # Example
//!
//! ```rust
//! use quire_content::extract_header;
//!
//! let header = extract_header("---\ntitle: Hello\n---\nBody").unwrap();
//! assert_eq!(header.get_str("title"), Some("Hello"));
//! assert_eq!(header.body(), "Body");
//! ```

pub mod document;
pub mod header;

pub use document::{Document, ExtractionFailure};
pub use header::{extract_header, strip_header, Header, HeaderError, DELIMITER};
