//! Declarative metadata schemas and validation.
//!
//! A [`Schema`] is plain data: a table of named [`Field`]s, each with a
//! [`FieldType`] and a required/optional flag. Schemas are written in code or
//! loaded from configuration, and [`validate`] interprets them generically.
//!
//! Validation never fails with an error. Its result is a closed
//! [`ValidationOutcome`]: either a fully coerced [`Record`] or the complete
//! set of [`FieldErrors`] for the document.
//!
//! # Example
//!
//! ```rust
//! use quire_schema::{validate, Field, Schema, ValidationOutcome};
//!
//! let schema = Schema::new()
//!     .field("title", Field::string())
//!     .field("date", Field::date());
//!
//! let metadata: serde_yaml::Mapping = serde_yaml::from_str("title: B").unwrap();
//! match validate(&schema, &metadata) {
//!     ValidationOutcome::Valid(_) => unreachable!(),
//!     ValidationOutcome::Invalid(errors) => {
//!         assert_eq!(errors.get("date"), Some(&["required field missing".to_string()][..]));
//!     }
//! }
//! ```

pub mod schema;
pub mod validate;
pub mod value;

pub use schema::{Field, FieldType, Schema, UnknownFields};
pub use validate::{validate, FieldErrors, ValidationOutcome};
pub use value::{Record, TypedValue};
