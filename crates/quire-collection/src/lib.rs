//! Typed content collections.
//!
//! Turns a folder of header-plus-body documents into an ordered, validated
//! [`Collection`]:
//!
//! ```text
//! CollectionRegistry ──► DefinedCollection::get_all()
//!                              │
//!                              ▼
//!                     CollectionLoader::load(folder, schema)
//!                              │  list folder (non-recursive, by extension)
//!                              │  read files concurrently (order kept)
//!                              ▼
//!              extract_header ──► validate ──► Collection + Diagnostics
//! ```
//!
//! Documents that cannot be read, whose header is broken, or whose metadata
//! fails the schema are left out of the collection and reported as
//! [`Diagnostic`]s. Only a folder that cannot be listed fails the load.
//!
//! # Example
//!
//! ```rust,no_run
//! use quire_collection::CollectionRegistry;
//! use quire_schema::{Field, Schema};
//!
//! # async fn run() -> quire_core::Result<()> {
//! let mut registry = CollectionRegistry::new("content");
//! let events = registry.define(
//!     "events",
//!     Schema::new()
//!         .field("title", Field::string())
//!         .field("date", Field::date()),
//! )?;
//!
//! for entry in &events.get_all().await? {
//!     println!("{}: {:?}", entry.path().display(), entry.record().get_str("title"));
//! }
//!
//! let meetup = events.get_by_slug("rust-meetup").await?;
//! println!("{}", meetup.body());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod diagnostic;
pub mod entry;
pub mod loader;
pub mod registry;
pub mod slug;

pub use config::{CollectionConfig, QuireConfig};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use entry::{Collection, CollectionEntry};
pub use loader::{CollectionLoader, LoadReport};
pub use registry::{CollectionRegistry, DefinedCollection};
pub use slug::{SlugDeriver, SlugSource};
