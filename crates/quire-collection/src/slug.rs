//! Entry identity.
//!
//! The loader has no opinion on what identifies an entry. A collection picks
//! a [`SlugDeriver`]; [`SlugSource`] covers the two common cases and can be
//! set from configuration:
//!
//! ```toml
//! [collections.events]
//! slug = { field = "slug" }   # or slug = "file_stem" (the default)
//! ```

use std::fmt;

use quire_core::slug_from_path;
use quire_schema::TypedValue;
use serde::{Deserialize, Serialize};

use crate::entry::CollectionEntry;

/// Derives the lookup key of an entry.
pub trait SlugDeriver: Send + Sync + fmt::Debug {
    /// The entry's slug, or `None` if it has none (it then cannot be looked up).
    fn derive(&self, entry: &CollectionEntry) -> Option<String>;
}

/// Built-in slug derivations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugSource {
    /// Slugified file name without extension.
    #[default]
    FileStem,
    /// Verbatim value of a string field in the record. Integer fields are
    /// rendered as decimal text; any other type gives no slug.
    Field(String),
}

impl SlugDeriver for SlugSource {
    fn derive(&self, entry: &CollectionEntry) -> Option<String> {
        match self {
            SlugSource::FileStem => slug_from_path(entry.path()),
            SlugSource::Field(name) => match entry.get(name)? {
                TypedValue::String(s) => Some(s.clone()),
                TypedValue::Integer(n) => Some(n.to_string()),
                other => {
                    log::debug!(
                        "{:?}: field `{}` holds {:?}, which cannot be a slug",
                        entry.path(),
                        name,
                        other
                    );
                    None
                }
            },
        }
    }
}

impl fmt::Display for SlugSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlugSource::FileStem => f.write_str("file stem"),
            SlugSource::Field(name) => write!(f, "field `{name}`"),
        }
    }
}
