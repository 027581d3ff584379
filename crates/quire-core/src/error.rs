//! Error types for Quire.
//!
//! Only conditions that abort a whole operation live here. A document whose
//! header is malformed or whose metadata does not match its schema is not an
//! error at this level: it is reported as a diagnostic and the load carries on.

use std::path::{Path, PathBuf};

/// Result type alias for Quire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Quire.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The collection folder does not exist or cannot be listed.
    #[error("Cannot read collection folder {}: {source}", path.display())]
    FolderUnreadable {
        /// Folder that could not be listed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error tied to a specific path (config files, etc.)
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No entry in the collection has the requested slug.
    #[error("No entry with slug '{slug}' in collection '{collection}'")]
    NotFound {
        /// Collection that was searched
        collection: String,
        /// Slug that was requested
        slug: String,
    },

    /// More than one entry in the collection derives the requested slug.
    #[error("Slug '{slug}' is ambiguous in collection '{collection}' ({} entries)", paths.len())]
    DuplicateSlug {
        /// Collection that was searched
        collection: String,
        /// Slug shared by several entries
        slug: String,
        /// Source files of the conflicting entries, in enumeration order
        paths: Vec<PathBuf>,
    },

    /// The registry has no collection with this name.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The schema definition itself is inconsistent.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Parse error outside of per-document extraction
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Creates a folder error for a collection directory that cannot be listed.
    pub fn folder_unreadable(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::FolderUnreadable {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates an I/O error carrying the path that was being accessed.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a not-found error for a slug lookup.
    pub fn not_found(collection: impl Into<String>, slug: impl Into<String>) -> Self {
        Error::NotFound {
            collection: collection.into(),
            slug: slug.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Creates a schema definition error.
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Error::Schema(message.into())
    }

    /// Creates a parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Error::Parse(message.into())
    }

    /// Returns `true` if this error is a query-time miss rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns `true` if this error aborted a load because the folder itself was unusable.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::FolderUnreadable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("event", "missing-slug");
        assert_eq!(
            err.to_string(),
            "No entry with slug 'missing-slug' in collection 'event'"
        );
        assert!(err.is_not_found());
        assert!(!err.is_structural());
    }

    #[test]
    fn test_folder_unreadable_is_structural() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::folder_unreadable(io, "/content/events");
        assert!(err.is_structural());
        assert!(err.to_string().contains("/content/events"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_duplicate_slug_display() {
        let err = Error::DuplicateSlug {
            collection: "event".to_string(),
            slug: "meetup".to_string(),
            paths: vec![PathBuf::from("a.md"), PathBuf::from("b.md")],
        };
        assert_eq!(
            err.to_string(),
            "Slug 'meetup' is ambiguous in collection 'event' (2 entries)"
        );
    }

    #[test]
    fn test_helper_constructors() {
        assert_eq!(
            Error::config("bad extension").to_string(),
            "Configuration error: bad extension"
        );
        assert_eq!(
            Error::schema("enum has no values").to_string(),
            "Schema error: enum has no values"
        );
        assert_eq!(Error::parse("oops").to_string(), "Parse error: oops");
        assert_eq!(
            Error::UnknownCollection("post".into()).to_string(),
            "Unknown collection: post"
        );
    }
}
