//! Per-file diagnostics.
//!
//! A diagnostic explains why a document was left out of its collection (or,
//! for duplicate slugs, why it cannot be looked up). Diagnostics are returned
//! as data in a [`LoadReport`](crate::LoadReport) and also logged at `warn`.
//!
//! The rendered form groups everything by file:
//!
//! ```text
//! Errors in content/events/b.md
//!   field `date`
//!     - required field missing
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use quire_content::HeaderError;
use quire_schema::FieldErrors;

/// Why one file was reported.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// The file was listed but could not be read.
    Unreadable(String),
    /// The metadata block is missing, unterminated or malformed.
    Extraction(HeaderError),
    /// The metadata does not conform to the schema.
    Validation(FieldErrors),
    /// The entry validated but shares its slug with an earlier entry.
    DuplicateSlug {
        /// The shared slug.
        slug: String,
        /// The first entry that claimed it.
        first: PathBuf,
    },
}

/// A report about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file concerned.
    pub path: PathBuf,
    /// What went wrong.
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Create a diagnostic for `path`.
    pub fn new(path: impl Into<PathBuf>, kind: DiagnosticKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// The file concerned.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` for header extraction failures.
    pub fn is_extraction(&self) -> bool {
        matches!(self.kind, DiagnosticKind::Extraction(_))
    }

    /// `true` for schema validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, DiagnosticKind::Validation(_))
    }

    /// `true` when the file was left out of the collection.
    pub fn excludes_entry(&self) -> bool {
        !matches!(self.kind, DiagnosticKind::DuplicateSlug { .. })
    }

    /// Field errors, for validation failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match &self.kind {
            DiagnosticKind::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Emit this diagnostic through the `log` facade.
    pub fn log(&self) {
        log::warn!("{self}");
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::DuplicateSlug { slug, first } => write!(
                f,
                "Duplicate slug in {}\n  slug `{slug}` already used by {}",
                self.path.display(),
                first.display()
            ),
            DiagnosticKind::Unreadable(reason) => {
                write!(f, "Errors in {}\n  unreadable: {reason}", self.path.display())
            }
            DiagnosticKind::Extraction(error) => {
                write!(f, "Errors in {}\n  {error}", self.path.display())
            }
            DiagnosticKind::Validation(errors) => {
                write!(f, "Errors in {}", self.path.display())?;
                for (path, messages) in errors.iter() {
                    write!(f, "\n  field `{path}`")?;
                    for message in messages {
                        write!(f, "\n    - {message}")?;
                    }
                }
                Ok(())
            }
        }
    }
}
