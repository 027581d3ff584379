//! Folder loading: list, read, extract, validate, aggregate.
//!
//! [`CollectionLoader::load`] reads, extracts and validates the matching
//! files of a folder with bounded concurrency, keeping listing order.
//! Invalid documents become [`Diagnostic`]s; the load itself fails only when
//! the folder cannot be listed.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use quire_content::Document;
use quire_core::{Error, Result};
use quire_schema::{validate, Schema, ValidationOutcome};

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::entry::{Collection, CollectionEntry};

/// Extension recognized when none is configured.
pub const DEFAULT_EXTENSION: &str = "md";

/// Upper bound on files read at the same time.
pub const DEFAULT_CONCURRENCY: usize = 64;

/// The outcome of loading one folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Entries that validated, in listing order.
    pub collection: Collection,
    /// One diagnostic per reported file, in listing order.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of matching files found in the folder.
    pub files_seen: usize,
}

impl LoadReport {
    /// `true` when nothing was reported.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of files left out of the collection.
    pub fn excluded(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.excludes_entry()).count()
    }

    /// Diagnostic for a given file, if any.
    pub fn diagnostic_for(&self, path: &Path) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.path() == path)
    }
}

/// Loads one folder of documents against a schema.
#[derive(Debug, Clone)]
pub struct CollectionLoader {
    extension: String,
    concurrency: usize,
}

impl Default for CollectionLoader {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl CollectionLoader {
    /// Loader for files with `extension` (case-insensitive, leading dot optional).
    pub fn new(extension: impl AsRef<str>) -> Self {
        Self {
            extension: extension
                .as_ref()
                .trim_start_matches('.')
                .to_ascii_lowercase(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Bound the number of concurrent file reads (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The recognized extension, lowercase, without a dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The read fan-out bound.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Whether `path` has the recognized extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }

    /// List matching files in `folder`, in directory listing order.
    ///
    /// Not recursive. Subdirectories and other extensions are skipped
    /// silently; symlinks are followed. A matching entry that cannot be
    /// stat'ed (a dangling symlink, say) is still listed so that reading it
    /// reports the problem.
    ///
    /// # Errors
    ///
    /// [`Error::FolderUnreadable`] if the folder is missing or cannot be listed.
    pub async fn list(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        let mut dir = tokio::fs::read_dir(folder)
            .await
            .map_err(|e| Error::folder_unreadable(e, folder))?;

        let mut files = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| Error::folder_unreadable(e, folder))?
        {
            let path = entry.path();
            if !self.matches(&path) {
                continue;
            }

            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => files.push(path),
                Ok(_) => log::trace!("Skipping non-file {:?}", path),
                Err(e) => {
                    log::trace!("Cannot stat {:?} ({}); listing it anyway", path, e);
                    files.push(path);
                }
            }
        }

        Ok(files)
    }

    /// Load `folder` against `schema`.
    ///
    /// 1. Lists matching files
    /// 2. Reads, extracts and validates them concurrently, at most
    ///    [`concurrency`](Self::concurrency) at once
    /// 3. Collects the outcomes in listing order
    /// 4. Logs a grouped diagnostic for every file left out
    ///
    /// A document's bytes are dropped as soon as it has been checked.
    ///
    /// # Errors
    ///
    /// Only [`Error::FolderUnreadable`]. Bad documents never fail the load.
    pub async fn load(&self, folder: &Path, schema: &Schema) -> Result<LoadReport> {
        let files = self.list(folder).await?;
        let files_seen = files.len();
        log::debug!(
            "Loading {} file(s) from {:?} (concurrency {})",
            files_seen,
            folder,
            self.concurrency
        );

        // `buffered` yields in input order regardless of completion order.
        let outcomes: Vec<std::result::Result<CollectionEntry, Diagnostic>> =
            stream::iter(files)
                .map(|path| load_file(path, schema))
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut report = LoadReport {
            files_seen,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(entry) => report.collection.push(entry),
                Err(diagnostic) => report.diagnostics.push(diagnostic),
            }
        }

        for diagnostic in &report.diagnostics {
            diagnostic.log();
        }

        log::info!(
            "Loaded {} of {} document(s) from {:?}",
            report.collection.len(),
            files_seen,
            folder
        );

        Ok(report)
    }
}

async fn load_file(
    path: PathBuf,
    schema: &Schema,
) -> std::result::Result<CollectionEntry, Diagnostic> {
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return Err(Diagnostic::new(
                path,
                DiagnosticKind::Unreadable(e.to_string()),
            ));
        }
    };

    let document = Document::new(path, bytes);
    check_document(&document, schema).map_err(|kind| Diagnostic::new(document.path(), kind))
}

fn check_document(
    document: &Document,
    schema: &Schema,
) -> std::result::Result<CollectionEntry, DiagnosticKind> {
    let header = document
        .extract()
        .map_err(|failure| DiagnosticKind::Extraction(failure.error))?;
    let (metadata, body) = header.into_parts();

    match validate(schema, &metadata) {
        ValidationOutcome::Valid(record) => Ok(CollectionEntry::new(document.path(), record, body)),
        ValidationOutcome::Invalid(errors) => Err(DiagnosticKind::Validation(errors)),
    }
}

// ============================================================================
// Tests
// ============================================================================
