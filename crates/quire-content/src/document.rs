//! Documents read from a collection folder.

use std::path::{Path, PathBuf};

use crate::header::{extract_header, Header, HeaderError};

/// One file's raw content, identified by its path.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    bytes: Vec<u8>,
}

/// A header extraction failure tied to the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {error}", path.display())]
pub struct ExtractionFailure {
    /// The offending file.
    pub path: PathBuf,
    /// What was wrong with its header.
    #[source]
    pub error: HeaderError,
}

impl Document {
    /// Wrap raw bytes read from `path`.
    pub fn new(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }

    /// The file this document was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the document and split it into metadata and body.
    pub fn extract(&self) -> Result<Header<'_>, ExtractionFailure> {
        let text = std::str::from_utf8(&self.bytes).map_err(|e| {
            self.failure(HeaderError::InvalidUtf8(e.valid_up_to()))
        })?;

        extract_header(text).map_err(|error| {
            log::trace!("Header extraction failed for {:?}: {}", self.path, error);
            self.failure(error)
        })
    }

    fn failure(&self, error: HeaderError) -> ExtractionFailure {
        ExtractionFailure {
            path: self.path.clone(),
            error,
        }
    }
}
