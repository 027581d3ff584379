//! YAML header extraction.
//!
//! The header is metadata at the very start of a document, delimited by `---`
//! lines:
//!
//! ```markdown
//! ---
//! name: Rust Meetup
//! published: true
//! ---
//! # Body
//! ```
//!
//! Unlike a lenient markdown reader, a missing or broken header is an error
//! here: a collection document without metadata cannot be validated, so the
//! caller must learn about it rather than receive an empty mapping.
//!
//! # Usage
//!
//! ```rust
//! use quire_content::header::{extract_header, HeaderError};
//!
//! let header = extract_header("---\ntitle: Test\n---\nBody").unwrap();
//! assert_eq!(header.get_str("title"), Some("Test"));
//! assert_eq!(header.body(), "Body");
//!
//! let err = extract_header("# No header").unwrap_err();
//! assert_eq!(err, HeaderError::MissingStartDelimiter);
//! ```

use quire_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

/// Line that opens and closes the metadata block.
pub const DELIMITER: &str = "---";

const BOM: char = '\u{feff}';

/// Why a document's header could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum HeaderError {
    /// The document does not start with a `---` line.
    #[error("metadata block missing: document must start with '---'")]
    MissingStartDelimiter,

    /// The opening `---` is never closed.
    #[error("metadata block unterminated: no closing '---' line")]
    Unterminated,

    /// The text between the delimiters is not valid YAML.
    #[error("metadata block is not valid YAML: {0}")]
    Malformed(String),

    /// The YAML is valid but is not a key/value mapping.
    #[error("metadata block must be a key/value mapping, found {0}")]
    NotAMapping(&'static str),

    /// The document bytes are not UTF-8.
    #[error("document is not valid UTF-8 (invalid byte at offset {0})")]
    InvalidUtf8(usize),
}

/// A document split into its parsed metadata and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct Header<'a> {
    metadata: Mapping,
    body: &'a str,
}

impl<'a> Header<'a> {
    /// The parsed key/value section.
    pub fn metadata(&self) -> &Mapping {
        &self.metadata
    }

    /// Everything after the closing delimiter line, verbatim.
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// Split into owned metadata and the borrowed body.
    pub fn into_parts(self) -> (Mapping, &'a str) {
        (self.metadata, self.body)
    }

    /// The metadata as a YAML mapping value.
    pub fn to_value(&self) -> Value {
        Value::Mapping(self.metadata.clone())
    }

    /// Look up a raw top-level metadata value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Get a top-level string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Deserialize the metadata directly into a caller-defined type.
    ///
    /// This bypasses schema validation and coercion; it is a convenience for
    /// callers that already trust their documents.
    ///
    /// ```rust
    /// use quire_content::extract_header;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Meta {
    ///     title: String,
    /// }
    ///
    /// let header = extract_header("---\ntitle: Hello\n---\n").unwrap();
    /// let meta: Meta = header.deserialize().unwrap();
    /// assert_eq!(meta.title, "Hello");
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_yaml::from_value(self.to_value())
            .map_err(|e| Error::parse(format!("Failed to deserialize metadata: {e}")))
    }
}

/// Extract the metadata block and body from a document's text.
///
/// # Behavior
///
/// - A leading UTF-8 byte order mark is skipped.
/// - The first line must be `---` (trailing whitespace and `\r` allowed),
///   otherwise [`HeaderError::MissingStartDelimiter`].
/// - The block ends at the next line that is exactly `---`, otherwise
///   [`HeaderError::Unterminated`].
/// - An empty block (or YAML `null`) gives an empty mapping.
/// - The body is everything after the closing line's newline, untrimmed.
pub fn extract_header(content: &str) -> std::result::Result<Header<'_>, HeaderError> {
    let content = content.strip_prefix(BOM).unwrap_or(content);

    let (opening, after_opening) = next_line(content);
    if !is_delimiter(opening) {
        return Err(HeaderError::MissingStartDelimiter);
    }
    let Some(section) = after_opening else {
        return Err(HeaderError::Unterminated);
    };

    let mut cursor = section;
    let mut section_len = 0;
    loop {
        let (line, rest) = next_line(cursor);
        if is_delimiter(line) {
            let metadata = parse_metadata(&section[..section_len])?;
            return Ok(Header {
                metadata,
                body: rest.unwrap_or(""),
            });
        }
        match rest {
            Some(rest) => {
                section_len += line.len() + 1;
                cursor = rest;
            }
            None => return Err(HeaderError::Unterminated),
        }
    }
}

/// Strip the metadata block, returning only the body.
///
/// Returns the content unchanged when it has no well-formed header.
///
/// ```rust
/// use quire_content::strip_header;
///
/// assert_eq!(strip_header("---\ntitle: Test\n---\n# Heading"), "# Heading");
/// assert_eq!(strip_header("# Heading"), "# Heading");
/// ```
pub fn strip_header(content: &str) -> &str {
    extract_header(content)
        .map(|h| h.body())
        .unwrap_or(content)
}

/// Split off the first line. The second element is `None` when the line has no
/// terminating newline.
fn next_line(s: &str) -> (&str, Option<&str>) {
    match s.find('\n') {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

fn parse_metadata(yaml: &str) -> std::result::Result<Mapping, HeaderError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }

    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => Ok(mapping),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(other) => Err(HeaderError::NotAMapping(yaml_kind(&other))),
        Err(e) => Err(HeaderError::Malformed(e.to_string())),
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

// ============================================================================
// Tests
// ============================================================================
