//! Collection entries and the ordered collection they form.

use std::path::{Path, PathBuf};

use quire_core::Result;
use quire_schema::{Record, TypedValue};
use serde::de::DeserializeOwned;

/// One validated document: its typed metadata, body and source file.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEntry {
    path: PathBuf,
    record: Record,
    body: String,
}

impl CollectionEntry {
    /// Pair a validated record with the file it came from.
    pub fn new(path: impl Into<PathBuf>, record: Record, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            record,
            body: body.into(),
        }
    }

    /// Source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Source file name, without directories.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()?.to_str()
    }

    /// The validated, coerced metadata.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Document text after the metadata block, verbatim.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Shortcut for `record().get(field)`.
    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.record.get(field)
    }

    /// Convert the record into a caller-defined type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        self.record.deserialize()
    }

    /// Take the record, dropping path and body.
    pub fn into_record(self) -> Record {
        self.record
    }
}

/// The validated entries of one folder, in directory listing order.
///
/// Every entry satisfies the collection's schema. The order is whatever the
/// filesystem listed; sort explicitly if a field order is needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    entries: Vec<CollectionEntry>,
}

impl Collection {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: CollectionEntry) {
        self.entries.push(entry);
    }

    /// All entries.
    pub fn entries(&self) -> &[CollectionEntry] {
        &self.entries
    }

    /// Iterate entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, CollectionEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing validated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry whose source file is `path`.
    pub fn by_path(&self, path: &Path) -> Option<&CollectionEntry> {
        self.entries.iter().find(|e| e.path.as_path() == path)
    }

    /// Take the entries.
    pub fn into_entries(self) -> Vec<CollectionEntry> {
        self.entries
    }

    /// Convert every record into a caller-defined type, keeping order.
    pub fn deserialize_all<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.entries.iter().map(|e| e.deserialize()).collect()
    }
}

impl From<Vec<CollectionEntry>> for Collection {
    fn from(entries: Vec<CollectionEntry>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for Collection {
    type Item = CollectionEntry;
    type IntoIter = std::vec::IntoIter<CollectionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a CollectionEntry;
    type IntoIter = std::slice::Iter<'a, CollectionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn entry(path: &str, title: &str) -> CollectionEntry {
        let mut record = Record::new();
        record.insert("title", TypedValue::String(title.to_string()));
        CollectionEntry::new(path, record, "body")
    }

    #[test]
    fn test_entry_accessors() {
        let e = entry("/content/events/a.md", "A");
        assert_eq!(e.file_name(), Some("a.md"));
        assert_eq!(e.get("title").and_then(TypedValue::as_str), Some("A"));
        assert_eq!(e.body(), "body");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Titled {
        title: String,
    }

    #[test]
    fn test_collection_order_and_deserialize() {
        let collection = Collection::from(vec![entry("b.md", "B"), entry("a.md", "A")]);
        assert_eq!(collection.len(), 2);

        let titles: Vec<Titled> = collection.deserialize_all().unwrap();
        assert_eq!(titles[0].title, "B");
        assert_eq!(titles[1].title, "A");

        assert!(collection.by_path(Path::new("a.md")).is_some());
        assert!(collection.by_path(Path::new("c.md")).is_none());
    }
}
