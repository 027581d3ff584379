//! Collection definitions and the registry that holds them.
//!
//! [`DefinedCollection`] binds one schema to one folder and exposes the
//! accessor surface used by renderers: [`get_all`](DefinedCollection::get_all)
//! and [`get_by_slug`](DefinedCollection::get_by_slug). Every call re-reads
//! and re-validates the folder; nothing is cached between calls.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quire_core::{Error, Result};
use quire_schema::Schema;

use crate::config::QuireConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::entry::{Collection, CollectionEntry};
use crate::loader::{CollectionLoader, LoadReport};
use crate::slug::{SlugDeriver, SlugSource};

// ============================================================================
// DefinedCollection
// ============================================================================

/// A named collection: one folder, one schema, one slug derivation.
///
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct DefinedCollection {
    name: String,
    content_root: PathBuf,
    folder: PathBuf,
    schema: Schema,
    loader: CollectionLoader,
    slugs: Arc<dyn SlugDeriver>,
}

impl DefinedCollection {
    /// Define collection `name` stored in `content_root/name`.
    ///
    /// # Errors
    ///
    /// [`Error::Schema`] if the schema fails [`Schema::check`].
    pub fn define(
        content_root: impl Into<PathBuf>,
        name: impl Into<String>,
        schema: Schema,
    ) -> Result<Self> {
        let name = name.into();
        schema.check()?;

        Ok(Self {
            folder: PathBuf::from(&name),
            name,
            content_root: content_root.into(),
            schema,
            loader: CollectionLoader::default(),
            slugs: Arc::new(SlugSource::default()),
        })
    }

    /// Use a folder other than the collection name (relative to the content root).
    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Use a different slug derivation.
    pub fn with_slug(mut self, deriver: impl SlugDeriver + 'static) -> Self {
        self.slugs = Arc::new(deriver);
        self
    }

    /// Use a differently configured loader.
    pub fn with_loader(mut self, loader: CollectionLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path of the collection folder.
    pub fn folder(&self) -> PathBuf {
        self.content_root.join(&self.folder)
    }

    /// The bound schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The entry's slug under this collection's derivation.
    pub fn slug_of(&self, entry: &CollectionEntry) -> Option<String> {
        self.slugs.derive(entry)
    }

    /// Load the folder, including duplicate-slug diagnostics.
    pub async fn load(&self) -> Result<LoadReport> {
        let mut report = self.loader.load(&self.folder(), &self.schema).await?;

        let duplicates = self.duplicate_slugs(&report.collection);
        for diagnostic in &duplicates {
            diagnostic.log();
        }
        report.diagnostics.extend(duplicates);

        Ok(report)
    }

    /// Every valid entry, in listing order.
    ///
    /// # Errors
    ///
    /// [`Error::FolderUnreadable`] if the folder cannot be listed.
    pub async fn get_all(&self) -> Result<Collection> {
        let report = self.loader.load(&self.folder(), &self.schema).await?;
        Ok(report.collection)
    }

    /// The single entry whose slug is `slug`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no entry has this slug
    /// - [`Error::DuplicateSlug`] if several do
    /// - [`Error::FolderUnreadable`] if the folder cannot be listed
    pub async fn get_by_slug(&self, slug: &str) -> Result<CollectionEntry> {
        let collection = self.get_all().await?;
        let mut matches = collection
            .into_iter()
            .filter(|entry| self.slug_of(entry).as_deref() == Some(slug));

        let first = matches
            .next()
            .ok_or_else(|| Error::not_found(&self.name, slug))?;
        let others: Vec<PathBuf> = matches.map(|e| e.path().to_path_buf()).collect();

        if others.is_empty() {
            return Ok(first);
        }

        let mut paths = vec![first.path().to_path_buf()];
        paths.extend(others);
        Err(Error::DuplicateSlug {
            collection: self.name.clone(),
            slug: slug.to_string(),
            paths,
        })
    }

    fn duplicate_slugs(&self, collection: &Collection) -> Vec<Diagnostic> {
        let mut seen: HashMap<String, &Path> = HashMap::new();
        let mut diagnostics = Vec::new();

        for entry in collection {
            let Some(slug) = self.slug_of(entry) else {
                log::debug!(
                    "{:?} has no slug in collection '{}'",
                    entry.path(),
                    self.name
                );
                continue;
            };
            match seen.get(&slug) {
                Some(first) => diagnostics.push(Diagnostic::new(
                    entry.path(),
                    DiagnosticKind::DuplicateSlug {
                        slug,
                        first: first.to_path_buf(),
                    },
                )),
                None => {
                    seen.insert(slug, entry.path());
                }
            }
        }

        diagnostics
    }
}

// ============================================================================
// CollectionRegistry
// ============================================================================

/// All collections under one content root.
#[derive(Debug, Clone)]
pub struct CollectionRegistry {
    content_root: PathBuf,
    loader: CollectionLoader,
    collections: BTreeMap<String, DefinedCollection>,
}

impl CollectionRegistry {
    /// Empty registry rooted at `content_root`, using the default loader.
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            loader: CollectionLoader::default(),
            collections: BTreeMap::new(),
        }
    }

    /// Loader used for collections defined after this call.
    pub fn with_loader(mut self, loader: CollectionLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Build a registry from configuration.
    pub fn from_config(config: &QuireConfig) -> Result<Self> {
        config.check()?;

        let mut registry = Self::new(&config.content_root).with_loader(
            CollectionLoader::new(&config.extension).with_concurrency(config.concurrency),
        );

        for (name, collection) in &config.collections {
            let mut defined =
                DefinedCollection::define(&config.content_root, name, collection.schema.clone())
                    .map_err(|e| Error::config(format!("collection '{name}': {e}")))?
                    .with_loader(registry.loader.clone())
                    .with_slug(collection.slug.clone());
            if let Some(folder) = &collection.folder {
                defined = defined.with_folder(folder);
            }
            registry.insert(defined)?;
        }

        log::debug!(
            "Registry rooted at {:?} with {} collection(s)",
            registry.content_root,
            registry.collections.len()
        );
        Ok(registry)
    }

    /// Define a collection whose folder has the same name.
    ///
    /// # Errors
    ///
    /// [`Error::Schema`] for an unusable schema, [`Error::Config`] if the
    /// name is already taken.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        schema: Schema,
    ) -> Result<&DefinedCollection> {
        let defined = DefinedCollection::define(&self.content_root, name, schema)?
            .with_loader(self.loader.clone());
        self.insert(defined)
    }

    /// Add an already built collection.
    pub fn insert(&mut self, collection: DefinedCollection) -> Result<&DefinedCollection> {
        use std::collections::btree_map::Entry;

        match self.collections.entry(collection.name.clone()) {
            Entry::Occupied(_) => Err(Error::config(format!(
                "collection '{}' is already defined",
                collection.name
            ))),
            Entry::Vacant(slot) => Ok(slot.insert(collection)),
        }
    }

    /// Look up a collection.
    pub fn get(&self, name: &str) -> Option<&DefinedCollection> {
        self.collections.get(name)
    }

    /// Look up a collection, failing with [`Error::UnknownCollection`].
    pub fn collection(&self, name: &str) -> Result<&DefinedCollection> {
        self.get(name)
            .ok_or_else(|| Error::UnknownCollection(name.to_string()))
    }

    /// Collection names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Collections in name order.
    pub fn iter(&self) -> impl Iterator<Item = &DefinedCollection> {
        self.collections.values()
    }

    /// Number of collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// `true` if no collection is defined.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// The content root.
    pub fn content_root(&self) -> &Path {
        &self.content_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_schema::Field;

    fn schema() -> Schema {
        Schema::new().field("title", Field::string())
    }

    #[test]
    fn test_define_uses_name_as_folder() {
        let collection = DefinedCollection::define("/site/content", "events", schema()).unwrap();
        assert_eq!(collection.name(), "events");
        assert_eq!(collection.folder(), PathBuf::from("/site/content/events"));

        let collection = collection.with_folder("talks");
        assert_eq!(collection.folder(), PathBuf::from("/site/content/talks"));
    }

    #[test]
    fn test_define_rejects_bad_schema() {
        let bad = Schema::new().field("level", Field::enumeration(Vec::<String>::new()));
        let err = DefinedCollection::define("content", "events", bad).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_registry_define_and_lookup() {
        let mut registry = CollectionRegistry::new("content");
        registry.define("events", schema()).unwrap();
        registry.define("partners", schema()).unwrap();

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["events", "partners"]);
        assert!(registry.get("events").is_some());
        assert!(matches!(
            registry.collection("posts").unwrap_err(),
            Error::UnknownCollection(name) if name == "posts"
        ));
    }

    #[test]
    fn test_registry_rejects_redefinition() {
        let mut registry = CollectionRegistry::new("content");
        registry.define("events", schema()).unwrap();
        let err = registry.define("events", schema()).unwrap_err();
        assert!(err.to_string().contains("already defined"));
        assert_eq!(registry.len(), 1);
    }
}
