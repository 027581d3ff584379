//! Configuration file model.
//!
//! ```toml
//! content_root = "src/content"
//! extension = "mdx"
//! concurrency = 32
//!
//! [collections.event]
//! folder = "events"
//! slug = { field = "slug" }
//!
//! [collections.event.fields]
//! name = { type = "string" }
//! slug = { type = "string" }
//! published = { type = "boolean", default = false }
//! date = { type = "datetime", optional = true }
//! ```
//!
//! `QUIRE_CONTENT_ROOT` overrides `content_root` when set.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quire_core::{Error, Result};
use quire_schema::Schema;
use serde::{Deserialize, Serialize};

use crate::loader::{DEFAULT_CONCURRENCY, DEFAULT_EXTENSION};
use crate::slug::SlugSource;

/// Environment variable overriding the content root.
pub const CONTENT_ROOT_ENV: &str = "QUIRE_CONTENT_ROOT";

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "quire.toml";

fn default_content_root() -> PathBuf {
    PathBuf::from("content")
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuireConfig {
    /// Directory holding one folder per collection.
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,
    /// Recognized document extension.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Maximum concurrent file reads per load.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Collections by name.
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionConfig>,
}

/// One collection's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Folder under the content root; defaults to the collection name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// How entries are identified.
    #[serde(default)]
    pub slug: SlugSource,
    /// Metadata schema (`fields` and `unknown_fields`).
    #[serde(flatten)]
    pub schema: Schema,
}

impl Default for QuireConfig {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            extension: default_extension(),
            concurrency: default_concurrency(),
            collections: BTreeMap::new(),
        }
    }
}

impl QuireConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Invalid configuration: {e}")))
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
        log::debug!(
            "Loaded configuration from {:?} ({} collection(s))",
            path,
            config.collections.len()
        );
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = lookup(CONTENT_ROOT_ENV).filter(|v| !v.is_empty()) {
            log::debug!("{} overrides content_root with {:?}", CONTENT_ROOT_ENV, root);
            self.content_root = PathBuf::from(root);
        }
        self
    }

    /// Reject values the loader cannot use.
    pub fn check(&self) -> Result<()> {
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(Error::config("extension must not be empty"));
        }
        if self.concurrency == 0 {
            return Err(Error::config("concurrency must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_schema::{FieldType, UnknownFields};

    const SAMPLE: &str = r#"
content_root = "src/content"
extension = ".MDX"
concurrency = 8

[collections.event]
folder = "events"
slug = { field = "slug" }
unknown_fields = "reject"

[collections.event.fields]
name = { type = "string" }
slug = { type = "string" }
published = { type = "boolean", default = false }

[collections.partner.fields]
name = { type = "string" }
href = { type = "string", optional = true }
"#;

    #[test]
    fn test_parse_sample() {
        let config = QuireConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.content_root, PathBuf::from("src/content"));
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.collections.len(), 2);

        let event = &config.collections["event"];
        assert_eq!(event.folder.as_deref(), Some("events"));
        assert_eq!(event.slug, SlugSource::Field("slug".into()));
        assert_eq!(event.schema.unknown_fields, UnknownFields::Reject);
        assert_eq!(event.schema.fields.len(), 3);

        let partner = &config.collections["partner"];
        assert_eq!(partner.folder, None);
        assert_eq!(partner.slug, SlugSource::FileStem);
        assert_eq!(
            partner.schema.get("href").map(|f| &f.ty),
            Some(&FieldType::string())
        );
    }

    #[test]
    fn test_defaults() {
        let config = QuireConfig::from_toml_str("").unwrap();
        assert_eq!(config, QuireConfig::default());
        assert_eq!(config.extension, "md");
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_invalid_toml() {
        let err = QuireConfig::from_toml_str("concurrency = \"many\"").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Invalid configuration"));
    }

    #[test]
    fn test_check() {
        let mut config = QuireConfig::default();
        assert!(config.check().is_ok());
        config.concurrency = 0;
        assert!(config.check().is_err());
        config.concurrency = 1;
        config.extension = ".".into();
        assert!(config.check().is_err());
    }

    #[test]
    fn test_env_override() {
        let config = QuireConfig::default().with_overrides_from(|key| {
            (key == CONTENT_ROOT_ENV).then(|| "/srv/content".to_string())
        });
        assert_eq!(config.content_root, PathBuf::from("/srv/content"));

        let config = QuireConfig::default().with_overrides_from(|_| Some(String::new()));
        assert_eq!(config.content_root, PathBuf::from("content"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, SAMPLE).unwrap();
        let config = QuireConfig::load(&path).unwrap();
        assert_eq!(config.collections.len(), 2);

        let err = QuireConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
