//! Command handlers.
//!
//! Handlers write to a caller-supplied writer so they can be exercised
//! without a terminal. Diagnostics are part of the `check` output; the
//! loader also logs them at `warn` level on stderr.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use quire_collection::config::DEFAULT_CONFIG_FILE;
use quire_collection::{CollectionRegistry, DefinedCollection, QuireConfig};

use crate::cli::Command;

// ============================================================================
// Configuration resolution
// ============================================================================

/// Resolve configuration from the CLI flags.
///
/// Order: explicit `--config` (or `QUIRE_CONFIG`), then `quire.toml` in the
/// working directory, then built-in defaults. `QUIRE_CONTENT_ROOT` and then
/// `--content-root` override the content root.
pub fn resolve_config(
    config_path: Option<&Path>,
    content_root: Option<&Path>,
) -> Result<QuireConfig> {
    let config = match config_path {
        Some(path) => QuireConfig::load(path)
            .with_context(|| format!("Cannot load configuration {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            QuireConfig::load(DEFAULT_CONFIG_FILE)?
        }
        None => {
            tracing::debug!("No {DEFAULT_CONFIG_FILE} found; using defaults");
            QuireConfig::default()
        }
    };

    let mut config = config.with_env_overrides();
    if let Some(root) = content_root {
        config.content_root = root.to_path_buf();
    }

    tracing::debug!(
        content_root = %config.content_root.display(),
        collections = config.collections.len(),
        "Resolved configuration"
    );
    Ok(config)
}

// ============================================================================
// Dispatch
// ============================================================================

/// Run one command. Returns `false` when `check` found problems.
pub async fn run(
    registry: &CollectionRegistry,
    command: &Command,
    out: &mut impl Write,
) -> Result<bool> {
    match command {
        Command::Check { collections } => {
            let problems = cmd_check(registry, collections, out).await?;
            Ok(problems == 0)
        }
        Command::List { collection, json } => {
            cmd_list(registry.collection(collection)?, *json, out).await?;
            Ok(true)
        }
        Command::Show {
            collection,
            slug,
            body,
        } => {
            cmd_show(registry.collection(collection)?, slug, *body, out).await?;
            Ok(true)
        }
        Command::Schema { collection } => {
            cmd_schema(registry.collection(collection)?, out)?;
            Ok(true)
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Load the named collections (all when `names` is empty) and print every
/// diagnostic followed by a summary line per collection.
///
/// Returns the total number of diagnostics.
pub async fn cmd_check(
    registry: &CollectionRegistry,
    names: &[String],
    out: &mut impl Write,
) -> Result<usize> {
    let selected: Vec<&DefinedCollection> = if names.is_empty() {
        registry.iter().collect()
    } else {
        names
            .iter()
            .map(|name| registry.collection(name))
            .collect::<quire_core::Result<Vec<_>>>()?
    };

    if selected.is_empty() {
        writeln!(out, "No collections defined")?;
        return Ok(0);
    }

    let mut total = 0;
    for collection in selected {
        let report = collection.load().await?;
        for diagnostic in &report.diagnostics {
            writeln!(out, "{diagnostic}")?;
        }
        writeln!(
            out,
            "{}: {} valid, {} excluded, {} diagnostic(s)",
            collection.name(),
            report.collection.len(),
            report.excluded(),
            report.diagnostics.len()
        )?;
        total += report.diagnostics.len();
    }

    Ok(total)
}

/// Print `slug<TAB>path` per entry, or one JSON record per line.
pub async fn cmd_list(
    collection: &DefinedCollection,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    for entry in &collection.get_all().await? {
        if json {
            writeln!(out, "{}", entry.record().to_json())?;
        } else {
            let slug = collection.slug_of(entry).unwrap_or_else(|| "-".to_string());
            writeln!(out, "{slug}\t{}", entry.path().display())?;
        }
    }
    Ok(())
}

/// Print the record of the entry with `slug`, and its body when asked.
pub async fn cmd_show(
    collection: &DefinedCollection,
    slug: &str,
    body: bool,
    out: &mut impl Write,
) -> Result<()> {
    let entry = collection.get_by_slug(slug).await?;
    let record = serde_json::to_string_pretty(&entry.record().to_json())?;
    writeln!(out, "{record}")?;
    if body {
        writeln!(out)?;
        write!(out, "{}", entry.body())?;
    }
    Ok(())
}

/// Print the declared schema as pretty JSON.
pub fn cmd_schema(collection: &DefinedCollection, out: &mut impl Write) -> Result<()> {
    let schema = serde_json::to_string_pretty(collection.schema())?;
    writeln!(out, "{schema}")?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
