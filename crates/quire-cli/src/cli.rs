//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Check and inspect Quire content collections
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ./quire.toml when present)
    #[arg(short, long, global = true, env = "QUIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Content root, overriding the configuration and QUIRE_CONTENT_ROOT
    #[arg(long, global = true)]
    pub content_root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load collections and report every invalid document
    Check {
        /// Collections to check (all when omitted)
        collections: Vec<String>,
    },
    /// List the valid entries of a collection
    List {
        /// Collection name
        collection: String,
        /// Print each record as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Show one entry by slug
    Show {
        /// Collection name
        collection: String,
        /// Entry slug
        slug: String,
        /// Also print the document body
        #[arg(long)]
        body: bool,
    },
    /// Print the declared schema of a collection as JSON
    Schema {
        /// Collection name
        collection: String,
    },
}
