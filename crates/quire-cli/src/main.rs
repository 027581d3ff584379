//! Quire CLI
//!
//! Command-line interface for Quire content collections.

#![forbid(unsafe_code)]

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use quire_cli::{Cli, commands};
use quire_collection::CollectionRegistry;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    quire_cli::init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let config = commands::resolve_config(cli.config.as_deref(), cli.content_root.as_deref())?;
    let registry = CollectionRegistry::from_config(&config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&registry, &cli.command, &mut out).await
}
