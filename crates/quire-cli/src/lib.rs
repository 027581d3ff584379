//! # quire-cli
//!
//! The `quire` command: checks collections for invalid documents and prints
//! entries, records and schemas from the command line.
//!
//! ```text
//! quire check                      # every collection in quire.toml
//! quire list events --json         # one JSON record per line
//! quire show events spring-summit --body
//! quire schema events
//! ```

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` selects the filter, defaulting to `info`; `verbose` forces
/// `debug`. Records from the `log` facade used by the library crates are
/// bridged into the same subscriber.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // A subscriber may already be installed (tests, embedding).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
