//! Log setup for the CLI.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `CMSPORT_LOG` (or `RUST_LOG`) overrides the level picked by the flags.
/// With a log file, output is appended there instead of stderr.
pub fn init_tracing(verbose: bool, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let level = match (quiet, verbose) {
        (true, _) => "cmsport=error",
        (false, true) => "cmsport=debug",
        (false, false) => "cmsport=info",
    };

    let filter = EnvFilter::try_from_env("CMSPORT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .try_init()?;
        }
        None => {
            registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(std::io::stderr)
                        .with_ansi(false),
                )
                .try_init()?;
        }
    }

    Ok(())
}
