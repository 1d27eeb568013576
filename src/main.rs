//! cmsport CLI - export CMS content and media blobs.
//!
//! Loads the store named in the tool config, resolves every configured
//! template into group documents and, with `--blobs`, extracts the media
//! payloads those documents reference.

mod logging;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cmsport::prelude::*;
use cmsport::{format_lastmod, lastmod_path, read_lastmod, write_lastmod};

/// cmsport - CMS content exporter
#[derive(Parser)]
#[command(name = "cmsport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Tool configuration (store location)
    #[arg(short = 'c', long, default_value = "config.json", env = "CMSPORT_CONFIG")]
    config: PathBuf,

    /// Export settings (templates, fields, output)
    #[arg(short, long, default_value = "settings.json", env = "CMSPORT_SETTINGS")]
    settings: PathBuf,

    /// Only log errors and print nothing
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    /// Append the log to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Extract media blobs after writing content
    #[arg(short, long)]
    blobs: bool,

    /// Export only items changed since the last run, then record this run
    #[arg(long)]
    lastmod: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.quiet, cli.log_file.as_deref())
        .context("Failed to initialize logging")?;

    let started_at = Utc::now();
    let start = Instant::now();

    let config = ToolConfig::load(&cli.config).context("Failed to load tool config")?;
    let export = ExportSettings::load(&cli.settings).context("Failed to load export settings")?;
    let settings = export.build().context("Invalid export settings")?;
    let format: ContentFormat = export
        .output
        .content_format
        .parse()
        .context("Invalid output settings")?;
    let store = config.open_store().context("Failed to open content store")?;

    let marker = lastmod_path(&cli.settings);
    let since = if cli.lastmod { read_lastmod(&marker) } else { None };
    if let Some(since) = since {
        tracing::info!(since = %format_lastmod(since), "exporting items changed since last run");
    }

    let snapshot = load_snapshot(&store, &settings, since).context("Failed to load content")?;
    let assembly = assemble(&snapshot, &settings, &HandlerRegistry::standard());
    let written = write_groups(&assembly.groups, &export.output.content_location, format)
        .context("Failed to write content")?;

    if !cli.quiet {
        println!(
            "Exported {} items in {} groups to {} ({} field errors)",
            assembly.item_count(),
            written.len(),
            export.output.content_location.display(),
            assembly.errors.len()
        );
    }

    if cli.blobs {
        extract_blobs(&cli, &export, &assembly, &store)?;
    }

    if cli.lastmod {
        if let Err(err) = write_lastmod(&marker, started_at) {
            tracing::warn!(path = %marker.display(), "couldn't record last run: {}", err);
        }
    }

    if !cli.quiet {
        println!("Completed in {:?}", start.elapsed());
    }

    Ok(())
}

fn extract_blobs(
    cli: &Cli,
    export: &ExportSettings,
    assembly: &Assembly,
    store: &JsonStore,
) -> Result<()> {
    let assets = collect_assets(&assembly.groups);
    if assets.is_empty() {
        tracing::info!("no blobs referenced");
        return Ok(());
    }

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(assets.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let config = PipelineConfig::from_settings(&export.pipeline, &export.output.blob_location);
    let report = BlobPipeline::new(store, config)
        .run(&assets, |_, _| pb.inc(1))
        .context("Failed to start blob extraction")?;
    pb.finish_and_clear();

    if !cli.quiet {
        let stats = report.stats;
        println!(
            "Blobs: {} total, {} written, {} already present, {} failed",
            stats.total, stats.written, stats.skipped, stats.failed
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "cmsport", "-c", "conf/config.json", "--settings", "conf/settings.json", "-b", "--lastmod",
            "--log-file", "run.log",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("conf/config.json"));
        assert_eq!(cli.settings, PathBuf::from("conf/settings.json"));
        assert!(cli.blobs && cli.lastmod);
        assert_eq!(cli.log_file, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["cmsport", "-q", "-v"]).is_err());
    }
}
