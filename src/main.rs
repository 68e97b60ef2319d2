//! CLI entry point for the harvester tool.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use harvester_core::{DownloadStats, HttpClient, Pipeline};
use tracing::{debug, info, warn};

mod cli;
mod progress;

use cli::Args;
use progress::ProgressDownloader;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Harvester starting");

    let pipeline = Pipeline::new(args.to_config());

    let urls = pipeline
        .acquire_links()
        .await
        .context("Failed to acquire document catalog")?;

    if urls.is_empty() {
        info!("Catalog listed no downloadable documents");
    }

    let client = HttpClient::new(&pipeline.config().download)?;
    let show_progress = !args.quiet && !args.no_progress && io::stderr().is_terminal();
    let progress = Arc::new(ProgressDownloader::new(
        Arc::new(client),
        urls.len(),
        show_progress,
    ));

    let outcomes = pipeline.download(progress.clone(), urls).await?;
    progress.finish();

    let reconcile = pipeline.reconcile().await?;
    let stats = DownloadStats::from_outcomes(&outcomes);

    info!(
        saved = stats.saved,
        skipped = stats.skipped,
        failed = stats.failed,
        removed_invalid = reconcile.removed,
        renamed = reconcile.renamed,
        output_dir = %pipeline.config().output_dir.display(),
        "Harvest complete"
    );

    if stats.failed > 0 {
        warn!(failed = stats.failed, total = stats.total(), "Some downloads failed");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
