//! Fetch command - acquire imagery for each split in turn.

use satlayer::acquisition::MapBoxOrchestrator;
use satlayer::config::AcquisitionConfig;
use std::path::PathBuf;
use tracing::info;

use crate::error::CliError;
use crate::runner::{pair_splits, CliRunner, RunnerOptions};

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub splits: Vec<String>,
    pub records: Vec<PathBuf>,
    pub base_dir: Option<PathBuf>,
    pub token: Option<String>,
    pub concurrency: Option<usize>,
    pub throttle_skipped: bool,
}

/// Run the fetch command.
pub async fn run(args: FetchArgs, options: &RunnerOptions) -> Result<(), CliError> {
    let pairs = pair_splits(args.splits, args.records)?;

    let mut runner = CliRunner::new(options)?;
    runner.log_startup("fetch");

    // Command-line values take precedence over config and environment
    let file = runner.config_mut();
    if let Some(token) = args.token {
        file.mapbox.access_token = Some(token);
    }
    if let Some(base_dir) = args.base_dir {
        file.acquisition.base_dir = base_dir;
    }
    if let Some(concurrency) = args.concurrency {
        file.acquisition.concurrency = concurrency;
    }
    if args.throttle_skipped {
        file.acquisition.throttle_skipped = true;
    }

    // Credential problems surface here, before any record file is read
    let config = AcquisitionConfig::from_config_file(runner.config())?;
    info!("Acquisition config: {:?}", config);

    let mut splits = Vec::with_capacity(pairs.len());
    for (split, path) in pairs {
        let records = runner.load_records(&path)?;
        splits.push((split, records));
    }

    let orchestrator = MapBoxOrchestrator::from_config(config)?;

    for (split, records) in &splits {
        let summary = orchestrator.acquire_split(split, records).await;
        println!("{}", summary);
        if summary.failed() > 0 {
            println!(
                "  {} failed, {} skipped (re-run to retry failures)",
                summary.failed(),
                summary.skipped()
            );
        }
        if summary.duplicates() > 0 {
            println!("  {} repeated identifiers ignored", summary.duplicates());
        }
    }

    println!("Image download completed.");
    Ok(())
}
