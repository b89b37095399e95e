//! Verify command - check that every record of a split has its image.

use satlayer::dataset::{AlignedImageDataset, DatasetError};
use satlayer::records::{Record, RecordId};
use satlayer::store::AssetStore;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::CliError;
use crate::runner::{pair_splits, CliRunner, RunnerOptions};

/// Arguments for the verify command.
pub struct VerifyArgs {
    pub splits: Vec<String>,
    pub records: Vec<PathBuf>,
    pub base_dir: Option<PathBuf>,
    pub decode: bool,
}

/// Findings for one split.
#[derive(Debug, Default)]
struct SplitReport {
    missing: Vec<(RecordId, PathBuf)>,
    unreadable: Vec<(RecordId, String)>,
    orphans: Vec<RecordId>,
}

/// Run the verify command.
pub async fn run(args: VerifyArgs, options: &RunnerOptions) -> Result<(), CliError> {
    let pairs = pair_splits(args.splits, args.records)?;

    let runner = CliRunner::new(options)?;
    runner.log_startup("verify");

    let base_dir = args
        .base_dir
        .unwrap_or_else(|| runner.config().acquisition.base_dir.clone());

    let mut missing = 0;
    let mut unreadable = 0;

    for (split, path) in pairs {
        let records = runner.load_records(&path)?;
        let report = check_split(&base_dir, &split, records, args.decode).await;

        println!(
            "{}: {} missing, {} unreadable, {} not in records",
            split,
            report.missing.len(),
            report.unreadable.len(),
            report.orphans.len()
        );
        for (id, path) in &report.missing {
            println!("  missing    {} ({})", id, path.display());
        }
        for (id, reason) in &report.unreadable {
            println!("  unreadable {} ({})", id, reason);
        }
        for id in &report.orphans {
            println!("  extra      {}", id);
        }

        missing += report.missing.len();
        unreadable += report.unreadable.len();
    }

    if missing + unreadable > 0 {
        return Err(CliError::Incomplete {
            missing,
            unreadable,
        });
    }

    println!("All images present.");
    Ok(())
}

async fn check_split(
    base_dir: &Path,
    split: &str,
    records: Vec<Record>,
    decode: bool,
) -> SplitReport {
    let expected: BTreeSet<RecordId> = records.iter().map(|r| r.id.clone()).collect();
    let store = AssetStore::for_split(base_dir, split);
    let dataset = AlignedImageDataset::for_split(records, base_dir, split);

    let mut report = SplitReport {
        missing: dataset.missing_assets(),
        ..SplitReport::default()
    };

    if decode {
        for result in dataset.iter() {
            match result {
                Ok(_) | Err(DatasetError::MissingAsset { .. }) => {}
                Err(DatasetError::Decode { id, source, .. }) => {
                    report.unreadable.push((id, source.to_string()))
                }
                Err(DatasetError::Io { id, source, .. }) => {
                    report.unreadable.push((id, source.to_string()))
                }
                Err(e) => warn!(split = split, error = %e, "Unexpected read failure"),
            }
        }
    }

    match store.list_ids().await {
        Ok(on_disk) => report.orphans = on_disk.difference(&expected).cloned().collect(),
        Err(e) => warn!(split = split, error = %e, "Cannot list split directory"),
    }

    info!(
        split = split,
        missing = report.missing.len(),
        unreadable = report.unreadable.len(),
        orphans = report.orphans.len(),
        "Verification finished"
    );

    report
}
