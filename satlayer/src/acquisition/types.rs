//! Acquisition outcome types

use crate::records::RecordId;
use std::fmt;
use std::path::PathBuf;

/// Result of processing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Image fetched and persisted
    Success,
    /// Asset already present; no request issued
    Skipped,
    /// Identifier repeated in this run; the earlier row decides its fate
    Duplicate,
    /// Fetch or write failed; the record is left for a later run
    Failed(String),
}

/// Per-record outcome, in record order within a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub id: RecordId,
    pub status: OutcomeStatus,
}

impl DownloadOutcome {
    pub(crate) fn success(id: &RecordId) -> Self {
        Self {
            id: id.clone(),
            status: OutcomeStatus::Success,
        }
    }

    pub(crate) fn skipped(id: &RecordId) -> Self {
        Self {
            id: id.clone(),
            status: OutcomeStatus::Skipped,
        }
    }

    pub(crate) fn duplicate(id: &RecordId) -> Self {
        Self {
            id: id.clone(),
            status: OutcomeStatus::Duplicate,
        }
    }

    pub(crate) fn failed(id: &RecordId, reason: impl fmt::Display) -> Self {
        Self {
            id: id.clone(),
            status: OutcomeStatus::Failed(reason.to_string()),
        }
    }
}

/// Aggregated result of acquiring one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionSummary {
    /// Split name
    pub split: String,
    /// Directory the split's assets live in
    pub output_dir: PathBuf,
    /// One outcome per input record, in input order
    pub outcomes: Vec<DownloadOutcome>,
}

impl AcquisitionSummary {
    /// Number of images newly downloaded in this run.
    pub fn downloaded(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Success))
    }

    /// Number of records whose asset already existed.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Skipped))
    }

    /// Number of rows repeating an identifier seen earlier in the run.
    pub fn duplicates(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Duplicate))
    }

    /// Number of records that failed.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed(_)))
    }

    /// Number of records processed.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// True when every record now has an asset on disk.
    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }

    /// Identifiers of failed records, in input order.
    pub fn failed_ids(&self) -> impl Iterator<Item = &RecordId> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed(_)))
            .map(|o| &o.id)
    }

    fn count(&self, predicate: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }
}

impl fmt::Display for AcquisitionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} images downloaded to {}",
            self.downloaded(),
            self.output_dir.display()
        )
    }
}
