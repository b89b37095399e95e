//! Acquisition pipeline.
//!
//! Turns a sequence of records into image assets on disk:
//!
//! ```text
//! records ─► seen? ──yes──► Duplicate
//!               │no
//!               ▼
//!            exists? ──yes──► Skipped
//!               │no
//!               ▼
//!            resolve ─► rate limit ─► fetch ─► write ─► Success
//!                                       └────────┴────► Failed
//! ```
//!
//! Acquisition is best-effort. A failed record shows up as an undercount in
//! the summary; re-running the same split fills the gaps without touching
//! assets that already exist.
//!
//! # Example
//!
//! ```ignore
//! use satlayer::acquisition::MapBoxOrchestrator;
//! use satlayer::config::AcquisitionConfig;
//!
//! let config = AcquisitionConfig::new(std::env::var("MAPBOX_TOKEN").ok())?;
//! let orchestrator = MapBoxOrchestrator::from_config(config)?;
//! let summary = orchestrator.acquire_split("train", &records).await;
//! println!("{}", summary); // "123 images downloaded to data/images/train"
//! ```

mod orchestrator;
mod types;

pub use orchestrator::{AcquisitionOrchestrator, MapBoxOrchestrator};
pub use types::{AcquisitionSummary, DownloadOutcome, OutcomeStatus};
