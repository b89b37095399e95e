//! SatLayer - Satellite imagery acquisition for tabular datasets
//!
//! This library fetches one satellite image per record of a tabular dataset
//! (identifier, latitude, longitude) and serves those images back, matched by
//! identifier, to training and inference code.
//!
//! # High-Level API
//!
//! ```ignore
//! use satlayer::acquisition::MapBoxOrchestrator;
//! use satlayer::config::{AcquisitionConfig, ConfigFile};
//! use satlayer::dataset::AlignedImageDataset;
//! use satlayer::records::read_csv;
//!
//! let mut file = ConfigFile::load()?;
//! file.apply_env();
//! let config = AcquisitionConfig::from_config_file(&file)?;
//!
//! let records = read_csv(Path::new("data/raw/train.csv"))?;
//! let orchestrator = MapBoxOrchestrator::from_config(config)?;
//! println!("{}", orchestrator.acquire_split("train", &records).await);
//!
//! let dataset = AlignedImageDataset::for_split(records, Path::new("data"), "train");
//! let (image, id) = dataset.get(0)?;
//! ```

pub mod acquisition;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod provider;
pub mod rate_limit;
pub mod records;
pub mod store;

/// Version of the SatLayer library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
