//! Configuration for SatLayer.
//!
//! Two layers:
//!
//! - [`ConfigFile`]: the user's `~/.satlayer/config.ini`, one struct per
//!   INI section, with `MAPBOX_TOKEN` from the environment layered on top.
//! - [`AcquisitionConfig`]: the validated, read-only view handed to the
//!   orchestrator. Building it is where a missing credential is caught.
//!
//! # Example
//!
//! ```no_run
//! use satlayer::config::{AcquisitionConfig, ConfigFile};
//!
//! let mut file = ConfigFile::load()?;
//! file.apply_env();
//! let config = AcquisitionConfig::from_config_file(&file)?;
//! # Ok::<(), satlayer::config::ConfigError>(())
//! ```

mod acquisition;
mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use acquisition::AcquisitionConfig;
pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigError};
pub use settings::{AcquisitionSettings, ConfigFile, LoggingSettings, MapboxSettings};
