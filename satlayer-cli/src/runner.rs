//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and record file
//! loading to reduce duplication across command handlers.

use crate::error::CliError;
use satlayer::config::{config_file_path, ConfigFile, DEFAULT_LOG_FILE};
use satlayer::logging::{init_logging, LoggingGuard};
use satlayer::records::{read_csv, Record};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options shared by every command that touches the dataset.
#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    /// Config file override (`--config`)
    pub config_path: Option<PathBuf>,
    /// Force debug-level logging
    pub debug: bool,
    /// Mirror log output to stdout
    pub verbose: bool,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file, environment applied
    config: ConfigFile,
    /// Path the configuration was read from
    config_path: PathBuf,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    pub fn new(options: &RunnerOptions) -> Result<Self, CliError> {
        let config_path = options
            .config_path
            .clone()
            .unwrap_or_else(config_file_path);

        // Missing file means defaults
        let mut config = ConfigFile::load_from(&config_path)?;
        config.apply_env();

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        let logging_guard = init_logging(&log_dir, &log_file, options.verbose, options.debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Mutable access for command-line overrides.
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("SatLayer v{}", satlayer::VERSION);
        info!("SatLayer CLI: {} command", command);
        info!("Config file: {}", self.config_path.display());
    }

    /// Read one split's record file.
    pub fn load_records(&self, path: &Path) -> Result<Vec<Record>, CliError> {
        let records = read_csv(path).map_err(|error| CliError::Records {
            path: path.display().to_string(),
            error,
        })?;
        info!("Loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }
}

/// Pair `--split` names with `--records` files positionally.
pub fn pair_splits(
    splits: Vec<String>,
    records: Vec<PathBuf>,
) -> Result<Vec<(String, PathBuf)>, CliError> {
    if splits.len() != records.len() {
        return Err(CliError::Usage(format!(
            "Each --split needs a matching --records file ({} splits, {} record files)",
            splits.len(),
            records.len()
        )));
    }
    if splits.is_empty() {
        return Err(CliError::Usage(
            "At least one --split/--records pair is required".to_string(),
        ));
    }
    Ok(splits.into_iter().zip(records).collect())
}
