//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use crate::rate_limit::RateLimiterKind;
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// MapBox settings
    pub mapbox: MapboxSettings,
    /// Acquisition loop settings
    pub acquisition: AcquisitionSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// MapBox Static Images settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MapboxSettings {
    /// Access token; `MAPBOX_TOKEN` in the environment takes precedence
    pub access_token: Option<String>,
    /// Map style identifier
    pub style: String,
    /// Zoom level (0-22)
    pub zoom: u8,
    /// Square image edge in pixels (1-1280)
    pub size: u32,
}

/// Acquisition settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionSettings {
    /// Dataset root; images land in `{base_dir}/images/{split}`
    pub base_dir: PathBuf,
    /// Timeout in seconds for each HTTP request
    pub timeout: u64,
    /// Milliseconds between requests
    pub request_interval_ms: u64,
    /// Also pause after records that were skipped
    pub throttle_skipped: bool,
    /// Records processed concurrently
    pub concurrency: usize,
    /// Rate limiting strategy
    pub rate_limiter: RateLimiterKind,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
