//! Default values and constants for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::provider::{DEFAULT_SIZE_PX, DEFAULT_STYLE, DEFAULT_ZOOM};
use crate::rate_limit::RateLimiterKind;

/// Environment variable holding the MapBox access token.
pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_TOKEN";

/// Default dataset root directory.
pub const DEFAULT_BASE_DIR: &str = "data";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Upper bound for the HTTP timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Default spacing between requests in milliseconds.
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 200;

/// Default number of records in flight.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Upper bound for concurrency.
pub const MAX_CONCURRENCY: usize = 64;

/// Highest zoom level the Static Images API accepts.
pub const MAX_ZOOM: u8 = 22;

/// Largest image edge the Static Images API renders.
pub const MAX_SIZE_PX: u32 = 1280;

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "satlayer.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            mapbox: MapboxSettings {
                access_token: None,
                style: DEFAULT_STYLE.to_string(),
                zoom: DEFAULT_ZOOM,
                size: DEFAULT_SIZE_PX,
            },
            acquisition: AcquisitionSettings {
                base_dir: PathBuf::from(DEFAULT_BASE_DIR),
                timeout: DEFAULT_TIMEOUT_SECS,
                request_interval_ms: DEFAULT_REQUEST_INTERVAL_MS,
                throttle_skipped: false,
                concurrency: DEFAULT_CONCURRENCY,
                rate_limiter: RateLimiterKind::FixedDelay,
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE),
            },
        }
    }
}
