//! Resolved acquisition configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::defaults::{
    DEFAULT_BASE_DIR, DEFAULT_CONCURRENCY, DEFAULT_REQUEST_INTERVAL_MS, DEFAULT_TIMEOUT_SECS,
};
use super::file::ConfigError;
use super::settings::ConfigFile;
use crate::provider::ImageryParams;
use crate::rate_limit::RateLimiterKind;

/// Everything the acquisition orchestrator needs, validated up front.
///
/// Constructing one is the startup credential check: without a token there
/// is no `AcquisitionConfig`, and therefore no orchestrator.
///
/// # Example
///
/// ```
/// use satlayer::config::AcquisitionConfig;
/// use std::time::Duration;
///
/// let config = AcquisitionConfig::new(Some("pk.example".to_string()))
///     .unwrap()
///     .with_request_interval(Duration::from_millis(500))
///     .with_concurrency(4);
/// assert_eq!(config.concurrency(), 4);
///
/// assert!(AcquisitionConfig::new(None).is_err());
/// ```
#[derive(Clone, PartialEq)]
pub struct AcquisitionConfig {
    access_token: String,
    imagery: ImageryParams,
    base_dir: PathBuf,
    timeout: Duration,
    request_interval: Duration,
    throttle_skipped: bool,
    concurrency: usize,
    rate_limiter: RateLimiterKind,
}

impl AcquisitionConfig {
    /// Creates a configuration with default settings and the given token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if the token is absent or blank.
    pub fn new(access_token: Option<String>) -> Result<Self, ConfigError> {
        let access_token = access_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingCredential)?;

        Ok(Self {
            access_token,
            imagery: ImageryParams::default(),
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            request_interval: Duration::from_millis(DEFAULT_REQUEST_INTERVAL_MS),
            throttle_skipped: false,
            concurrency: DEFAULT_CONCURRENCY,
            rate_limiter: RateLimiterKind::FixedDelay,
        })
    }

    /// Resolves a configuration from a loaded config file.
    pub fn from_config_file(file: &ConfigFile) -> Result<Self, ConfigError> {
        let config = Self::new(file.mapbox.access_token.clone())?
            .with_imagery(ImageryParams {
                style: file.mapbox.style.clone(),
                zoom: file.mapbox.zoom,
                size_px: file.mapbox.size,
            })
            .with_base_dir(&file.acquisition.base_dir)
            .with_timeout(Duration::from_secs(file.acquisition.timeout))
            .with_request_interval(Duration::from_millis(file.acquisition.request_interval_ms))
            .with_throttle_skipped(file.acquisition.throttle_skipped)
            .with_concurrency(file.acquisition.concurrency)
            .with_rate_limiter(file.acquisition.rate_limiter);
        Ok(config)
    }

    /// Set the imagery parameters (style, zoom, size).
    pub fn with_imagery(mut self, imagery: ImageryParams) -> Self {
        self.imagery = imagery;
        self
    }

    /// Set the dataset root directory.
    pub fn with_base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        self.base_dir = base_dir.as_ref().to_path_buf();
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the spacing between requests.
    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    /// Also charge the rate-limit pause for skipped records.
    pub fn with_throttle_skipped(mut self, throttle: bool) -> Self {
        self.throttle_skipped = throttle;
        self
    }

    /// Set the number of records processed concurrently (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the rate limiting strategy.
    pub fn with_rate_limiter(mut self, kind: RateLimiterKind) -> Self {
        self.rate_limiter = kind;
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn imagery(&self) -> &ImageryParams {
        &self.imagery
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn request_interval(&self) -> Duration {
        self.request_interval
    }

    pub fn throttle_skipped(&self) -> bool {
        self.throttle_skipped
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn rate_limiter(&self) -> RateLimiterKind {
        self.rate_limiter
    }

    /// Limiter strategy actually used for this configuration.
    ///
    /// A fixed delay admits one request at a time, which would leave extra
    /// workers idle, so `concurrency > 1` always runs on the token bucket.
    /// Both strategies hold the same `1 / request_interval` rate.
    pub fn effective_rate_limiter(&self) -> RateLimiterKind {
        if self.concurrency > 1 {
            RateLimiterKind::TokenBucket
        } else {
            self.rate_limiter
        }
    }
}

impl std::fmt::Debug for AcquisitionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionConfig")
            .field("access_token", &"***")
            .field("imagery", &self.imagery)
            .field("base_dir", &self.base_dir)
            .field("timeout", &self.timeout)
            .field("request_interval", &self.request_interval)
            .field("throttle_skipped", &self.throttle_skipped)
            .field("concurrency", &self.concurrency)
            .field("rate_limiter", &self.rate_limiter)
            .finish()
    }
}
