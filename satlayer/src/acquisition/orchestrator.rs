//! Rate-limited batch acquisition.

use dashmap::DashSet;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use super::types::{AcquisitionSummary, DownloadOutcome};
use crate::config::AcquisitionConfig;
use crate::provider::{
    AsyncMapBoxProvider, AsyncProvider, AsyncReqwestClient, FetchError, FetchRequest,
};
use crate::rate_limit::{ConfiguredLimiter, RateLimiter};
use crate::records::{Record, RecordId};
use crate::store::AssetStore;

/// Progress is logged every this many records.
const PROGRESS_LOG_INTERVAL: usize = 100;

/// The production orchestrator: MapBox over reqwest, limiter from config.
pub type MapBoxOrchestrator =
    AcquisitionOrchestrator<AsyncMapBoxProvider<AsyncReqwestClient>, ConfiguredLimiter>;

/// Drives acquisition over a sequence of records.
///
/// For each record the orchestrator checks the split directory first and
/// only calls the provider when the asset is missing. Failures are recorded
/// as outcomes and never stop the batch.
pub struct AcquisitionOrchestrator<P: AsyncProvider, L: RateLimiter> {
    provider: P,
    limiter: L,
    config: AcquisitionConfig,
}

impl MapBoxOrchestrator {
    /// Builds the MapBox orchestrator described by `config`.
    ///
    /// With `concurrency > 1` the limiter is always a token bucket, see
    /// [`AcquisitionConfig::effective_rate_limiter`].
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn from_config(config: AcquisitionConfig) -> Result<Self, FetchError> {
        let client = AsyncReqwestClient::with_timeout(config.timeout())?;
        let kind = config.effective_rate_limiter();
        if kind != config.rate_limiter() {
            info!(
                configured = %config.rate_limiter(),
                using = %kind,
                concurrency = config.concurrency(),
                "Rate limiter switched for concurrent acquisition"
            );
        }
        let limiter = ConfiguredLimiter::new(kind, config.request_interval());
        Ok(Self::new(AsyncMapBoxProvider::new(client), limiter, config))
    }
}

impl<P: AsyncProvider, L: RateLimiter> AcquisitionOrchestrator<P, L> {
    /// Creates an orchestrator from its collaborators.
    pub fn new(provider: P, limiter: L, config: AcquisitionConfig) -> Self {
        Self {
            provider,
            limiter,
            config,
        }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn limiter(&self) -> &L {
        &self.limiter
    }

    /// Acquires every record of `split` into `{base_dir}/images/{split}`.
    pub async fn acquire_split(&self, split: &str, records: &[Record]) -> AcquisitionSummary {
        let store = AssetStore::for_split(self.config.base_dir(), split);
        self.acquire_into(split, &store, records).await
    }

    /// Acquires `records` into an explicit store.
    ///
    /// Outcomes are returned in record order, whatever the concurrency.
    pub async fn acquire_into(
        &self,
        split: &str,
        store: &AssetStore,
        records: &[Record],
    ) -> AcquisitionSummary {
        let output_dir = store.directory().to_path_buf();
        info!(
            split = split,
            records = records.len(),
            provider = self.provider.name(),
            concurrency = self.config.concurrency(),
            output_dir = %output_dir.display(),
            "Starting acquisition"
        );

        if let Err(e) = store.ensure_directory().await {
            warn!(split = split, error = %e, "Could not create output directory");
        }

        let claims = DashSet::new();
        let processed = AtomicUsize::new(0);
        let total = records.len();

        let outcomes: Vec<DownloadOutcome> = stream::iter(records)
            .map(|record| self.process_record(store, record, &claims))
            .buffered(self.config.concurrency())
            .inspect(|_| {
                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_LOG_INTERVAL == 0 || done == total {
                    info!(split = split, processed = done, total = total, "Acquisition progress");
                }
            })
            .collect()
            .await;

        let summary = AcquisitionSummary {
            split: split.to_string(),
            output_dir,
            outcomes,
        };

        info!(
            split = split,
            downloaded = summary.downloaded(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "{}",
            summary
        );

        summary
    }

    async fn process_record(
        &self,
        store: &AssetStore,
        record: &Record,
        claims: &DashSet<RecordId>,
    ) -> DownloadOutcome {
        let id = &record.id;

        // One attempt per identifier per run, even when rows repeat.
        if !claims.insert(id.clone()) {
            debug!(id = %id, "Identifier already handled in this run");
            return DownloadOutcome::duplicate(id);
        }

        match store.contains(id).await {
            Ok(true) => {
                debug!(id = %id, "Asset exists, skipping");
                if self.config.throttle_skipped() {
                    self.limiter.acquire().await;
                    self.limiter.complete().await;
                }
                return DownloadOutcome::skipped(id);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(id = %id, error = %e, "Cannot resolve asset path");
                return DownloadOutcome::failed(id, e);
            }
        }

        let request = FetchRequest::resolve(
            record.latitude,
            record.longitude,
            self.config.imagery(),
            self.config.access_token(),
        );

        self.limiter.acquire().await;
        let outcome = match self.provider.fetch(&request).await {
            Ok(bytes) => match store.write(id, bytes).await {
                Ok(_) => DownloadOutcome::success(id),
                Err(e) => {
                    warn!(id = %id, error = %e, "Failed to persist asset");
                    DownloadOutcome::failed(id, e)
                }
            },
            Err(e) => {
                warn!(id = %id, error = %e, "Fetch failed");
                DownloadOutcome::failed(id, e)
            }
        };
        self.limiter.complete().await;

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::OutcomeStatus;
    use crate::provider::{FetchError, MockAsyncHttpClient};
    use crate::rate_limit::{FixedDelayLimiter, TokenBucketLimiter};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::Instant;

    /// Provider returning a payload and recording coordinates it was asked for.
    struct RecordingProvider {
        requests: Mutex<Vec<(f64, f64)>>,
        arrivals: Mutex<Vec<Instant>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        delay: Duration,
    }

    impl RecordingProvider {
        fn new(delay: Duration) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                arrivals: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                delay,
            }
        }
    }

    impl AsyncProvider for RecordingProvider {
        async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
            self.arrivals.lock().unwrap().push(Instant::now());
            self.requests
                .lock()
                .unwrap()
                .push((request.latitude, request.longitude));
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![0xFF, 0xD8])
        }

        fn name(&self) -> &str {
            "Recording"
        }
    }

    fn config(temp_dir: &TempDir) -> AcquisitionConfig {
        AcquisitionConfig::new(Some("pk.test".to_string()))
            .unwrap()
            .with_base_dir(temp_dir.path())
    }

    fn assert_spaced(arrivals: &[Instant], interval: Duration) {
        for pair in arrivals.windows(2) {
            assert!(
                pair[1] - pair[0] >= interval,
                "requests {:?} apart, expected at least {:?}",
                pair[1] - pair[0],
                interval
            );
        }
    }

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new(format!("r{}", i), i as f64, -(i as f64)))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_after_each_attempt() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = AcquisitionOrchestrator::new(
            RecordingProvider::new(Duration::ZERO),
            FixedDelayLimiter::new(Duration::from_millis(200)),
            config(&temp_dir),
        );
        let start = Instant::now();

        let summary = orchestrator.acquire_split("train", &records(3)).await;

        assert_eq!(summary.downloaded(), 3);
        assert_eq!(orchestrator.limiter().pauses(), 3);
        assert!(start.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_skipped_records_not_throttled_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = AcquisitionOrchestrator::new(
            RecordingProvider::new(Duration::ZERO),
            FixedDelayLimiter::new(Duration::from_millis(200)),
            config(&temp_dir),
        );
        let recs = records(2);
        orchestrator.acquire_split("train", &recs).await;
        let pauses_after_first_run = orchestrator.limiter().pauses();

        let start = Instant::now();
        let summary = orchestrator.acquire_split("train", &recs).await;

        assert_eq!(summary.skipped(), 2);
        assert_eq!(orchestrator.limiter().pauses(), pauses_after_first_run);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skipped_records_throttled_when_configured() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = AcquisitionOrchestrator::new(
            RecordingProvider::new(Duration::ZERO),
            FixedDelayLimiter::new(Duration::from_millis(200)),
            config(&temp_dir).with_throttle_skipped(true),
        );
        let recs = records(2);
        orchestrator.acquire_split("train", &recs).await;

        let start = Instant::now();
        let summary = orchestrator.acquire_split("train", &recs).await;

        assert_eq!(summary.skipped(), 2);
        assert_eq!(orchestrator.limiter().pauses(), 4);
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_request_uses_record_coordinates() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = AcquisitionOrchestrator::new(
            RecordingProvider::new(Duration::ZERO),
            FixedDelayLimiter::new(Duration::ZERO),
            config(&temp_dir),
        );

        orchestrator
            .acquire_split("test", &[Record::new("h1", 47.5, -122.25)])
            .await;

        let requests = orchestrator.provider().requests.lock().unwrap().clone();
        assert_eq!(requests, vec![(47.5, -122.25)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = AcquisitionOrchestrator::new(
            RecordingProvider::new(Duration::from_millis(50)),
            FixedDelayLimiter::new(Duration::ZERO),
            config(&temp_dir),
        );

        orchestrator.acquire_split("train", &records(5)).await;
        assert_eq!(orchestrator.provider().peak_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_concurrency_keeps_order() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = AcquisitionOrchestrator::new(
            RecordingProvider::new(Duration::from_millis(50)),
            TokenBucketLimiter::new(Duration::ZERO, 1),
            config(&temp_dir).with_concurrency(3),
        );
        let recs = records(9);

        let summary = orchestrator.acquire_split("train", &recs).await;

        let peak = orchestrator.provider().peak_in_flight.load(Ordering::SeqCst);
        assert!(peak > 1 && peak <= 3, "peak in flight {}", peak);
        assert_eq!(summary.downloaded(), 9);
        let ids: Vec<_> = summary.outcomes.iter().map(|o| o.id.clone()).collect();
        let expected: Vec<_> = recs.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_duplicate_rows_fetched_once() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = AcquisitionOrchestrator::new(
            RecordingProvider::new(Duration::ZERO),
            FixedDelayLimiter::new(Duration::ZERO),
            config(&temp_dir).with_concurrency(2),
        );
        let recs = vec![Record::new("same", 1.0, 1.0), Record::new("same", 1.0, 1.0)];

        let summary = orchestrator.acquire_split("train", &recs).await;

        assert_eq!(orchestrator.provider().requests.lock().unwrap().len(), 1);
        assert_eq!(summary.downloaded(), 1);
        assert_eq!(summary.duplicates(), 1);
        assert_eq!(summary.skipped(), 0);
    }

    #[tokio::test]
    async fn test_repeat_of_failed_identifier_is_not_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let provider =
            AsyncMapBoxProvider::new(MockAsyncHttpClient::new(Err(FetchError::Status(500))));
        let orchestrator = AcquisitionOrchestrator::new(
            provider,
            FixedDelayLimiter::new(Duration::ZERO),
            config(&temp_dir),
        );
        let recs = vec![Record::new("same", 1.0, 1.0), Record::new("same", 1.0, 1.0)];

        let summary = orchestrator.acquire_split("train", &recs).await;

        assert!(matches!(summary.outcomes[0].status, OutcomeStatus::Failed(_)));
        assert_eq!(summary.outcomes[1].status, OutcomeStatus::Duplicate);
        assert_eq!(summary.skipped(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_holds_rate_under_concurrency() {
        let temp_dir = TempDir::new().unwrap();
        let interval = Duration::from_millis(200);
        let orchestrator = AcquisitionOrchestrator::new(
            RecordingProvider::new(Duration::ZERO),
            FixedDelayLimiter::new(interval),
            config(&temp_dir).with_concurrency(4),
        );

        let summary = orchestrator.acquire_split("train", &records(8)).await;

        assert_eq!(summary.downloaded(), 8);
        let arrivals = orchestrator.provider().arrivals.lock().unwrap().clone();
        assert_eq!(arrivals.len(), 8);
        assert_spaced(&arrivals, interval);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_limiter_holds_rate_under_concurrency() {
        let temp_dir = TempDir::new().unwrap();
        let interval = Duration::from_millis(200);
        let config = config(&temp_dir)
            .with_request_interval(interval)
            .with_concurrency(4);
        let limiter = ConfiguredLimiter::new(config.effective_rate_limiter(), interval);
        let orchestrator = AcquisitionOrchestrator::new(
            RecordingProvider::new(Duration::from_millis(500)),
            limiter,
            config,
        );

        let summary = orchestrator.acquire_split("train", &records(8)).await;

        assert_eq!(summary.downloaded(), 8);
        let arrivals = orchestrator.provider().arrivals.lock().unwrap().clone();
        assert_spaced(&arrivals, interval);
        // Slow fetches still overlap while their starts stay spaced
        let peak = orchestrator.provider().peak_in_flight.load(Ordering::SeqCst);
        assert!(peak > 1, "peak in flight {}", peak);
    }

    #[tokio::test]
    async fn test_unsafe_identifier_fails_without_fetch() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = AcquisitionOrchestrator::new(
            RecordingProvider::new(Duration::ZERO),
            FixedDelayLimiter::new(Duration::ZERO),
            config(&temp_dir),
        );

        let summary = orchestrator
            .acquire_split("train", &[Record::new("../x", 0.0, 0.0)])
            .await;

        assert!(matches!(summary.outcomes[0].status, OutcomeStatus::Failed(_)));
        assert!(orchestrator.provider().requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mapbox_provider_failure_absorbed() {
        let temp_dir = TempDir::new().unwrap();
        let provider =
            AsyncMapBoxProvider::new(MockAsyncHttpClient::new(Err(FetchError::Status(401))));
        let orchestrator = AcquisitionOrchestrator::new(
            provider,
            FixedDelayLimiter::new(Duration::ZERO),
            config(&temp_dir),
        );

        let summary = orchestrator.acquire_split("train", &records(2)).await;

        assert_eq!(summary.failed(), 2);
        assert_eq!(
            summary.to_string(),
            format!(
                "0 images downloaded to {}",
                temp_dir.path().join("images/train").display()
            )
        );
    }

    #[tokio::test]
    async fn test_from_config_builds_configured_limiter() {
        let config = AcquisitionConfig::new(Some("pk.test".to_string()))
            .unwrap()
            .with_rate_limiter(crate::rate_limit::RateLimiterKind::TokenBucket);
        let orchestrator = MapBoxOrchestrator::from_config(config).unwrap();

        assert!(matches!(orchestrator.limiter(), ConfiguredLimiter::TokenBucket(_)));
        assert_eq!(orchestrator.provider().name(), "MapBox");
    }

    #[tokio::test]
    async fn test_from_config_uses_token_bucket_for_concurrency() {
        let config = AcquisitionConfig::new(Some("pk.test".to_string()))
            .unwrap()
            .with_concurrency(4);
        let orchestrator = MapBoxOrchestrator::from_config(config).unwrap();

        assert!(matches!(orchestrator.limiter(), ConfiguredLimiter::TokenBucket(_)));
    }
}
