//! Request rate limiting.
//!
//! The orchestrator never talks to the imagery service faster than its rate
//! limiter allows. Two strategies are provided:
//!
//! - [`FixedDelayLimiter`]: one request at a time, followed by a fixed pause.
//!   The gate is held from `acquire` until the pause in `complete` ends, so
//!   the call rate stays at or below `1 / interval` however many workers
//!   share it.
//! - [`TokenBucketLimiter`]: a bucket refilled at `1 / interval` tokens per
//!   second with a configurable burst. Requests from concurrent workers may
//!   overlap while their starts stay spaced.
//!
//! # Usage
//!
//! ```ignore
//! let limiter = FixedDelayLimiter::new(Duration::from_millis(200));
//!
//! limiter.acquire().await;   // before the request
//! let result = provider.fetch(&request).await;
//! limiter.complete().await;  // after the request, success or not
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use tracing::trace;

/// Default spacing between requests.
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(200);

/// Paces outbound requests.
///
/// Every `complete` must follow exactly one `acquire`.
pub trait RateLimiter: Send + Sync {
    /// Waits until the next request may be issued.
    fn acquire(&self) -> impl Future<Output = ()> + Send;

    /// Signals that a request attempt has finished.
    fn complete(&self) -> impl Future<Output = ()> + Send;
}

/// Admits one request at a time and sleeps a fixed interval after each.
#[derive(Debug)]
pub struct FixedDelayLimiter {
    interval: Duration,
    pauses: AtomicUsize,
    gate: Semaphore,
}

impl FixedDelayLimiter {
    /// Creates a limiter pausing `interval` after each attempt.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pauses: AtomicUsize::new(0),
            gate: Semaphore::new(1),
        }
    }

    /// Interval slept after each attempt.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of pauses taken so far.
    pub fn pauses(&self) -> usize {
        self.pauses.load(Ordering::Relaxed)
    }
}

impl Default for FixedDelayLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_INTERVAL)
    }
}

impl RateLimiter for FixedDelayLimiter {
    async fn acquire(&self) {
        // The semaphore is never closed; the permit is handed back in `complete`
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
    }

    async fn complete(&self) {
        self.pauses.fetch_add(1, Ordering::Relaxed);
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
        self.gate.add_permits(1);
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket refilled at a steady rate.
#[derive(Debug)]
pub struct TokenBucketLimiter {
    interval: Duration,
    burst: u32,
    bucket: Mutex<Bucket>,
}

impl TokenBucketLimiter {
    /// Creates a bucket granting one token per `interval`, holding at most
    /// `burst` tokens. The bucket starts full.
    ///
    /// # Panics
    ///
    /// Panics if `burst` is 0.
    pub fn new(interval: Duration, burst: u32) -> Self {
        assert!(burst > 0, "burst must be > 0");

        Self {
            interval,
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Steady-state spacing between tokens.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Maximum number of tokens held.
    pub fn burst(&self) -> u32 {
        self.burst
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        if self.interval.is_zero() {
            bucket.tokens = self.burst as f64;
        } else {
            let elapsed = now.duration_since(bucket.last_refill);
            let earned = elapsed.as_secs_f64() / self.interval.as_secs_f64();
            bucket.tokens = (bucket.tokens + earned).min(self.burst as f64);
        }
        bucket.last_refill = now;
    }
}

impl RateLimiter for TokenBucketLimiter {
    async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                self.refill(&mut bucket, Instant::now());

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }

                self.interval.mul_f64(1.0 - bucket.tokens)
            };

            trace!(wait_ms = wait.as_millis() as u64, "Waiting for rate limit token");
            tokio::time::sleep(wait).await;
        }
    }

    async fn complete(&self) {}
}

/// Which limiter strategy to build from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimiterKind {
    /// Pause after each attempt
    #[default]
    FixedDelay,
    /// Shared token bucket
    TokenBucket,
}

impl std::str::FromStr for RateLimiterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" | "fixed_delay" => Ok(RateLimiterKind::FixedDelay),
            "token_bucket" | "bucket" => Ok(RateLimiterKind::TokenBucket),
            other => Err(format!("unknown rate limiter '{}'", other)),
        }
    }
}

impl std::fmt::Display for RateLimiterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateLimiterKind::FixedDelay => f.write_str("fixed"),
            RateLimiterKind::TokenBucket => f.write_str("token_bucket"),
        }
    }
}

/// A limiter chosen at runtime.
#[derive(Debug)]
pub enum ConfiguredLimiter {
    FixedDelay(FixedDelayLimiter),
    TokenBucket(TokenBucketLimiter),
}

impl ConfiguredLimiter {
    /// Builds a limiter of `kind` enforcing one request per `interval`.
    ///
    /// Token buckets get a burst of 1 so the steady-state rate matches the
    /// fixed delay strategy.
    pub fn new(kind: RateLimiterKind, interval: Duration) -> Self {
        match kind {
            RateLimiterKind::FixedDelay => {
                ConfiguredLimiter::FixedDelay(FixedDelayLimiter::new(interval))
            }
            RateLimiterKind::TokenBucket => {
                ConfiguredLimiter::TokenBucket(TokenBucketLimiter::new(interval, 1))
            }
        }
    }
}

impl RateLimiter for ConfiguredLimiter {
    async fn acquire(&self) {
        match self {
            ConfiguredLimiter::FixedDelay(l) => l.acquire().await,
            ConfiguredLimiter::TokenBucket(l) => l.acquire().await,
        }
    }

    async fn complete(&self) {
        match self {
            ConfiguredLimiter::FixedDelay(l) => l.complete().await,
            ConfiguredLimiter::TokenBucket(l) => l.complete().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_pauses_after_attempt() {
        let limiter = FixedDelayLimiter::new(Duration::from_millis(200));
        let start = Instant::now();

        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.complete().await;
        assert_eq!(start.elapsed(), Duration::from_millis(200));
        assert_eq!(limiter.pauses(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_zero_interval() {
        let limiter = FixedDelayLimiter::new(Duration::ZERO);
        let start = Instant::now();

        for _ in 0..2 {
            limiter.acquire().await;
            limiter.complete().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.pauses(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_serializes_shared_workers() {
        let limiter = std::sync::Arc::new(FixedDelayLimiter::new(Duration::from_millis(200)));
        let starts = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = limiter.clone();
                let starts = starts.clone();
                tokio::spawn(async move {
                    limiter.acquire().await;
                    starts.lock().unwrap().push(Instant::now());
                    limiter.complete().await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let mut starts = starts.lock().unwrap().clone();
        starts.sort();
        assert_eq!(starts.len(), 4);
        for pair in starts.windows(2) {
            assert!(
                pair[1] - pair[0] >= Duration::from_millis(200),
                "requests {:?} apart",
                pair[1] - pair[0]
            );
        }
        assert_eq!(limiter.pauses(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_bucket_spaces_requests() {
        let limiter = TokenBucketLimiter::new(Duration::from_millis(200), 1);
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        // First token is free, the remaining four each wait one interval
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(800), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1000), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_bucket_burst() {
        let limiter = TokenBucketLimiter::new(Duration::from_secs(1), 3);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_bucket_shared_between_tasks() {
        let limiter = std::sync::Arc::new(TokenBucketLimiter::new(Duration::from_millis(100), 1));
        let start = Instant::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[test]
    #[should_panic(expected = "burst must be > 0")]
    fn test_token_bucket_zero_burst_panics() {
        TokenBucketLimiter::new(Duration::from_millis(1), 0);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("fixed".parse(), Ok(RateLimiterKind::FixedDelay));
        assert_eq!("Token_Bucket".parse(), Ok(RateLimiterKind::TokenBucket));
        assert!("leaky".parse::<RateLimiterKind>().is_err());
        assert_eq!(RateLimiterKind::TokenBucket.to_string(), "token_bucket");
    }

    #[test]
    fn test_configured_limiter_kind() {
        let limiter = ConfiguredLimiter::new(RateLimiterKind::TokenBucket, Duration::from_millis(5));
        assert!(matches!(limiter, ConfiguredLimiter::TokenBucket(ref l) if l.burst() == 1));
    }
}
