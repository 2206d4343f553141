//! # Degrading Fetcher
//!
//! Bounded retry of a live data source, then one call to a local fallback.
//!
//! ## Attempt Timeline (max_retries = 2, linear backoff)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  t=0s   primary() ── fail                                              │
//! │         sleep 1 × step                                                 │
//! │  t=1s   primary() ── fail                                              │
//! │         sleep 2 × step                                                 │
//! │  t=3s   primary() ── fail          (no sleep after the last attempt)   │
//! │         fallback() ── Ok(local)    → FetchOutcome { degraded: true }   │
//! │                                                                         │
//! │  Any primary success returns immediately with degraded = false.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Backoff
//! `Linear` multiplies the step by the attempt number. `Exponential` uses
//! `backoff::ExponentialBackoff` with no jitter, doubling from `initial`
//! up to `max`.
//!
//! The fetcher never panics or propagates; when both sides fail the
//! fallback's error is returned in `FetchOutcome::value`.

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracker_core::{Analytics, RefreshError};

use crate::stores::{LiveAnalyticsSource, LocalAnalyticsFallback};

// =============================================================================
// Settings
// =============================================================================

/// Delay policy between primary attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Delay after attempt `n` is `n × step`.
    Linear { step: Duration },

    /// Delay doubles from `initial`, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy::Linear {
            step: Duration::from_millis(1000),
        }
    }
}

impl BackoffPolicy {
    fn schedule(&self) -> RetryDelays {
        match *self {
            BackoffPolicy::Linear { step } => RetryDelays::Linear { step, attempt: 0 },
            BackoffPolicy::Exponential { initial, max } => {
                RetryDelays::Exponential(ExponentialBackoff {
                    current_interval: initial,
                    initial_interval: initial,
                    max_interval: max,
                    multiplier: 2.0,
                    randomization_factor: 0.0,
                    max_elapsed_time: None,
                    ..Default::default()
                })
            }
        }
    }
}

enum RetryDelays {
    Linear { step: Duration, attempt: u32 },
    Exponential(ExponentialBackoff),
}

impl RetryDelays {
    fn next_delay(&mut self) -> Duration {
        match self {
            RetryDelays::Linear { step, attempt } => {
                *attempt += 1;
                *step * *attempt
            }
            RetryDelays::Exponential(backoff) => {
                let delay = backoff.next_backoff().unwrap_or(backoff.max_interval);
                // whole milliseconds; the crate's interval math adds sub-ms noise
                Duration::from_millis(delay.as_millis() as u64)
            }
        }
    }
}

/// Fetcher tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherSettings {
    /// Retries after the first primary failure.
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        FetcherSettings {
            max_retries: 2,
            backoff: BackoffPolicy::default(),
        }
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of a fetch, with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome<T> {
    /// Primary value, fallback value, or the fallback's error.
    pub value: Result<T, RefreshError>,

    /// True when the value came from (or the error is from) the fallback.
    pub degraded: bool,

    /// Number of primary calls made.
    pub attempts: u32,
}

impl<T> FetchOutcome<T> {
    pub fn into_result(self) -> Result<T, RefreshError> {
        self.value
    }
}

// =============================================================================
// Degrading Fetcher
// =============================================================================

/// Retries a live source and degrades to a fallback.
#[derive(Debug, Clone, Default)]
pub struct DegradingFetcher {
    settings: FetcherSettings,
}

impl DegradingFetcher {
    pub fn new(settings: FetcherSettings) -> Self {
        DegradingFetcher { settings }
    }

    pub fn settings(&self) -> &FetcherSettings {
        &self.settings
    }

    /// Fetches with the configured retry budget.
    pub async fn fetch_with_fallback<T, P, PFut, F, FFut>(
        &self,
        primary: P,
        fallback: F,
    ) -> FetchOutcome<T>
    where
        P: FnMut() -> PFut,
        PFut: Future<Output = Result<T, RefreshError>>,
        F: FnOnce() -> FFut,
        FFut: Future<Output = Result<T, RefreshError>>,
    {
        self.fetch_with_retries(self.settings.max_retries, primary, fallback)
            .await
    }

    /// Fetches with an explicit retry budget.
    ///
    /// `primary` is called at most `max_retries + 1` times; `fallback` at
    /// most once, and only when every primary call failed.
    pub async fn fetch_with_retries<T, P, PFut, F, FFut>(
        &self,
        max_retries: u32,
        mut primary: P,
        fallback: F,
    ) -> FetchOutcome<T>
    where
        P: FnMut() -> PFut,
        PFut: Future<Output = Result<T, RefreshError>>,
        F: FnOnce() -> FFut,
        FFut: Future<Output = Result<T, RefreshError>>,
    {
        let total = max_retries.saturating_add(1);
        let mut delays = self.settings.backoff.schedule();

        for attempt in 1..=total {
            match primary().await {
                Ok(value) => {
                    debug!(attempt, "Primary fetch succeeded");
                    return FetchOutcome {
                        value: Ok(value),
                        degraded: false,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    warn!(attempt, of = total, kind = %e.kind, error = %e, "Primary fetch failed");
                    if attempt < total {
                        let delay = delays.next_delay();
                        debug!(?delay, "Waiting before retry");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        info!(attempts = total, "Primary exhausted, using fallback");

        let value = fallback().await;
        if let Err(ref e) = value {
            warn!(kind = %e.kind, error = %e, "Fallback fetch failed");
        }

        FetchOutcome {
            value,
            degraded: true,
            attempts: total,
        }
    }

    /// Live analytics with local fallback.
    pub async fn fetch_analytics(
        &self,
        live: &dyn LiveAnalyticsSource,
        fallback: &dyn LocalAnalyticsFallback,
    ) -> FetchOutcome<Analytics> {
        self.fetch_with_fallback(
            || live.fetch_safe(),
            || async move { Ok(fallback.compute()) },
        )
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::LocalAnalytics;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;
    use tracker_core::AnalyticsSource;

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_primary_calls_fallback_once() {
        let fetcher = DegradingFetcher::default();
        let primary_calls = counter();
        let fallback_calls = counter();
        let started = Instant::now();

        let outcome = fetcher
            .fetch_with_fallback(
                || {
                    let calls = primary_calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<u32, _>(RefreshError::network("network unreachable"))
                    }
                },
                || {
                    let calls = fallback_calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(7)
                    }
                },
            )
            .await;

        assert_eq!(primary_calls.load(Ordering::SeqCst), 3);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.value, Ok(7));
        assert!(outcome.degraded);
        assert_eq!(outcome.attempts, 3);
        // 1s + 2s, no sleep after the final failure.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_retry() {
        let fetcher = DegradingFetcher::default();
        let primary_calls = counter();
        let fallback_calls = counter();
        let started = Instant::now();

        let outcome = fetcher
            .fetch_with_fallback(
                || {
                    let calls = primary_calls.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err(RefreshError::timeout("timeout"))
                        } else {
                            Ok("live")
                        }
                    }
                },
                || {
                    let calls = fallback_calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok("local")
                    }
                },
            )
            .await;

        assert_eq!(outcome.value, Ok("live"));
        assert!(!outcome.degraded);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_failing_returns_fallback_error() {
        let fetcher = DegradingFetcher::default();

        let outcome = fetcher
            .fetch_with_retries(
                0,
                || async { Err::<(), _>(RefreshError::network("down")) },
                || async { Err(RefreshError::permission("permission denied")) },
            )
            .await;

        assert_eq!(outcome.attempts, 1);
        assert!(outcome.degraded);
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.kind, tracker_core::ErrorKind::Permission);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_backoff_is_capped() {
        let fetcher = DegradingFetcher::new(FetcherSettings {
            max_retries: 3,
            backoff: BackoffPolicy::Exponential {
                initial: Duration::from_millis(100),
                max: Duration::from_millis(250),
            },
        });
        let started = Instant::now();

        let outcome = fetcher
            .fetch_with_fallback(
                || async { Err::<(), _>(RefreshError::timeout("timeout")) },
                || async { Ok(()) },
            )
            .await;

        assert_eq!(outcome.attempts, 4);
        // 100 + 200 + 250
        assert_eq!(started.elapsed(), Duration::from_millis(550));
    }

    struct DownLive;

    #[async_trait]
    impl LiveAnalyticsSource for DownLive {
        async fn fetch_safe(&self) -> Result<Analytics, RefreshError> {
            Err(RefreshError::from_message("Network request failed"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_analytics_degrades_to_local() {
        let fetcher = DegradingFetcher::default();
        let local = LocalAnalytics::default();

        let outcome = fetcher.fetch_analytics(&DownLive, &local).await;

        assert!(outcome.degraded);
        let analytics = outcome.value.unwrap();
        assert_eq!(analytics.source, AnalyticsSource::Local);
        assert_eq!(analytics.total, 0);
    }
}
