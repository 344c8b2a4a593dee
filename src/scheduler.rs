//! Periodic trigger for the fetcher. Interval and retry policy live here so
//! that a single [`RateFetcher::run`] stays a one-shot invocation.

use crate::core::RateError;
use crate::core::config::ScheduleConfig;
use crate::fetcher::{FetchSummary, RateFetcher};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay`: Pause between attempts
/// - `should_retry`: Decides whether an error is worth another attempt
///
/// # Returns
/// Either the successful result or the last error
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    retries: usize,
    delay: Duration,
    should_retry: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries || !should_retry(&err) {
                    return Err(err);
                }
                warn!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt,
                    retries + 1,
                    err
                );
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Runs the fetcher on a fixed interval until shut down.
pub struct RefreshJob {
    fetcher: RateFetcher,
    interval: Duration,
    retries: usize,
    retry_delay: Duration,
}

impl RefreshJob {
    pub fn new(fetcher: RateFetcher, config: &ScheduleConfig) -> Self {
        Self {
            fetcher,
            interval: config.interval(),
            retries: config.retries,
            retry_delay: config.retry_delay(),
        }
    }

    /// One scheduled tick: the fetch plus whatever retries the policy allows.
    /// Malformed quotes are not retried.
    pub async fn tick(&self) -> Result<FetchSummary, RateError> {
        with_retry(
            || self.fetcher.run(),
            self.retries,
            self.retry_delay,
            RateError::is_transient,
        )
        .await
    }

    /// Ticks immediately, then every interval, until `shutdown` resolves.
    /// A tick in flight, retries included, is dropped on shutdown.
    /// Returns the number of completed ticks.
    pub async fn run_until<S>(&self, shutdown: S) -> usize
    where
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(interval = ?self.interval, "Refresh job started");
        let mut ticks = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = &mut shutdown => {
                            debug!("Shutdown during refresh, abandoning tick");
                            break;
                        }
                        // Failures are already logged by the fetcher.
                        result = self.tick() => {
                            if let Ok(summary) = result {
                                debug!(rate = summary.rate, "Scheduled refresh done");
                            }
                            ticks += 1;
                        }
                    }
                }
            }
        }
        info!(ticks, "Refresh job stopped");
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::test_utils::ScriptedQuotes;
    use crate::store::memory::MemoryCollection;
    use crate::store::settings::KvSettingsStore;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn job_with(quotes: Arc<ScriptedQuotes>, retries: usize, interval_ms: u64) -> RefreshJob {
        let settings = Arc::new(KvSettingsStore::new(Arc::new(MemoryCollection::new())));
        RefreshJob {
            fetcher: RateFetcher::new(quotes, settings),
            interval: Duration::from_millis(interval_ms),
            retries,
            retry_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_after_retries() {
        let mut calls = 0;
        let result: Result<(), String> = with_retry(
            || {
                calls += 1;
                async { Err("boom".to_string()) }
            },
            2,
            Duration::from_millis(1),
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_tick_retries_transient_failures() {
        let quotes = Arc::new(ScriptedQuotes::new(vec![
            Err(RateError::UpstreamUnavailable("HTTP error: 502".to_string())),
            Ok(144.9),
        ]));
        let job = job_with(quotes.clone(), 2, 1000);

        let summary = job.tick().await.unwrap();
        assert!((summary.rate - 1.0 / 144.9).abs() < f64::EPSILON);
        assert_eq!(quotes.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_tick_does_not_retry_malformed_quotes() {
        let quotes = Arc::new(ScriptedQuotes::always(-1.0));
        let job = job_with(quotes.clone(), 5, 1000);

        let result = job.tick().await;
        assert!(matches!(result, Err(RateError::MalformedResponse(_))));
        assert_eq!(quotes.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_until_ticks_immediately_and_stops() {
        let quotes = Arc::new(ScriptedQuotes::always(144.9));
        let job = job_with(quotes.clone(), 0, 60_000);

        let ticks = job
            .run_until(tokio::time::sleep(Duration::from_millis(50)))
            .await;

        assert_eq!(ticks, 1);
        assert_eq!(quotes.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_until_keeps_ticking_after_failures() {
        let quotes = Arc::new(ScriptedQuotes::always(0.0));
        let job = job_with(quotes.clone(), 0, 10);

        let ticks = job
            .run_until(tokio::time::sleep(Duration::from_millis(100)))
            .await;

        assert!(ticks >= 2, "expected several ticks, got {ticks}");
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_retrying_tick() {
        let quotes = Arc::new(ScriptedQuotes::new(vec![Err(
            RateError::UpstreamUnavailable("HTTP error: 503".to_string()),
        )]));
        let settings = Arc::new(KvSettingsStore::new(Arc::new(MemoryCollection::new())));
        let job = RefreshJob {
            fetcher: RateFetcher::new(quotes.clone(), settings),
            interval: Duration::from_secs(60),
            retries: 5,
            retry_delay: Duration::from_secs(60),
        };

        let ticks = tokio::time::timeout(
            Duration::from_secs(5),
            job.run_until(tokio::time::sleep(Duration::from_millis(50))),
        )
        .await
        .expect("shutdown should not wait for the retries");

        assert_eq!(ticks, 0);
        assert_eq!(quotes.calls.load(Ordering::SeqCst), 1);
    }
}
