use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::rate_limit::RateLimiter;
use super::stats::RetryStatistics;
use super::types::{Attempt, RetryError};
use crate::config::RetryConfig;
use crate::metrics::MetricsRecorder;

const MIN_INTERVAL_SECS: f64 = 0.1;
const JITTER_FRACTION: f64 = 0.1;

/// Something the scheduler can invoke repeatedly.
///
/// Closures returning a future implement this directly; stateful operations
/// that borrow a page adapter implement it by hand.
#[async_trait]
pub trait Operation<T: Send + 'static>: Send {
    async fn attempt(&mut self) -> Attempt<T>;
}

#[async_trait]
impl<T, F, Fut> Operation<T> for F
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Attempt<T>> + Send + 'static,
{
    async fn attempt(&mut self) -> Attempt<T> {
        (self)().await
    }
}

/// `base_interval` scaled by a uniform factor in [0.9, 1.1], never below 100ms.
/// Non-finite or out-of-range intervals fall back to the 100ms floor.
pub fn apply_jitter(base_interval: f64) -> Duration {
    let floor = Duration::from_secs_f64(MIN_INTERVAL_SECS);
    if !base_interval.is_finite() {
        return floor;
    }
    let jitter = base_interval * rand::rng().random_range(-JITTER_FRACTION..=JITTER_FRACTION);
    Duration::try_from_secs_f64((base_interval + jitter).max(MIN_INTERVAL_SECS)).unwrap_or(floor)
}

pub struct RetryScheduler {
    config: RetryConfig,
    stats: RetryStatistics,
    limiter: RateLimiter,
    metrics: MetricsRecorder,
    cancel: CancellationToken,
    last_attempt_start: Option<Instant>,
}

impl RetryScheduler {
    pub fn new(config: RetryConfig, metrics: MetricsRecorder, cancel: CancellationToken) -> Self {
        Self {
            limiter: RateLimiter::new(config.max_attempts_per_minute),
            config,
            stats: RetryStatistics::default(),
            metrics,
            cancel,
            last_attempt_start: None,
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn statistics(&self) -> &RetryStatistics {
        &self.stats
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut MetricsRecorder {
        &mut self.metrics
    }

    fn has_attempts_left(&self) -> bool {
        self.config.is_unbounded() || self.stats.total_attempts < u64::from(self.config.max_retries)
    }

    fn mark_cancelled(&mut self) {
        tracing::info!(
            target: "sniper.retry",
            attempts = self.stats.total_attempts,
            "retry loop cancelled"
        );
        self.metrics.update_state("cancelled");
    }

    /// Invoke `operation` until it succeeds, attempts run out, the run is
    /// cancelled, or recovery escalates to user intervention.
    ///
    /// `Ok(Some(v))` on success, `Ok(None)` on exhaustion or cancellation.
    pub async fn execute_with_retry<T, O>(
        &mut self,
        operation: &mut O,
    ) -> Result<Option<T>, RetryError>
    where
        T: Send + 'static,
        O: Operation<T> + ?Sized,
    {
        self.stats = RetryStatistics::default();
        self.last_attempt_start = None;
        let cancel = self.cancel.clone();

        while self.has_attempts_left() {
            if cancel.is_cancelled() || !self.limiter.acquire(&cancel).await {
                self.mark_cancelled();
                return Ok(None);
            }

            let started = Instant::now();
            if let Some(prev) = self.last_attempt_start.replace(started) {
                self.stats.attempt_intervals.push(started.duration_since(prev));
            }

            self.stats.total_attempts += 1;
            let attempt_no = self.stats.total_attempts;
            self.metrics.update_retry_count(attempt_no);
            tracing::debug!(target: "sniper.retry", attempt = attempt_no, "starting attempt");

            let outcome = operation.attempt().await;
            let elapsed = started.elapsed();

            // Failures caused by a shutdown mid-attempt are not the operation's fault.
            if cancel.is_cancelled() && !outcome.is_success() {
                self.mark_cancelled();
                return Ok(None);
            }

            match outcome {
                Attempt::Success(value) => {
                    self.stats.record_success();
                    self.metrics.record_attempt(true, elapsed);
                    self.metrics.update_state("completed");
                    tracing::info!(
                        target: "sniper.retry",
                        attempt = attempt_no,
                        elapsed_secs = elapsed.as_secs_f64(),
                        "operation succeeded"
                    );
                    return Ok(Some(value));
                }
                Attempt::Failed => {
                    self.stats.record_failure();
                    self.metrics.record_attempt(false, elapsed);
                    self.metrics.update_state("failed");
                    tracing::info!(target: "sniper.retry", attempt = attempt_no, "attempt failed");
                }
                Attempt::Error(e) => {
                    self.stats.record_failure();
                    self.metrics.record_attempt(false, elapsed);
                    self.metrics.record_error(e.kind());
                    self.metrics.update_state("error");
                    tracing::warn!(
                        target: "sniper.retry",
                        attempt = attempt_no,
                        error_type = e.kind(),
                        error = %e.message(),
                        "attempt raised an error"
                    );
                }
                Attempt::Fatal(e) => {
                    self.stats.record_failure();
                    self.metrics.record_attempt(false, elapsed);
                    self.metrics.record_error("FatalRecoveryError");
                    self.metrics.update_state("intervention");
                    tracing::error!(
                        target: "sniper.retry",
                        attempt = attempt_no,
                        error = %e,
                        "recovery exhausted, user intervention required"
                    );
                    return Err(RetryError::Intervention(e));
                }
            }

            if !self.has_attempts_left() {
                break;
            }

            let interval = apply_jitter(self.config.base_interval);
            tracing::debug!(
                target: "sniper.retry",
                wait_secs = interval.as_secs_f64(),
                "waiting before next attempt"
            );
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.mark_cancelled();
                    return Ok(None);
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        tracing::warn!(
            target: "sniper.retry",
            attempts = self.stats.total_attempts,
            "maximum retries reached"
        );
        self.metrics.update_state("stopped");
        Ok(None)
    }
}
