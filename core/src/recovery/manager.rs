use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::types::{ErrorCategory, FatalRecoveryError, RecoveryLevel, RecoveryState};
use crate::config::RecoveryConfig;
use crate::driver::{BrowserDriver, BrowserRestart, DriverError};

/// Progressive error recovery bound to one browser session.
///
/// Each call to [`execute_recovery`](Self::execute_recovery) performs the
/// action for the current level (wait, refresh, restart) and escalates once
/// that level's budget is spent. Reaching
/// [`RecoveryLevel::UserIntervention`] turns every further call into a
/// [`FatalRecoveryError`]. Callers reset the manager after any success.
///
/// Once the session token is cancelled no recovery action runs: delays are
/// cut short, the browser is neither refreshed nor restarted, and every call
/// returns `Ok(false)`.
pub struct RecoveryManager {
    driver: Arc<dyn BrowserDriver>,
    restart: Option<Arc<dyn BrowserRestart>>,
    delays: RecoveryConfig,
    state: RecoveryState,
    cancel: CancellationToken,
}

impl RecoveryManager {
    pub fn new(driver: Arc<dyn BrowserDriver>, delays: RecoveryConfig) -> Self {
        Self {
            driver,
            restart: None,
            delays,
            state: RecoveryState::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn with_restart(mut self, restart: Arc<dyn BrowserRestart>) -> Self {
        self.restart = Some(restart);
        self
    }

    pub fn state(&self) -> &RecoveryState {
        &self.state
    }

    pub fn current_level(&self) -> RecoveryLevel {
        self.state.current_level()
    }

    /// Run the recovery action for `error` at the current level.
    ///
    /// `Ok(true)` means the caller may retry its operation, `Ok(false)` means
    /// this level could not recover (no restart hook, refresh failed).
    pub async fn execute_recovery(
        &mut self,
        error: &DriverError,
    ) -> Result<bool, FatalRecoveryError> {
        if self.is_cancelled() {
            tracing::debug!(target: "sniper.recovery", error = %error, "session cancelled, skipping recovery");
            return Ok(false);
        }
        let started = self.state.mark_started(Instant::now());

        let category = ErrorCategory::classify(error.kind());
        self.state.count_error(category);

        let level = self.state.current_level();
        tracing::error!(
            target: "sniper.recovery",
            error_type = error.kind().as_str(),
            error_message = error.message(),
            classification = category.as_str(),
            recovery_level = level.as_str(),
            attempt = self.state.attempts_at(level) + 1,
            time_in_recovery = started.elapsed().as_secs_f64(),
            "error encountered during checkout"
        );

        let outcome = self.dispatch(level, started).await;

        // Counted even when the level is terminal.
        self.state.count_attempt(level);
        if let Some(next) = self.state.escalate_if_exhausted() {
            tracing::warn!(
                target: "sniper.recovery",
                from = level.as_str(),
                to = next.as_str(),
                error_counts = ?self.state.error_counts(),
                "escalating recovery"
            );
        }

        outcome
    }

    /// Sleep `secs`; `false` if the session was cancelled meanwhile.
    async fn pause(&self, secs: u64) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(Duration::from_secs(secs)) => true,
        }
    }

    async fn dispatch(
        &self,
        level: RecoveryLevel,
        started: Instant,
    ) -> Result<bool, FatalRecoveryError> {
        match level {
            RecoveryLevel::WaitRetry => Ok(self.pause(self.delays.wait_delay_secs).await),
            RecoveryLevel::RefreshRetry => {
                if !self.pause(self.delays.refresh_delay_secs).await {
                    return Ok(false);
                }
                match self.driver.refresh().await {
                    Ok(()) => Ok(true),
                    Err(e) => {
                        tracing::warn!(target: "sniper.recovery", error = %e, "page refresh failed");
                        Ok(false)
                    }
                }
            }
            RecoveryLevel::RestartRetry => {
                if !self.pause(self.delays.restart_delay_secs).await {
                    return Ok(false);
                }
                let Some(restart) = self.restart.as_ref() else {
                    tracing::warn!(target: "sniper.recovery", "no restart hook registered");
                    return Ok(false);
                };
                match restart.restart().await {
                    Ok(()) => Ok(true),
                    Err(e) => {
                        tracing::warn!(target: "sniper.recovery", error = %e, "browser restart failed");
                        Ok(false)
                    }
                }
            }
            RecoveryLevel::UserIntervention => Err(FatalRecoveryError {
                error_counts: self.state.error_counts().clone(),
                elapsed: started.elapsed(),
            }),
        }
    }

    /// Back to the first level with all counters cleared.
    pub fn reset(&mut self) {
        self.state = RecoveryState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverErrorKind, ElementHandle};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingDriver {
        refreshes: AtomicUsize,
    }

    #[async_trait]
    impl BrowserDriver for CountingDriver {
        fn name(&self) -> &str {
            "counting"
        }
        async fn navigate(&self, _url: &str) -> Result<(), DriverError> {
            Ok(())
        }
        async fn find_element(&self, _s: &str) -> Result<Option<ElementHandle>, DriverError> {
            Ok(None)
        }
        async fn find_elements(&self, _s: &str) -> Result<Vec<ElementHandle>, DriverError> {
            Ok(Vec::new())
        }
        async fn click(&self, _e: &ElementHandle) -> Result<(), DriverError> {
            Ok(())
        }
        async fn send_keys(&self, _e: &ElementHandle, _t: &str) -> Result<(), DriverError> {
            Ok(())
        }
        async fn element_text(&self, _e: &ElementHandle) -> Result<String, DriverError> {
            Ok(String::new())
        }
        async fn execute_script(&self, _s: &str, _a: Vec<Value>) -> Result<Value, DriverError> {
            Ok(Value::Null)
        }
        async fn refresh(&self) -> Result<(), DriverError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn quit(&self) -> Result<(), DriverError> {
            Ok(())
        }
    }

    struct CountingRestart(AtomicUsize);

    #[async_trait]
    impl BrowserRestart for CountingRestart {
        async fn restart(&self) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn timeout() -> DriverError {
        DriverError::timeout("element wait timed out")
    }

    #[tokio::test(start_paused = true)]
    async fn escalates_three_two_one_then_requires_intervention() {
        let driver = Arc::new(CountingDriver::default());
        let restart = Arc::new(CountingRestart(AtomicUsize::new(0)));
        let mut manager = RecoveryManager::new(driver.clone(), RecoveryConfig::default())
            .with_restart(restart.clone());

        for _ in 0..3 {
            assert_eq!(manager.current_level(), RecoveryLevel::WaitRetry);
            assert_eq!(manager.execute_recovery(&timeout()).await, Ok(true));
        }
        assert_eq!(manager.current_level(), RecoveryLevel::RefreshRetry);

        for _ in 0..2 {
            assert_eq!(manager.execute_recovery(&timeout()).await, Ok(true));
        }
        assert_eq!(manager.current_level(), RecoveryLevel::RestartRetry);
        assert_eq!(driver.refreshes.load(Ordering::SeqCst), 2);

        assert_eq!(manager.execute_recovery(&timeout()).await, Ok(true));
        assert_eq!(manager.current_level(), RecoveryLevel::UserIntervention);
        assert_eq!(restart.0.load(Ordering::SeqCst), 1);

        let err = manager.execute_recovery(&timeout()).await.unwrap_err();
        assert!(err.to_string().contains("intervention"));
        assert_eq!(err.error_counts.get(&ErrorCategory::Network), Some(&7));
        assert_eq!(manager.current_level(), RecoveryLevel::UserIntervention);
        assert_eq!(manager.state().attempts_at(RecoveryLevel::UserIntervention), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_level_sleeps_the_configured_delay() {
        let mut manager =
            RecoveryManager::new(Arc::new(CountingDriver::default()), RecoveryConfig::default());
        let before = Instant::now();
        manager.execute_recovery(&timeout()).await.unwrap();
        assert!(before.elapsed() >= Duration::from_secs(5));
        assert!(manager.state().recovery_start_time().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_without_hook_reports_failure() {
        let mut manager =
            RecoveryManager::new(Arc::new(CountingDriver::default()), RecoveryConfig::default());
        for _ in 0..5 {
            manager.execute_recovery(&timeout()).await.unwrap();
        }
        assert_eq!(manager.current_level(), RecoveryLevel::RestartRetry);
        assert_eq!(manager.execute_recovery(&timeout()).await, Ok(false));
        assert_eq!(manager.current_level(), RecoveryLevel::UserIntervention);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_cuts_the_delay_and_skips_the_restart() {
        let cancel = CancellationToken::new();
        let restart = Arc::new(CountingRestart(AtomicUsize::new(0)));
        let mut manager =
            RecoveryManager::new(Arc::new(CountingDriver::default()), RecoveryConfig::default())
                .with_restart(restart.clone())
                .with_cancel(cancel.clone());
        for _ in 0..5 {
            assert_eq!(manager.execute_recovery(&timeout()).await, Ok(true));
        }
        assert_eq!(manager.current_level(), RecoveryLevel::RestartRetry);

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            trigger.cancel();
        });
        let before = Instant::now();
        assert_eq!(manager.execute_recovery(&timeout()).await, Ok(false));
        assert!(before.elapsed() < Duration::from_secs(30));
        assert_eq!(restart.0.load(Ordering::SeqCst), 0);

        // Terminal level is never reached through a cancelled session.
        assert_eq!(manager.execute_recovery(&timeout()).await, Ok(false));
        assert_eq!(manager.execute_recovery(&timeout()).await, Ok(false));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_level_and_counts() {
        let mut manager =
            RecoveryManager::new(Arc::new(CountingDriver::default()), RecoveryConfig::default());
        let stale = DriverError::new(DriverErrorKind::StaleElement, "stale");
        for _ in 0..4 {
            manager.execute_recovery(&stale).await.unwrap();
        }
        assert_eq!(manager.current_level(), RecoveryLevel::RefreshRetry);
        assert_eq!(manager.state().error_count(ErrorCategory::Temporary), 4);

        manager.reset();
        assert_eq!(manager.current_level(), RecoveryLevel::WaitRetry);
        for level in RecoveryLevel::ALL {
            assert_eq!(manager.state().attempts_at(level), 0);
        }
        assert!(manager.state().error_counts().values().all(|n| *n == 0));
        assert!(manager.state().recovery_start_time().is_none());
    }
}
