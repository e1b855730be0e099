use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::driver::{BrowserDriver, BrowserRestart};
use crate::metrics::MetricsRecorder;
use crate::page::PageInteractor;
use crate::recovery::RecoveryManager;
use crate::retry::RetryScheduler;
use crate::shutdown::ShutdownCoordinator;

/// Everything one bot session shares: the validated config and the shutdown
/// coordinator, which owns the current cancellation token. Components are
/// built from here rather than looked up globally.
#[derive(Clone)]
pub struct SessionContext {
    cfg: AppConfig,
    shutdown: Arc<ShutdownCoordinator>,
}

impl SessionContext {
    pub fn new(cfg: AppConfig) -> Self {
        Self {
            cfg,
            shutdown: Arc::new(ShutdownCoordinator::new(CancellationToken::new())),
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    /// Token of the current browser session; replaced after each shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.shutdown.cancel_token()
    }

    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    pub fn metrics_recorder(&self) -> MetricsRecorder {
        if self.cfg.metrics.enabled {
            MetricsRecorder::new(&self.cfg.metrics.path)
        } else {
            MetricsRecorder::in_memory()
        }
    }

    pub fn retry_scheduler(&self) -> RetryScheduler {
        RetryScheduler::new(self.cfg.retry, self.metrics_recorder(), self.cancel_token())
    }

    pub fn recovery_manager(
        &self,
        driver: Arc<dyn BrowserDriver>,
        restart: Option<Arc<dyn BrowserRestart>>,
    ) -> RecoveryManager {
        let manager =
            RecoveryManager::new(driver, self.cfg.recovery).with_cancel(self.cancel_token());
        match restart {
            Some(hook) => manager.with_restart(hook),
            None => manager,
        }
    }

    pub fn page_interactor(
        &self,
        driver: Arc<dyn BrowserDriver>,
        restart: Option<Arc<dyn BrowserRestart>>,
    ) -> PageInteractor {
        let recovery = self.recovery_manager(driver.clone(), restart);
        PageInteractor::new(
            driver,
            recovery,
            Duration::from_secs(self.cfg.browser.wait_timeout_secs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::Attempt;

    fn ctx() -> SessionContext {
        let mut cfg = AppConfig::default();
        cfg.metrics.enabled = false;
        SessionContext::new(cfg)
    }

    #[tokio::test(start_paused = true)]
    async fn schedulers_after_a_shutdown_run_normally() {
        let ctx = ctx();
        let before = ctx.retry_scheduler();
        ctx.shutdown().shutdown("first session done").await;

        let mut scheduler = ctx.retry_scheduler();
        let mut op = || async { Attempt::Success(7u32) };
        assert_eq!(scheduler.execute_with_retry(&mut op).await.unwrap(), Some(7));
        assert_eq!(scheduler.statistics().total_attempts, 1);

        let mut stale = before;
        let mut op = || async { Attempt::Success(7u32) };
        assert_eq!(stale.execute_with_retry(&mut op).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stop_replaces_the_session_token() {
        let ctx = ctx();
        let token = ctx.cancel_token();
        assert!(!token.is_cancelled());
        ctx.shutdown().stop().await;
        assert!(token.is_cancelled());
        assert!(!ctx.cancel_token().is_cancelled());
    }
}
