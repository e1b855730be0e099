use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::driver::BrowserDriver;

pub type CleanupCallback = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

#[derive(Default)]
struct Registry {
    browser: Option<Arc<dyn BrowserDriver>>,
    temp_files: Vec<PathBuf>,
    callbacks: Vec<CleanupCallback>,
}

/// Releases the browser, temp files and cleanup callbacks exactly once.
///
/// Every trigger (signal, stop request, explicit call) ends up in
/// [`shutdown`](Self::shutdown), which cancels the session token first so the
/// retry loop stops between attempts. Later calls find an empty registry and
/// do nothing. Once a shutdown finishes the coordinator hands out a fresh
/// token, so the next browser session starts uncancelled.
pub struct ShutdownCoordinator {
    registry: Mutex<Registry>,
    cancel: Mutex<CancellationToken>,
    shutting_down: AtomicBool,
    pub(crate) listener_started: AtomicBool,
}

impl ShutdownCoordinator {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            cancel: Mutex::new(cancel),
            shutting_down: AtomicBool::new(false),
            listener_started: AtomicBool::new(false),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Token of the current session. Cancelled tokens are never reused.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn rearm(&self) {
        *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = CancellationToken::new();
        // The old listener exits with its cancelled token.
        self.listener_started.store(false, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Replaces any previously registered browser.
    pub fn register_browser(&self, browser: Arc<dyn BrowserDriver>) {
        self.registry().browser = Some(browser);
    }

    pub fn register_temp_file(&self, path: impl AsRef<Path>) {
        self.registry().temp_files.push(path.as_ref().to_path_buf());
    }

    pub fn register_cleanup_callback<F>(&self, callback: F)
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.registry().callbacks.push(Box::new(callback));
    }

    pub fn has_browser(&self) -> bool {
        self.registry().browser.is_some()
    }

    pub fn temp_files(&self) -> Vec<PathBuf> {
        self.registry().temp_files.clone()
    }

    pub fn pending_callbacks(&self) -> usize {
        self.registry().callbacks.len()
    }

    /// Explicit stop requested by the user.
    pub async fn stop(&self) {
        self.shutdown("Stop command received").await;
    }

    /// Quit the browser, remove temp files, then run callbacks. Each step is
    /// isolated: failures are logged and the next step still runs.
    pub async fn shutdown(&self, reason: &str) {
        tracing::info!(target: "sniper.shutdown", reason, "initiating shutdown");
        self.cancel_token().cancel();
        self.shutting_down.store(true, Ordering::SeqCst);

        let Registry {
            browser,
            temp_files,
            callbacks,
        } = std::mem::take(&mut *self.registry());

        if let Some(browser) = browser {
            tracing::info!(target: "sniper.shutdown", driver = browser.name(), "closing browser session");
            if let Err(e) = browser.quit().await {
                tracing::error!(target: "sniper.shutdown", error = %e, "error closing browser");
            }
        }

        for path in temp_files {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::info!(target: "sniper.shutdown", path = %path.display(), "removed temporary file")
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::error!(
                    target: "sniper.shutdown",
                    path = %path.display(),
                    error = %e,
                    "error removing temp file"
                ),
            }
        }

        for callback in callbacks {
            if let Err(e) = callback() {
                tracing::error!(target: "sniper.shutdown", error = %e, "error in cleanup callback");
            }
        }

        self.rearm();
        self.shutting_down.store(false, Ordering::SeqCst);
        tracing::info!(target: "sniper.shutdown", "shutdown complete");
    }
}
