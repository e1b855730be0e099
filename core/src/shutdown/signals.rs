use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::task::JoinHandle;

use super::coordinator::ShutdownCoordinator;

const STOP_FILE_POLL: Duration = Duration::from_millis(500);

/// Spawn the task that turns SIGINT, SIGTERM or a stop-request file into a
/// shutdown. Returns `None` when a listener is already running.
pub fn spawn_signal_listener(
    coordinator: Arc<ShutdownCoordinator>,
    stop_file: Option<PathBuf>,
) -> Option<JoinHandle<()>> {
    if coordinator.listener_started.swap(true, Ordering::SeqCst) {
        return None;
    }

    Some(tokio::spawn(async move {
        let token = coordinator.cancel_token();
        let reason = tokio::select! {
            _ = signal::ctrl_c() => "Received SIGINT",
            _ = wait_for_sigterm() => "Received SIGTERM",
            _ = wait_for_stop_file(stop_file.as_deref()) => "Stop requested",
            // Someone else already shut the session down.
            _ = token.cancelled() => return,
        };
        tracing::info!(target: "sniper.shutdown", reason, "shutdown signal");
        coordinator.shutdown(reason).await;
    }))
}

/// Resolves once `path` exists, removing it. Never resolves for `None`.
pub async fn wait_for_stop_file(path: Option<&Path>) {
    let Some(path) = path else {
        return std::future::pending().await;
    };
    loop {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!(target: "sniper.shutdown", path = %path.display(), error = %e, "failed to remove stop file");
            }
            return;
        }
        tokio::time::sleep(STOP_FILE_POLL).await;
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!(target: "sniper.shutdown", error = %e, "cannot install SIGTERM handler");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
