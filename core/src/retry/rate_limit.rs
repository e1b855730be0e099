use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const WINDOW: Duration = Duration::from_secs(60);

/// Caps attempts per one-minute window. The first window opens with the
/// first attempt.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    attempts_in_window: u32,
    window_start: Option<Instant>,
}

impl RateLimiter {
    pub fn new(max_per_window: u32) -> Self {
        Self {
            max_per_window,
            attempts_in_window: 0,
            window_start: None,
        }
    }

    pub fn attempts_in_window(&self) -> u32 {
        self.attempts_in_window
    }

    /// Take one slot, sleeping out the rest of the window when it is full.
    ///
    /// Returns `false` if `cancel` fired while waiting; no slot is taken then.
    pub async fn acquire(&mut self, cancel: &CancellationToken) -> bool {
        let now = Instant::now();
        let window_start = match self.window_start {
            Some(start) if now.duration_since(start) <= WINDOW => start,
            _ => {
                self.attempts_in_window = 0;
                self.window_start = Some(now);
                now
            }
        };

        if self.attempts_in_window >= self.max_per_window {
            let wait = WINDOW.saturating_sub(now.duration_since(window_start));
            if !wait.is_zero() {
                tracing::info!(
                    target: "sniper.retry",
                    wait_secs = wait.as_secs_f64(),
                    limit = self.max_per_window,
                    "rate limit reached, waiting"
                );
                tokio::select! {
                    _ = cancel.cancelled() => return false,
                    _ = tokio::time::sleep(wait) => {}
                }
            }
            self.attempts_in_window = 0;
            self.window_start = Some(Instant::now());
        }

        self.attempts_in_window += 1;
        true
    }
}
