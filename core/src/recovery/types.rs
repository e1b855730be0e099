use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::driver::DriverErrorKind;

/// Progressive recovery levels, least to most drastic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RecoveryLevel {
    WaitRetry,
    RefreshRetry,
    RestartRetry,
    UserIntervention,
}

impl RecoveryLevel {
    pub const ALL: [RecoveryLevel; 4] = [
        Self::WaitRetry,
        Self::RefreshRetry,
        Self::RestartRetry,
        Self::UserIntervention,
    ];

    /// Recoveries allowed at this level before escalating. `None` for the terminal level.
    pub fn max_attempts(self) -> Option<u32> {
        match self {
            Self::WaitRetry => Some(3),
            Self::RefreshRetry => Some(2),
            Self::RestartRetry => Some(1),
            Self::UserIntervention => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::WaitRetry => Some(Self::RefreshRetry),
            Self::RefreshRetry => Some(Self::RestartRetry),
            Self::RestartRetry => Some(Self::UserIntervention),
            Self::UserIntervention => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaitRetry => "WAIT_RETRY",
            Self::RefreshRetry => "REFRESH_RETRY",
            Self::RestartRetry => "RESTART_RETRY",
            Self::UserIntervention => "USER_INTERVENTION",
        }
    }
}

impl fmt::Display for RecoveryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ErrorCategory {
    /// UI races expected to resolve on their own.
    Temporary,
    /// Page layout does not match the selectors.
    Structural,
    Network,
    Fatal,
}

impl ErrorCategory {
    pub fn classify(kind: DriverErrorKind) -> Self {
        match kind {
            DriverErrorKind::ClickIntercepted | DriverErrorKind::StaleElement => Self::Temporary,
            DriverErrorKind::NoSuchElement => Self::Structural,
            DriverErrorKind::Timeout | DriverErrorKind::Driver => Self::Network,
            DriverErrorKind::Other => Self::Fatal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temporary => "TEMPORARY",
            Self::Structural => "STRUCTURAL",
            Self::Network => "NETWORK",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escalation bookkeeping for one browser session.
#[derive(Debug, Clone)]
pub struct RecoveryState {
    current_level: RecoveryLevel,
    recovery_attempts: BTreeMap<RecoveryLevel, u32>,
    error_counts: BTreeMap<ErrorCategory, u32>,
    recovery_start_time: Option<Instant>,
}

impl Default for RecoveryState {
    fn default() -> Self {
        Self {
            current_level: RecoveryLevel::WaitRetry,
            recovery_attempts: RecoveryLevel::ALL.iter().map(|l| (*l, 0)).collect(),
            error_counts: BTreeMap::new(),
            recovery_start_time: None,
        }
    }
}

impl RecoveryState {
    pub fn current_level(&self) -> RecoveryLevel {
        self.current_level
    }

    pub fn attempts_at(&self, level: RecoveryLevel) -> u32 {
        self.recovery_attempts.get(&level).copied().unwrap_or(0)
    }

    pub fn error_count(&self, category: ErrorCategory) -> u32 {
        self.error_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn error_counts(&self) -> &BTreeMap<ErrorCategory, u32> {
        &self.error_counts
    }

    pub fn recovery_start_time(&self) -> Option<Instant> {
        self.recovery_start_time
    }

    pub(crate) fn mark_started(&mut self, now: Instant) -> Instant {
        *self.recovery_start_time.get_or_insert(now)
    }

    pub(crate) fn count_error(&mut self, category: ErrorCategory) {
        *self.error_counts.entry(category).or_insert(0) += 1;
    }

    pub(crate) fn count_attempt(&mut self, level: RecoveryLevel) {
        *self.recovery_attempts.entry(level).or_insert(0) += 1;
    }

    /// Moves to the next level once the current one has used its budget.
    pub(crate) fn escalate_if_exhausted(&mut self) -> Option<RecoveryLevel> {
        let level = self.current_level;
        let max = level.max_attempts()?;
        if self.attempts_at(level) < max {
            return None;
        }
        let next = level.next()?;
        self.current_level = next;
        Some(next)
    }
}

/// Escalation reached [`RecoveryLevel::UserIntervention`]; a human has to step in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "recovery escalated to user intervention; error counts: {}, time in recovery: {:.1}s",
    format_counts(.error_counts),
    .elapsed.as_secs_f64()
)]
pub struct FatalRecoveryError {
    pub error_counts: BTreeMap<ErrorCategory, u32>,
    pub elapsed: Duration,
}

fn format_counts(counts: &BTreeMap<ErrorCategory, u32>) -> String {
    let parts: Vec<String> = counts
        .iter()
        .map(|(category, n)| format!("{category}={n}"))
        .collect();
    format!("{{{}}}", parts.join(", "))
}
