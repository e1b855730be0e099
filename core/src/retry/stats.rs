use std::time::Duration;

use chrono::{DateTime, Utc};

/// Counters for one scheduler run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryStatistics {
    pub total_attempts: u64,
    pub successful_attempts: u64,
    pub failed_attempts: u64,
    pub last_success_time: Option<DateTime<Utc>>,
    pub last_failure_time: Option<DateTime<Utc>>,
    /// Gap between consecutive attempt starts.
    pub attempt_intervals: Vec<Duration>,
}

impl RetryStatistics {
    pub fn average_interval(&self) -> Option<Duration> {
        if self.attempt_intervals.is_empty() {
            return None;
        }
        let total: Duration = self.attempt_intervals.iter().sum();
        Some(total / self.attempt_intervals.len() as u32)
    }

    pub(crate) fn record_success(&mut self) {
        self.successful_attempts += 1;
        self.last_success_time = Some(Utc::now());
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed_attempts += 1;
        self.last_failure_time = Some(Utc::now());
    }
}
