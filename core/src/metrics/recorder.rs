use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::snapshot::{success_rate, AttemptResult, MetricsSnapshot};

/// Raw counters; derived figures are only computed when a snapshot is taken.
#[derive(Debug, Clone)]
struct MetricsData {
    start_time: DateTime<Utc>,
    total_attempts: u64,
    successful_attempts: u64,
    failed_attempts: u64,
    response_times: Vec<f64>,
    error_counts: BTreeMap<String, u64>,
    current_state: String,
    last_attempt_result: Option<AttemptResult>,
    current_retry_count: u64,
}

impl Default for MetricsData {
    fn default() -> Self {
        Self {
            start_time: Utc::now(),
            total_attempts: 0,
            successful_attempts: 0,
            failed_attempts: 0,
            response_times: Vec::new(),
            error_counts: BTreeMap::new(),
            current_state: "stopped".to_string(),
            last_attempt_result: None,
            current_retry_count: 0,
        }
    }
}

/// Accumulates attempt metrics for one session and rewrites the metrics file
/// after every mutation.
#[derive(Debug)]
pub struct MetricsRecorder {
    path: Option<PathBuf>,
    data: MetricsData,
}

impl MetricsRecorder {
    /// Recorder backed by `path`; the file is written immediately if missing.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let recorder = Self {
            path: Some(path.into()),
            data: MetricsData::default(),
        };
        if let Some(p) = recorder.path.as_deref() {
            if !p.exists() {
                recorder.save();
            }
        }
        recorder
    }

    /// Recorder that keeps counters in memory only.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: MetricsData::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record_attempt(&mut self, success: bool, duration: Duration) {
        self.data.total_attempts += 1;
        if success {
            self.data.successful_attempts += 1;
            self.data.last_attempt_result = Some(AttemptResult::Success);
        } else {
            self.data.failed_attempts += 1;
            self.data.last_attempt_result = Some(AttemptResult::Failure);
        }
        self.data.response_times.push(duration.as_secs_f64());
        self.save();
        self.notify_status();
    }

    pub fn record_error(&mut self, error_kind: &str) {
        *self
            .data
            .error_counts
            .entry(error_kind.to_string())
            .or_insert(0) += 1;
        self.save();
    }

    pub fn update_state(&mut self, state: &str) {
        self.data.current_state = state.to_string();
        self.notify_status();
        self.save();
    }

    pub fn update_retry_count(&mut self, count: u64) {
        self.data.current_retry_count = count;
        self.notify_status();
        self.save();
    }

    pub fn current_state(&self) -> &str {
        &self.data.current_state
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let d = &self.data;
        let average_response_time = if d.response_times.is_empty() {
            0.0
        } else {
            d.response_times.iter().sum::<f64>() / d.response_times.len() as f64
        };
        MetricsSnapshot {
            start_time: d.start_time,
            total_attempts: d.total_attempts,
            successful_attempts: d.successful_attempts,
            failed_attempts: d.failed_attempts,
            average_response_time,
            error_counts: d.error_counts.clone(),
            current_state: d.current_state.clone(),
            last_attempt_result: d.last_attempt_result,
            current_retry_count: d.current_retry_count,
            success_rate: success_rate(d.successful_attempts, d.total_attempts),
        }
    }

    fn save(&self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        // The file is advisory; a write failure must not stop the bot.
        if let Err(e) = self.snapshot().save_to_file(path) {
            tracing::warn!(target: "sniper.metrics", error = %e, "failed to persist metrics");
        }
    }

    fn notify_status(&self) {
        let last = match self.data.last_attempt_result {
            Some(AttemptResult::Success) => "success",
            Some(AttemptResult::Failure) => "failure",
            None => "n/a",
        };
        tracing::info!(
            target: "sniper.metrics",
            state = %self.data.current_state.to_uppercase(),
            last_attempt = last,
            retry = self.data.current_retry_count,
            success_rate = %format!(
                "{:.1}%",
                success_rate(self.data.successful_attempts, self.data.total_attempts)
            ),
            "status"
        );
    }
}
