mod recorder;
mod snapshot;

pub use recorder::MetricsRecorder;
pub use snapshot::{success_rate, AttemptResult, MetricsSnapshot};
