mod rate_limit;
mod scheduler;
mod stats;
mod types;

pub use rate_limit::RateLimiter;
pub use scheduler::{apply_jitter, Operation, RetryScheduler};
pub use stats::RetryStatistics;
pub use types::{Attempt, AttemptError, RetryError};
