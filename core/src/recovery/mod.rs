mod manager;
mod types;

pub use manager::RecoveryManager;
pub use types::{ErrorCategory, FatalRecoveryError, RecoveryLevel, RecoveryState};
