//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `sniper_core::api` instead of reaching into internal modules.

pub use crate::checkout::{CheckoutBot, CheckoutOutcome, PageActions};
pub use crate::config::{
    get_sniper_data_dir, load_with_overrides, AppConfig, BrowserConfig, BrowserMode, BrowserType,
    CheckoutConfig, ConfigOverrides, LoggingConfig, MetricsConfig, RecoveryConfig, RetryConfig,
};
pub use crate::context::SessionContext;
pub use crate::driver::{
    BrowserDriver, BrowserRestart, DriverError, DriverErrorKind, ElementHandle, ELEMENT_KEY,
};
pub use crate::error::{CliError, ConfigError};
pub use crate::metrics::{AttemptResult, MetricsRecorder, MetricsSnapshot};
pub use crate::page::{CheckoutSelectors, InteractionError, PageInteractor};
pub use crate::recovery::{ErrorCategory, FatalRecoveryError, RecoveryLevel, RecoveryManager};
pub use crate::retry::{Attempt, AttemptError, Operation, RetryError, RetryScheduler};
pub use crate::shutdown::{spawn_signal_listener, ShutdownCoordinator};
