mod load;
mod types;

pub use load::{get_sniper_data_dir, load, load_from_path, load_with_overrides, validate};
pub use types::{
    AppConfig, BrowserConfig, BrowserMode, BrowserType, CheckoutConfig, ConfigOverrides,
    LoggingConfig, MetricsConfig, RecoveryConfig, RetryConfig,
};
