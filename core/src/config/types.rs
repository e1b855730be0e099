use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub recovery: RecoveryConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub checkout: CheckoutConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// EnvFilter string, e.g. "info" or "sniper_core=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Pretty console logs and debug level when set.
    #[serde(default)]
    pub debug: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            browser: BrowserConfig::default(),
            recovery: RecoveryConfig::default(),
            metrics: MetricsConfig::default(),
            checkout: CheckoutConfig::default(),
            logging: LoggingConfig::default(),
            log_level: default_log_level(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Seconds between attempts, before jitter.
    #[serde(default = "default_base_interval")]
    pub base_interval: f64,

    /// 0 means retry until stock appears.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_max_attempts_per_minute")]
    pub max_attempts_per_minute: u32,
}

fn default_base_interval() -> f64 {
    5.0
}

fn default_max_retries() -> u32 {
    100
}

fn default_max_attempts_per_minute() -> u32 {
    10
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_interval: default_base_interval(),
            max_retries: default_max_retries(),
            max_attempts_per_minute: default_max_attempts_per_minute(),
        }
    }
}

impl RetryConfig {
    pub fn new(base_interval: f64, max_retries: u32, max_attempts_per_minute: u32) -> Self {
        Self {
            base_interval,
            max_retries,
            max_attempts_per_minute,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_retries == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserMode {
    Headless,
    Headed,
}

impl BrowserMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Headless => "headless",
            Self::Headed => "headed",
        }
    }
}

impl std::str::FromStr for BrowserMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "headless" => Ok(Self::Headless),
            "headed" => Ok(Self::Headed),
            other => Err(format!("unknown browser mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    Chrome,
    Firefox,
}

impl BrowserType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_browser_mode")]
    pub mode: BrowserMode,

    #[serde(default = "default_browser_type")]
    pub browser_type: BrowserType,

    /// Existing browser profile directory, if any.
    #[serde(default)]
    pub profile_path: Option<String>,

    /// chromedriver / geckodriver endpoint.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// How long element waits poll before reporting a timeout.
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
}

fn default_browser_mode() -> BrowserMode {
    BrowserMode::Headless
}

fn default_browser_type() -> BrowserType {
    BrowserType::Chrome
}

fn default_webdriver_url() -> String {
    "http://127.0.0.1:9515".to_string()
}

fn default_wait_timeout_secs() -> u64 {
    10
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            mode: default_browser_mode(),
            browser_type: default_browser_type(),
            profile_path: None,
            webdriver_url: default_webdriver_url(),
            wait_timeout_secs: default_wait_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    #[serde(default = "default_wait_delay_secs")]
    pub wait_delay_secs: u64,

    #[serde(default = "default_refresh_delay_secs")]
    pub refresh_delay_secs: u64,

    #[serde(default = "default_restart_delay_secs")]
    pub restart_delay_secs: u64,
}

fn default_wait_delay_secs() -> u64 {
    5
}

fn default_refresh_delay_secs() -> u64 {
    15
}

fn default_restart_delay_secs() -> u64 {
    30
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            wait_delay_secs: default_wait_delay_secs(),
            refresh_delay_secs: default_refresh_delay_secs(),
            restart_delay_secs: default_restart_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,

    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_path() -> String {
    "checkout_metrics.json".to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            path: default_metrics_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub coupon_code: Option<String>,

    /// Store credit to apply, in whole currency units. 0 skips the step.
    #[serde(default)]
    pub store_credit: u32,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl CheckoutConfig {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.trim().is_empty() => Some((u, p)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            directory: None,
        }
    }
}

/// Command-line values that win over the config file, field by field.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_interval: Option<f64>,
    pub max_retries: Option<u32>,
    pub browser_mode: Option<BrowserMode>,
}

impl AppConfig {
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.base_interval {
            self.retry.base_interval = v;
        }
        if let Some(v) = overrides.max_retries {
            self.retry.max_retries = v;
        }
        if let Some(v) = overrides.browser_mode {
            self.browser.mode = v;
        }
    }

    /// Effective EnvFilter directive; `debug` forces debug level.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_level
        }
    }
}
