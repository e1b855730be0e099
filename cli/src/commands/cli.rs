use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sniper_core::api::{BrowserMode, CliError, ConfigOverrides};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserModeArg {
    Headless,
    Headed,
}

impl From<BrowserModeArg> for BrowserMode {
    fn from(v: BrowserModeArg) -> Self {
        match v {
            BrowserModeArg::Headless => BrowserMode::Headless,
            BrowserModeArg::Headed => BrowserMode::Headed,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "sniper", about = "Timed checkout bot with escalating error recovery")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Product page to watch. Required by `start`.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Config file (.json or .toml). Defaults to ~/.sniper/config.toml, then ./config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seconds between attempts, before jitter.
    #[arg(long, global = true)]
    pub retry_interval: Option<f64>,

    /// Attempt budget; 0 retries until stock appears.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    #[arg(long, value_enum, global = true)]
    pub browser_mode: Option<BrowserModeArg>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_interval: self.retry_interval,
            max_retries: self.max_retries,
            browser_mode: self.browser_mode.map(Into::into),
        }
    }

    pub fn start_url(&self) -> Result<String, CliError> {
        self.url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| CliError::Command("--url is required for start".to_string()))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bot against a product page until checkout reaches payment.
    Start,
    /// Show the running bot and its latest metrics.
    Status,
    /// Ask a running bot to shut down.
    Stop,
}
