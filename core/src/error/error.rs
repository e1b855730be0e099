use std::path::PathBuf;

use thiserror::Error;

use crate::driver::DriverError;
use crate::page::InteractionError;
use crate::recovery::FatalRecoveryError;
use crate::retry::RetryError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("browser driver error: {0}")]
    Driver(#[from] DriverError),
    #[error("page interaction failed: {0}")]
    Interaction(#[from] InteractionError),
    #[error("checkout run failed: {0}")]
    Retry(#[from] RetryError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    /// The escalation error that needs a human, if this error carries one.
    pub fn intervention(&self) -> Option<&FatalRecoveryError> {
        match self {
            Self::Retry(RetryError::Intervention(e)) => Some(e),
            Self::Interaction(e) => e.fatal(),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot determine home directory")]
    NoHome,
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid toml in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid json in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
}
