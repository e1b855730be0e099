use thiserror::Error;

use crate::driver::DriverError;
use crate::recovery::FatalRecoveryError;

#[derive(Debug, Clone, Error)]
pub enum InteractionError {
    #[error("element not found after recovery attempts: {selector}")]
    ElementNotFound {
        selector: String,
        #[source]
        fatal: Option<FatalRecoveryError>,
    },

    #[error("could not interact with {name}: {reason}")]
    ElementNotInteractable {
        name: String,
        reason: String,
        #[source]
        fatal: Option<FatalRecoveryError>,
    },

    #[error("missing required elements: {}", .0.join(", "))]
    MissingElements(Vec<String>),

    #[error("interaction with {0} abandoned, session is shutting down")]
    Cancelled(String),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl InteractionError {
    pub fn not_found(selector: impl Into<String>, fatal: Option<FatalRecoveryError>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
            fatal,
        }
    }

    pub fn not_interactable(
        name: impl Into<String>,
        reason: impl Into<String>,
        fatal: Option<FatalRecoveryError>,
    ) -> Self {
        Self::ElementNotInteractable {
            name: name.into(),
            reason: reason.into(),
            fatal,
        }
    }

    /// Tag used for the metrics error counts.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ElementNotFound { .. } => "ElementNotFound",
            Self::ElementNotInteractable { .. } => "ElementNotInteractable",
            Self::MissingElements(_) => "MissingElements",
            Self::Cancelled(_) => "Cancelled",
            Self::Driver(e) => e.kind().as_str(),
        }
    }

    /// The escalation error behind this failure, when recovery gave up.
    pub fn fatal(&self) -> Option<&FatalRecoveryError> {
        match self {
            Self::ElementNotFound { fatal, .. } | Self::ElementNotInteractable { fatal, .. } => {
                fatal.as_ref()
            }
            _ => None,
        }
    }
}
