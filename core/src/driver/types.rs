use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// W3C WebDriver key identifying an element reference in JSON payloads.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a07e-4f2b-b2c4-6b9a9c3b0bdb";

/// Opaque reference to an element inside the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// The element as a script argument, e.g. for `arguments[0].scrollIntoView()`.
    pub fn as_script_arg(&self) -> Value {
        serde_json::json!({ ELEMENT_KEY: self.0 })
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of failure tags every driver implementation normalizes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverErrorKind {
    Timeout,
    NoSuchElement,
    ClickIntercepted,
    StaleElement,
    /// Transport or generic remote-end failure.
    Driver,
    Other,
}

impl DriverErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "Timeout",
            Self::NoSuchElement => "NoSuchElement",
            Self::ClickIntercepted => "ClickIntercepted",
            Self::StaleElement => "StaleElement",
            Self::Driver => "Driver",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct DriverError {
    kind: DriverErrorKind,
    message: String,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Timeout, message)
    }

    pub fn no_such_element(selector: &str) -> Self {
        Self::new(
            DriverErrorKind::NoSuchElement,
            format!("no element matches {selector}"),
        )
    }

    pub fn kind(&self) -> DriverErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
