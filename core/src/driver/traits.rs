use async_trait::async_trait;
use serde_json::Value;

use super::types::{DriverError, ElementHandle};

/// Remote-control handle for one browser session.
///
/// Implementations must normalize their native failures into
/// [`DriverErrorKind`](super::DriverErrorKind) so the recovery layer can
/// classify them without knowing the backend.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    fn name(&self) -> &str;

    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// `Ok(None)` when nothing matches; errors are reserved for driver failures.
    async fn find_element(&self, selector: &str) -> Result<Option<ElementHandle>, DriverError>;

    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>, DriverError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError>;

    async fn element_text(&self, element: &ElementHandle) -> Result<String, DriverError>;

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, DriverError>;

    async fn refresh(&self) -> Result<(), DriverError>;

    async fn quit(&self) -> Result<(), DriverError>;
}

/// Hook used by the last automatic recovery level to replace the browser session.
#[async_trait]
pub trait BrowserRestart: Send + Sync {
    async fn restart(&self) -> anyhow::Result<()>;
}
