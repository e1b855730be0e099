mod traits;
mod types;

pub use traits::{BrowserDriver, BrowserRestart};
pub use types::{DriverError, DriverErrorKind, ElementHandle, ELEMENT_KEY};
