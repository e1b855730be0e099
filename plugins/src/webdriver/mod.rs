mod capabilities;
mod client;
mod error;

pub use capabilities::build_capabilities;
pub use client::WebDriverClient;
pub use error::kind_for_w3c_error;
