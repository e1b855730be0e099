pub mod api;
pub mod checkout;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod page;
pub mod recovery;
pub mod retry;
pub mod shutdown;
