pub mod factory;
pub mod store;
pub mod webdriver;
