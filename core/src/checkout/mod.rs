mod actions;
mod bot;

pub use actions::PageActions;
pub use bot::{CheckoutBot, CheckoutOutcome};
