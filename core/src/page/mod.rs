mod error;
mod interactor;
mod selectors;

pub use error::InteractionError;
pub use interactor::PageInteractor;
pub use selectors::{CheckoutSelectors, OUT_OF_STOCK_TEXT};
