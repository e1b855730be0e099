use async_trait::async_trait;

use crate::page::{InteractionError, PageInteractor};

/// Store-specific steps of the purchase, driven through a [`PageInteractor`]
/// so every lookup and click goes through the recovery loop.
#[async_trait]
pub trait PageActions: Send + Sync {
    async fn login(
        &self,
        page: &mut PageInteractor,
        username: &str,
        password: &str,
    ) -> Result<(), InteractionError>;

    /// `Ok(false)` when the product cannot be added yet (out of stock).
    async fn add_to_cart(&self, page: &mut PageInteractor) -> Result<bool, InteractionError>;

    async fn go_to_checkout(&self, page: &mut PageInteractor) -> Result<(), InteractionError>;

    async fn apply_coupon(
        &self,
        page: &mut PageInteractor,
        code: &str,
    ) -> Result<(), InteractionError>;

    async fn apply_store_credit(
        &self,
        page: &mut PageInteractor,
        amount: u32,
    ) -> Result<(), InteractionError>;

    async fn proceed_to_payment(&self, page: &mut PageInteractor) -> Result<(), InteractionError>;
}
