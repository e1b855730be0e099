use async_trait::async_trait;
use sniper_core::api::{InteractionError, PageActions, PageInteractor};

/// Selectors for the store's product, login and cart pages.
#[derive(Debug, Clone)]
pub struct StoreSelectors {
    pub login_handle: String,
    pub login_password: String,
    pub login_submit: String,
    pub add_to_cart: String,
    pub go_to_checkout: String,
    pub coupon_field: String,
    pub coupon_apply: String,
    pub credit_field: String,
    pub credit_apply: String,
    pub proceed_to_payment: String,
}

impl Default for StoreSelectors {
    fn default() -> Self {
        Self {
            login_handle: "#handle".to_string(),
            login_password: "#password".to_string(),
            login_submit: "button[type='submit']".to_string(),
            add_to_cart: ".js-store-add-to-cart, .btn-add-to-cart".to_string(),
            go_to_checkout: ".js-checkout-button, .btn-checkout".to_string(),
            coupon_field: ".js-coupon-field, #coupon-code".to_string(),
            coupon_apply: ".js-apply-coupon".to_string(),
            credit_field: ".js-store-credit-field, #store-credit".to_string(),
            credit_apply: ".js-apply-credit".to_string(),
            proceed_to_payment: ".js-proceed-to-payment, .btn-proceed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoreActions {
    selectors: StoreSelectors,
}

impl StoreActions {
    pub fn new(selectors: StoreSelectors) -> Self {
        Self { selectors }
    }

    pub fn selectors(&self) -> &StoreSelectors {
        &self.selectors
    }
}

#[async_trait]
impl PageActions for StoreActions {
    async fn login(
        &self,
        page: &mut PageInteractor,
        username: &str,
        password: &str,
    ) -> Result<(), InteractionError> {
        let s = &self.selectors;
        page.type_into(&s.login_handle, username).await?;
        page.type_into(&s.login_password, password).await?;
        page.click(&s.login_submit, "login button").await
    }

    async fn add_to_cart(&self, page: &mut PageInteractor) -> Result<bool, InteractionError> {
        if page.is_out_of_stock().await? {
            return Ok(false);
        }
        if page.probe(&self.selectors.add_to_cart).await?.is_none() {
            tracing::info!(target: "sniper.store", "add to cart button not available yet");
            return Ok(false);
        }
        page.click(&self.selectors.add_to_cart, "add to cart button")
            .await?;
        Ok(true)
    }

    async fn go_to_checkout(&self, page: &mut PageInteractor) -> Result<(), InteractionError> {
        page.click(&self.selectors.go_to_checkout, "checkout button")
            .await
    }

    async fn apply_coupon(
        &self,
        page: &mut PageInteractor,
        code: &str,
    ) -> Result<(), InteractionError> {
        page.type_into(&self.selectors.coupon_field, code).await?;
        page.click(&self.selectors.coupon_apply, "apply coupon button")
            .await
    }

    async fn apply_store_credit(
        &self,
        page: &mut PageInteractor,
        amount: u32,
    ) -> Result<(), InteractionError> {
        page.type_into(&self.selectors.credit_field, &amount.to_string())
            .await?;
        page.click(&self.selectors.credit_apply, "apply credit button")
            .await
    }

    async fn proceed_to_payment(&self, page: &mut PageInteractor) -> Result<(), InteractionError> {
        page.click(&self.selectors.proceed_to_payment, "proceed to payment button")
            .await
    }
}
