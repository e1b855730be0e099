use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::error::InteractionError;
use super::selectors::{CheckoutSelectors, OUT_OF_STOCK_TEXT};
use crate::driver::{BrowserDriver, DriverError, DriverErrorKind, ElementHandle};
use crate::recovery::RecoveryManager;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView(true);";

/// Element lookups and clicks with the recovery loop wrapped around them.
pub struct PageInteractor {
    driver: Arc<dyn BrowserDriver>,
    recovery: RecoveryManager,
    wait_timeout: Duration,
    selectors: CheckoutSelectors,
}

impl PageInteractor {
    pub fn new(
        driver: Arc<dyn BrowserDriver>,
        recovery: RecoveryManager,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            driver,
            recovery,
            wait_timeout,
            selectors: CheckoutSelectors::default(),
        }
    }

    pub fn with_selectors(mut self, selectors: CheckoutSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn driver(&self) -> &Arc<dyn BrowserDriver> {
        &self.driver
    }

    pub fn recovery(&self) -> &RecoveryManager {
        &self.recovery
    }

    pub fn selectors(&self) -> &CheckoutSelectors {
        &self.selectors
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    /// Single lookup, no polling and no recovery.
    pub async fn probe(&self, selector: &str) -> Result<Option<ElementHandle>, InteractionError> {
        Ok(self.driver.find_element(selector).await?)
    }

    async fn poll_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.driver.find_element(selector).await? {
                return Ok(element);
            }
            if Instant::now() >= deadline || self.recovery.is_cancelled() {
                return Err(DriverError::timeout(format!(
                    "waited {:.1}s for {selector}",
                    timeout.as_secs_f64()
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait until `selector` matches, recovering from timeouts and missing
    /// elements. `timeout` defaults to the configured wait timeout.
    ///
    /// Gives up with [`InteractionError::Cancelled`] once the session is
    /// shutting down.
    pub async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> Result<ElementHandle, InteractionError> {
        let timeout = timeout.unwrap_or(self.wait_timeout);
        loop {
            if self.recovery.is_cancelled() {
                return Err(InteractionError::Cancelled(selector.to_string()));
            }
            match self.poll_for(selector, timeout).await {
                Ok(element) => {
                    self.recovery.reset();
                    return Ok(element);
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        DriverErrorKind::Timeout | DriverErrorKind::NoSuchElement
                    ) =>
                {
                    tracing::warn!(target: "sniper.page", selector, error = %e, "element not found within timeout");
                    match self.recovery.execute_recovery(&e).await {
                        _ if self.recovery.is_cancelled() => {
                            return Err(InteractionError::Cancelled(selector.to_string()))
                        }
                        Ok(true) => continue,
                        Ok(false) => return Err(InteractionError::not_found(selector, None)),
                        Err(fatal) => return Err(InteractionError::not_found(selector, Some(fatal))),
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn scroll_and_click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.driver
            .execute_script(SCROLL_INTO_VIEW, vec![element.as_script_arg()])
            .await?;
        self.driver.click(element).await
    }

    /// Scroll `element` into view and click it, recovering from intercepted
    /// clicks and stale references. Other failures are not retried.
    pub async fn safe_click(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<(), InteractionError> {
        loop {
            if self.recovery.is_cancelled() {
                return Err(InteractionError::Cancelled(name.to_string()));
            }
            match self.scroll_and_click(element).await {
                Ok(()) => {
                    tracing::info!(target: "sniper.page", element = name, "clicked");
                    self.recovery.reset();
                    return Ok(());
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        DriverErrorKind::ClickIntercepted | DriverErrorKind::StaleElement
                    ) =>
                {
                    tracing::warn!(target: "sniper.page", element = name, error = %e, "click attempt failed");
                    match self.recovery.execute_recovery(&e).await {
                        _ if self.recovery.is_cancelled() => {
                            return Err(InteractionError::Cancelled(name.to_string()))
                        }
                        Ok(true) => continue,
                        Ok(false) => {
                            tracing::error!(target: "sniper.page", element = name, "click failed after recovery attempts");
                            return Err(InteractionError::not_interactable(name, e.to_string(), None));
                        }
                        Err(fatal) => {
                            return Err(InteractionError::not_interactable(
                                name,
                                e.to_string(),
                                Some(fatal),
                            ))
                        }
                    }
                }
                Err(e) => {
                    return Err(InteractionError::not_interactable(name, e.to_string(), None));
                }
            }
        }
    }

    /// Wait for `selector` and click it.
    pub async fn click(&mut self, selector: &str, name: &str) -> Result<(), InteractionError> {
        let element = self.wait_for_element(selector, None).await?;
        self.safe_click(&element, name).await
    }

    pub async fn type_into(&mut self, selector: &str, text: &str) -> Result<(), InteractionError> {
        let element = self.wait_for_element(selector, None).await?;
        self.driver
            .send_keys(&element, text)
            .await
            .map_err(|e| InteractionError::not_interactable(selector, e.to_string(), None))
    }

    /// `true` when the out-of-stock toast is showing right now.
    pub async fn is_out_of_stock(&self) -> Result<bool, InteractionError> {
        let Some(toast) = self.probe(&self.selectors.out_of_stock_msg).await? else {
            return Ok(false);
        };
        let text = self.driver.element_text(&toast).await?;
        let out = text.to_lowercase().contains(OUT_OF_STOCK_TEXT);
        if out {
            tracing::warn!(target: "sniper.page", "item is out of stock");
        }
        Ok(out)
    }

    /// Names of required elements the page does not show.
    pub async fn missing_elements(&self) -> Result<Vec<String>, InteractionError> {
        let mut missing = Vec::new();
        for (name, selector) in self.selectors.required() {
            if self.probe(selector).await?.is_some() {
                tracing::debug!(target: "sniper.page", element = name, "found element");
            } else {
                tracing::warn!(target: "sniper.page", element = name, "missing element");
                missing.push(name.to_string());
            }
        }
        Ok(missing)
    }

    /// Accept the terms and press "proceed to pay" on the hand-off page.
    ///
    /// `Ok(false)` when the item is out of stock. The required elements are
    /// checked up front so a layout change fails fast.
    pub async fn complete_checkout_flow(&mut self) -> Result<bool, InteractionError> {
        if self.is_out_of_stock().await? {
            tracing::warn!(target: "sniper.page", "cannot proceed, item is out of stock");
            return Ok(false);
        }

        let missing = self.missing_elements().await?;
        if !missing.is_empty() {
            let err = InteractionError::MissingElements(missing);
            tracing::error!(target: "sniper.page", error = %err, "checkout flow failed");
            return Err(err);
        }

        let selectors = self.selectors.clone();
        self.click(&selectors.terms_checkbox, "terms checkbox").await?;
        self.click(&selectors.agree_button, "agree button").await?;
        self.click(&selectors.proceed_button, "proceed to pay button").await?;

        tracing::info!(target: "sniper.page", "checkout flow completed");
        Ok(true)
    }
}
