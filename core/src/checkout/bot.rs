use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::actions::PageActions;
use crate::config::CheckoutConfig;
use crate::context::SessionContext;
use crate::driver::{BrowserDriver, BrowserRestart};
use crate::error::CliError;
use crate::page::PageInteractor;
use crate::retry::{Attempt, Operation, RetryScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The payment hand-off page was reached and confirmed.
    Completed,
    /// The cart step never succeeded within the retry budget.
    Exhausted,
    /// The item sold out between the cart and the payment page.
    SoldOut,
    Cancelled,
}

impl CheckoutOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Exhausted => "exhausted",
            Self::SoldOut => "sold_out",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Add to cart and open the checkout; retried until stock appears.
struct CartOperation<'a> {
    page: &'a mut PageInteractor,
    actions: &'a dyn PageActions,
}

#[async_trait]
impl<'a> Operation<()> for CartOperation<'a> {
    async fn attempt(&mut self) -> Attempt<()> {
        match self.actions.add_to_cart(self.page).await {
            Ok(true) => {}
            Ok(false) => return Attempt::Failed,
            Err(e) => return e.into(),
        }
        match self.actions.go_to_checkout(self.page).await {
            Ok(()) => Attempt::Success(()),
            Err(e) => e.into(),
        }
    }
}

/// One checkout session against one browser.
pub struct CheckoutBot {
    url: String,
    driver: Arc<dyn BrowserDriver>,
    page: PageInteractor,
    scheduler: RetryScheduler,
    checkout: CheckoutConfig,
    cancel: CancellationToken,
}

impl CheckoutBot {
    pub fn new(
        ctx: &SessionContext,
        url: impl Into<String>,
        driver: Arc<dyn BrowserDriver>,
        restart: Option<Arc<dyn BrowserRestart>>,
    ) -> Self {
        Self {
            url: url.into(),
            page: ctx.page_interactor(driver.clone(), restart),
            driver,
            scheduler: ctx.retry_scheduler(),
            checkout: ctx.cfg().checkout.clone(),
            cancel: ctx.cancel_token(),
        }
    }

    pub fn scheduler(&self) -> &RetryScheduler {
        &self.scheduler
    }

    pub fn page(&self) -> &PageInteractor {
        &self.page
    }

    /// Errors raised after the session was cancelled are reported as
    /// [`CheckoutOutcome::Cancelled`].
    pub async fn run(&mut self, actions: &dyn PageActions) -> Result<CheckoutOutcome, CliError> {
        match self.run_steps(actions).await {
            Err(e) if self.cancel.is_cancelled() => {
                tracing::info!(target: "sniper.checkout", error = %e, "checkout interrupted by shutdown");
                self.scheduler.metrics_mut().update_state("cancelled");
                Ok(CheckoutOutcome::Cancelled)
            }
            result => result,
        }
    }

    async fn run_steps(
        &mut self,
        actions: &dyn PageActions,
    ) -> Result<CheckoutOutcome, CliError> {
        tracing::info!(target: "sniper.checkout", url = %self.url, "starting checkout");
        self.scheduler.metrics_mut().update_state("running");

        self.driver.navigate(&self.url).await?;
        if let Some((username, password)) = self.checkout.credentials() {
            tracing::info!(target: "sniper.checkout", username, "logging in");
            actions.login(&mut self.page, username, password).await?;
        }

        let mut cart = CartOperation {
            page: &mut self.page,
            actions,
        };
        if self.scheduler.execute_with_retry(&mut cart).await?.is_none() {
            let outcome = if self.cancel.is_cancelled() {
                CheckoutOutcome::Cancelled
            } else {
                CheckoutOutcome::Exhausted
            };
            tracing::warn!(target: "sniper.checkout", outcome = outcome.as_str(), "item never reached the cart");
            return Ok(outcome);
        }

        if let Some(code) = self.checkout.coupon_code.as_deref() {
            tracing::info!(target: "sniper.checkout", code, "applying coupon");
            actions.apply_coupon(&mut self.page, code).await?;
        }
        if self.checkout.store_credit > 0 {
            tracing::info!(target: "sniper.checkout", amount = self.checkout.store_credit, "applying store credit");
            actions
                .apply_store_credit(&mut self.page, self.checkout.store_credit)
                .await?;
        }
        actions.proceed_to_payment(&mut self.page).await?;

        if !self.page.complete_checkout_flow().await? {
            self.scheduler.metrics_mut().update_state("sold_out");
            return Ok(CheckoutOutcome::SoldOut);
        }

        tracing::info!(target: "sniper.checkout", "checkout reached the payment prompt");
        Ok(CheckoutOutcome::Completed)
    }
}
