#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use sniper_core::api::{
    AppConfig, BrowserDriver, DriverError, DriverErrorKind, ElementHandle, InteractionError,
    PageActions, PageInteractor, RecoveryConfig,
};
use tempfile::TempDir;

#[derive(Default, Clone)]
struct FakeElement {
    text: String,
    hidden_lookups: u32,
    click_errors: VecDeque<DriverErrorKind>,
}

#[derive(Default)]
struct Inner {
    elements: HashMap<String, FakeElement>,
    clicks: Vec<String>,
    typed: Vec<(String, String)>,
    visited: Vec<String>,
    scripts: usize,
    refreshes: usize,
    quits: usize,
}

/// In-memory browser. Element handles are the selectors that matched.
#[derive(Default)]
pub struct ScriptedDriver {
    inner: Mutex<Inner>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        f(&mut self.inner.lock().unwrap())
    }

    pub fn add(&self, selector: &str) {
        self.add_with_text(selector, "");
    }

    pub fn add_with_text(&self, selector: &str, text: &str) {
        self.with(|i| {
            i.elements.insert(
                selector.to_string(),
                FakeElement {
                    text: text.to_string(),
                    ..FakeElement::default()
                },
            );
        });
    }

    /// The element only matches after `lookups` unsuccessful finds.
    pub fn appear_after(&self, selector: &str, lookups: u32) {
        self.with(|i| {
            i.elements.entry(selector.to_string()).or_default().hidden_lookups = lookups;
        });
    }

    pub fn fail_clicks(&self, selector: &str, kinds: &[DriverErrorKind]) {
        self.with(|i| {
            i.elements
                .entry(selector.to_string())
                .or_default()
                .click_errors
                .extend(kinds.iter().copied());
        });
    }

    pub fn clicks(&self) -> Vec<String> {
        self.with(|i| i.clicks.clone())
    }

    pub fn typed(&self) -> Vec<(String, String)> {
        self.with(|i| i.typed.clone())
    }

    pub fn visited(&self) -> Vec<String> {
        self.with(|i| i.visited.clone())
    }

    pub fn refreshes(&self) -> usize {
        self.with(|i| i.refreshes)
    }

    pub fn quits(&self) -> usize {
        self.with(|i| i.quits)
    }
}

#[async_trait]
impl BrowserDriver for ScriptedDriver {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.with(|i| i.visited.push(url.to_string()));
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<Option<ElementHandle>, DriverError> {
        Ok(self.with(|i| match i.elements.get_mut(selector) {
            Some(el) if el.hidden_lookups > 0 => {
                el.hidden_lookups -= 1;
                None
            }
            Some(_) => Some(ElementHandle::new(selector)),
            None => None,
        }))
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>, DriverError> {
        Ok(self.find_element(selector).await?.into_iter().collect())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.with(|i| {
            let Some(el) = i.elements.get_mut(element.id()) else {
                return Err(DriverError::new(DriverErrorKind::StaleElement, element.id()));
            };
            if let Some(kind) = el.click_errors.pop_front() {
                return Err(DriverError::new(kind, format!("click on {element} failed")));
            }
            i.clicks.push(element.id().to_string());
            Ok(())
        })
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.with(|i| i.typed.push((element.id().to_string(), text.to_string())));
        Ok(())
    }

    async fn element_text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        self.with(|i| {
            i.elements
                .get(element.id())
                .map(|el| el.text.clone())
                .ok_or_else(|| DriverError::new(DriverErrorKind::StaleElement, element.id()))
        })
    }

    async fn execute_script(&self, _script: &str, _args: Vec<Value>) -> Result<Value, DriverError> {
        self.with(|i| i.scripts += 1);
        Ok(Value::Null)
    }

    async fn refresh(&self) -> Result<(), DriverError> {
        self.with(|i| i.refreshes += 1);
        Ok(())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.with(|i| i.quits += 1);
        Ok(())
    }
}

pub const ADD_TO_CART: &str = "#add-to-cart";
pub const GO_TO_CHECKOUT: &str = "#checkout";
pub const COUPON_FIELD: &str = "#coupon";
pub const CREDIT_FIELD: &str = "#credit";
pub const PROCEED: &str = "#proceed";

/// Minimal store: the cart button shows up once stock is in.
#[derive(Default)]
pub struct FakeStore {
    pub calls: Mutex<Vec<String>>,
}

impl FakeStore {
    fn log(&self, step: &str) {
        self.calls.lock().unwrap().push(step.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageActions for FakeStore {
    async fn login(
        &self,
        page: &mut PageInteractor,
        username: &str,
        password: &str,
    ) -> Result<(), InteractionError> {
        self.log("login");
        page.type_into("#handle", username).await?;
        page.type_into("#password", password).await
    }

    async fn add_to_cart(&self, page: &mut PageInteractor) -> Result<bool, InteractionError> {
        self.log("add_to_cart");
        if page.probe(ADD_TO_CART).await?.is_none() {
            return Ok(false);
        }
        page.click(ADD_TO_CART, "add to cart").await?;
        Ok(true)
    }

    async fn go_to_checkout(&self, page: &mut PageInteractor) -> Result<(), InteractionError> {
        self.log("go_to_checkout");
        page.click(GO_TO_CHECKOUT, "checkout").await
    }

    async fn apply_coupon(
        &self,
        page: &mut PageInteractor,
        code: &str,
    ) -> Result<(), InteractionError> {
        self.log("apply_coupon");
        page.type_into(COUPON_FIELD, code).await
    }

    async fn apply_store_credit(
        &self,
        page: &mut PageInteractor,
        amount: u32,
    ) -> Result<(), InteractionError> {
        self.log("apply_store_credit");
        page.type_into(CREDIT_FIELD, &amount.to_string()).await
    }

    async fn proceed_to_payment(&self, page: &mut PageInteractor) -> Result<(), InteractionError> {
        self.log("proceed_to_payment");
        page.click(PROCEED, "proceed to payment").await
    }
}

/// Config with fast retries and metrics written under `dir`.
pub fn test_config(dir: &TempDir) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.retry.base_interval = 1.0;
    cfg.retry.max_retries = 10;
    cfg.retry.max_attempts_per_minute = 100;
    cfg.recovery = RecoveryConfig {
        wait_delay_secs: 1,
        refresh_delay_secs: 1,
        restart_delay_secs: 1,
    };
    cfg.browser.wait_timeout_secs = 2;
    cfg.metrics.path = dir.path().join("metrics.json").display().to_string();
    cfg
}
