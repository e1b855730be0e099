use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::Value;
use sniper_core::api::{
    BrowserDriver, CheckoutSelectors, DriverError, ElementHandle, PageActions, PageInteractor,
    RecoveryConfig, RecoveryManager,
};
use sniper_plugins::store::{StoreActions, StoreSelectors};

/// Page with a fixed set of elements; records clicks and typed text.
#[derive(Default)]
struct StaticPage {
    texts: HashMap<String, String>,
    log: Mutex<Vec<String>>,
}

impl StaticPage {
    fn with(selectors: &[&str]) -> Self {
        Self {
            texts: selectors
                .iter()
                .map(|s| (s.to_string(), String::new()))
                .collect(),
            log: Mutex::new(Vec::new()),
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserDriver for StaticPage {
    fn name(&self) -> &str {
        "static"
    }
    async fn navigate(&self, _url: &str) -> Result<(), DriverError> {
        Ok(())
    }
    async fn find_element(&self, selector: &str) -> Result<Option<ElementHandle>, DriverError> {
        Ok(self
            .texts
            .contains_key(selector)
            .then(|| ElementHandle::new(selector)))
    }
    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>, DriverError> {
        Ok(self.find_element(selector).await?.into_iter().collect())
    }
    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.log.lock().unwrap().push(format!("click {element}"));
        Ok(())
    }
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.log.lock().unwrap().push(format!("type {element} {text}"));
        Ok(())
    }
    async fn element_text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        Ok(self.texts.get(element.id()).cloned().unwrap_or_default())
    }
    async fn execute_script(&self, _script: &str, _args: Vec<Value>) -> Result<Value, DriverError> {
        Ok(Value::Null)
    }
    async fn refresh(&self) -> Result<(), DriverError> {
        Ok(())
    }
    async fn quit(&self) -> Result<(), DriverError> {
        Ok(())
    }
}

fn interactor(page: &Arc<StaticPage>) -> PageInteractor {
    let recovery = RecoveryManager::new(page.clone(), RecoveryConfig::default());
    PageInteractor::new(page.clone(), recovery, Duration::from_secs(1))
}

#[tokio::test(start_paused = true)]
async fn add_to_cart_waits_for_the_button() {
    let sel = StoreSelectors::default();
    let actions = StoreActions::default();

    let empty = Arc::new(StaticPage::default());
    assert!(!actions.add_to_cart(&mut interactor(&empty)).await.unwrap());
    assert!(empty.log().is_empty());

    let stocked = Arc::new(StaticPage::with(&[sel.add_to_cart.as_str()]));
    assert!(actions.add_to_cart(&mut interactor(&stocked)).await.unwrap());
    assert_eq!(stocked.log(), vec![format!("click {}", sel.add_to_cart)]);
}

#[tokio::test(start_paused = true)]
async fn out_of_stock_toast_blocks_add_to_cart() {
    let sel = StoreSelectors::default();
    let toast = CheckoutSelectors::default().out_of_stock_msg;
    let mut page = StaticPage::with(&[sel.add_to_cart.as_str()]);
    page.texts.insert(toast, "Unfortunately this item is out of stock".into());
    let page = Arc::new(page);

    let actions = StoreActions::default();
    assert!(!actions.add_to_cart(&mut interactor(&page)).await.unwrap());
    assert!(page.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn login_fills_both_fields_then_submits() {
    let sel = StoreSelectors::default();
    let page = Arc::new(StaticPage::with(&[
        sel.login_handle.as_str(),
        sel.login_password.as_str(),
        sel.login_submit.as_str(),
    ]));

    StoreActions::default()
        .login(&mut interactor(&page), "citizen", "hunter2")
        .await
        .unwrap();

    assert_eq!(
        page.log(),
        vec![
            "type #handle citizen".to_string(),
            "type #password hunter2".to_string(),
            "click button[type='submit']".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn store_credit_is_typed_as_whole_units() {
    let sel = StoreSelectors::default();
    let page = Arc::new(StaticPage::with(&[
        sel.credit_field.as_str(),
        sel.credit_apply.as_str(),
    ]));

    StoreActions::default()
        .apply_store_credit(&mut interactor(&page), 1385)
        .await
        .unwrap();

    assert_eq!(
        page.log(),
        vec![
            format!("type {} 1385", sel.credit_field),
            format!("click {}", sel.credit_apply),
        ]
    );
}
