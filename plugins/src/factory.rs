use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sniper_core::api::{AppConfig, BrowserDriver, BrowserRestart, PageActions};

use crate::store::StoreActions;
use crate::webdriver::{build_capabilities, WebDriverClient};

/// Upper bound for a single WebDriver HTTP call; element waits poll on top of this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A live browser session, usable both as the driver and as the restart hook.
pub struct BrowserSession {
    pub driver: Arc<dyn BrowserDriver>,
    pub restart: Arc<dyn BrowserRestart>,
}

pub async fn build_browser(cfg: &AppConfig) -> Result<BrowserSession> {
    let caps = build_capabilities(&cfg.browser);
    tracing::info!(
        target: "sniper.webdriver",
        url = %cfg.browser.webdriver_url,
        browser = cfg.browser.browser_type.as_str(),
        mode = cfg.browser.mode.as_str(),
        "connecting to webdriver"
    );
    let client = Arc::new(WebDriverClient::connect(&cfg.browser.webdriver_url, caps, REQUEST_TIMEOUT).await?);
    Ok(BrowserSession {
        driver: client.clone(),
        restart: client,
    })
}

pub fn build_actions() -> Box<dyn PageActions> {
    Box::new(StoreActions::default())
}
