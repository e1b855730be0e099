use std::sync::RwLock;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use sniper_core::api::{
    BrowserDriver, BrowserRestart, DriverError, DriverErrorKind, ElementHandle, ELEMENT_KEY,
};

use super::error::{from_error_body, from_reqwest};

const CSS_SELECTOR: &str = "css selector";

/// W3C WebDriver session spoken over HTTP (chromedriver, geckodriver, grid).
pub struct WebDriverClient {
    http: reqwest::Client,
    base_url: String,
    capabilities: Value,
    session_id: RwLock<Option<String>>,
    last_url: RwLock<Option<String>>,
}

impl WebDriverClient {
    pub fn new(base_url: &str, capabilities: Value, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build webdriver http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            capabilities,
            session_id: RwLock::new(None),
            last_url: RwLock::new(None),
        })
    }

    /// Create the client and open a browser session.
    pub async fn connect(
        base_url: &str,
        capabilities: Value,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Self::new(base_url, capabilities, timeout)?;
        client.start_session().await?;
        Ok(client)
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_session_id(&self, id: Option<String>) {
        *self.session_id.write().unwrap_or_else(|e| e.into_inner()) = id;
    }

    fn last_url(&self) -> Option<String> {
        self.last_url.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub async fn start_session(&self) -> anyhow::Result<String> {
        let url = format!("{}/session", self.base_url);
        let body = json!({ "capabilities": { "alwaysMatch": self.capabilities } });
        let value = self
            .send(Method::POST, &url, Some(body))
            .await
            .context("failed to create webdriver session")?;
        let id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .context("new session response has no sessionId")?
            .to_string();
        tracing::info!(target: "sniper.webdriver", session = %id, "browser session created");
        self.set_session_id(Some(id.clone()));
        Ok(id)
    }

    async fn send(&self, method: Method, url: &str, body: Option<Value>) -> Result<Value, DriverError> {
        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.map_err(|e| from_reqwest(e, url))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| from_reqwest(e, url))?;

        if !status.is_success() {
            return Err(from_error_body(status.as_u16(), url, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let mut parsed: Value = serde_json::from_str(&text).map_err(|e| {
            DriverError::new(
                DriverErrorKind::Other,
                format!("failed to decode response from {url}: {e}"),
            )
        })?;
        Ok(parsed.get_mut("value").map(Value::take).unwrap_or(Value::Null))
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, DriverError> {
        let id = self
            .session_id()
            .ok_or_else(|| DriverError::new(DriverErrorKind::Driver, "no active browser session"))?;
        let url = format!("{}/session/{}{}", self.base_url, id, path);
        self.send(method, &url, body).await
    }

    fn element_from(value: &Value) -> Result<ElementHandle, DriverError> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(ElementHandle::new)
            .ok_or_else(|| {
                DriverError::new(DriverErrorKind::Other, format!("not an element reference: {value}"))
            })
    }

    async fn delete_session(&self) -> Result<(), DriverError> {
        let Some(id) = self.session_id() else {
            return Ok(());
        };
        let url = format!("{}/session/{}", self.base_url, id);
        let result = self.send(Method::DELETE, &url, None).await.map(|_| ());
        self.set_session_id(None);
        result
    }
}

#[async_trait]
impl BrowserDriver for WebDriverClient {
    fn name(&self) -> &str {
        "webdriver"
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        *self.last_url.write().unwrap_or_else(|e| e.into_inner()) = Some(url.to_string());
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<Option<ElementHandle>, DriverError> {
        let body = json!({ "using": CSS_SELECTOR, "value": selector });
        match self.command(Method::POST, "/element", Some(body)).await {
            Ok(value) => Self::element_from(&value).map(Some),
            Err(e) if e.kind() == DriverErrorKind::NoSuchElement => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>, DriverError> {
        let body = json!({ "using": CSS_SELECTOR, "value": selector });
        let value = self.command(Method::POST, "/elements", Some(body)).await?;
        value
            .as_array()
            .map(|items| items.iter().map(Self::element_from).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        let path = format!("/element/{}/click", element.id());
        self.command(Method::POST, &path, Some(json!({}))).await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        let path = format!("/element/{}/value", element.id());
        self.command(Method::POST, &path, Some(json!({ "text": text })))
            .await?;
        Ok(())
    }

    async fn element_text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        let path = format!("/element/{}/text", element.id());
        let value = self.command(Method::GET, &path, None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn refresh(&self) -> Result<(), DriverError> {
        self.command(Method::POST, "/refresh", Some(json!({}))).await?;
        Ok(())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.delete_session().await
    }
}

#[async_trait]
impl BrowserRestart for WebDriverClient {
    /// Replace the session and go back to the page we were on.
    async fn restart(&self) -> anyhow::Result<()> {
        if let Err(e) = self.delete_session().await {
            tracing::warn!(target: "sniper.webdriver", error = %e, "closing old session failed");
        }
        self.start_session().await?;
        if let Some(url) = self.last_url() {
            self.navigate(&url)
                .await
                .with_context(|| format!("failed to reopen {url}"))?;
        }
        Ok(())
    }
}
