use serde_json::Value;
use sniper_core::api::{DriverError, DriverErrorKind};

const BODY_PREVIEW_LIMIT: usize = 512;

/// Map a W3C WebDriver error code onto the closed driver error set.
pub fn kind_for_w3c_error(code: &str) -> DriverErrorKind {
    match code {
        "no such element" => DriverErrorKind::NoSuchElement,
        "stale element reference" => DriverErrorKind::StaleElement,
        "element click intercepted" => DriverErrorKind::ClickIntercepted,
        "timeout" | "script timeout" => DriverErrorKind::Timeout,
        "invalid session id"
        | "no such window"
        | "session not created"
        | "unknown error"
        | "element not interactable" => DriverErrorKind::Driver,
        _ => DriverErrorKind::Other,
    }
}

pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> DriverError {
    let kind = if err.is_timeout() {
        DriverErrorKind::Timeout
    } else if err.is_connect() || err.is_request() || err.is_body() {
        DriverErrorKind::Driver
    } else {
        DriverErrorKind::Other
    };
    DriverError::new(kind, format!("{url}: {err}"))
}

/// Error response body: `{"value": {"error": "...", "message": "..."}}`.
pub(crate) fn from_error_body(status: u16, url: &str, body: &str) -> DriverError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let error = parsed
        .as_ref()
        .and_then(|v| v.pointer("/value/error"))
        .and_then(Value::as_str);
    let Some(code) = error else {
        return DriverError::new(
            DriverErrorKind::Driver,
            format!("status={status} url={url}: {}", preview_body(body)),
        );
    };
    let message = parsed
        .as_ref()
        .and_then(|v| v.pointer("/value/message"))
        .and_then(Value::as_str)
        .unwrap_or(code);
    DriverError::new(kind_for_w3c_error(code), format!("{code}: {message}"))
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().count() > BODY_PREVIEW_LIMIT {
        out.push_str("...");
    }
    out
}
