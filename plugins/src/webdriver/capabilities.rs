use serde_json::{json, Value};
use sniper_core::api::{BrowserConfig, BrowserMode, BrowserType};

const CHROME_ARGS: [&str; 4] = [
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--window-size=1920,1080",
];

/// `alwaysMatch` capabilities for a new session.
pub fn build_capabilities(cfg: &BrowserConfig) -> Value {
    match cfg.browser_type {
        BrowserType::Chrome => {
            let mut args: Vec<String> = Vec::new();
            if cfg.mode == BrowserMode::Headless {
                args.push("--headless=new".to_string());
            }
            args.extend(CHROME_ARGS.iter().map(|a| a.to_string()));
            if let Some(profile) = cfg.profile_path.as_deref() {
                args.push(format!("user-data-dir={profile}"));
            }
            json!({
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args },
            })
        }
        BrowserType::Firefox => {
            let mut args: Vec<String> = Vec::new();
            if cfg.mode == BrowserMode::Headless {
                args.push("--headless".to_string());
            }
            if let Some(profile) = cfg.profile_path.as_deref() {
                args.push("-profile".to_string());
                args.push(profile.to_string());
            }
            json!({
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": args },
            })
        }
    }
}
