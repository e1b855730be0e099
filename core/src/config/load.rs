use std::path::{Path, PathBuf};

use super::types::{AppConfig, ConfigOverrides};
use crate::error::ConfigError;

/// Get the default sniper data directory: ~/.sniper
pub fn get_sniper_data_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(home).join(".sniper"))
}

/// Parse a single config file. `.json` files are read as JSON, anything else as TOML.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolve the config file and apply environment overrides.
///
/// Priority: explicit path, then `~/.sniper/config.toml`, then `./config.toml`,
/// then built-in defaults. A missing explicit path falls back to the defaults.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let home_config = get_sniper_data_dir().ok().map(|d| d.join("config.toml"));
    let local_config = Path::new("config.toml");

    let mut cfg = match explicit {
        Some(path) if path.exists() => load_from_path(path)?,
        Some(path) => {
            tracing::warn!(
                target: "sniper.config",
                path = %path.display(),
                "config file not found, using defaults"
            );
            AppConfig::default()
        }
        None => match home_config.filter(|p| p.exists()) {
            Some(p) => load_from_path(&p)?,
            None if local_config.exists() => load_from_path(local_config)?,
            None => AppConfig::default(),
        },
    };

    if let Ok(v) = std::env::var("SNIPER_WEBDRIVER_URL") {
        if !v.trim().is_empty() {
            cfg.browser.webdriver_url = v;
        }
    }
    if let Ok(v) = std::env::var("SNIPER_METRICS_PATH") {
        if !v.trim().is_empty() {
            cfg.metrics.path = v;
        }
    }

    Ok(cfg)
}

/// Load, merge command-line overrides, then validate.
pub fn load_with_overrides(
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<AppConfig, ConfigError> {
    let mut cfg = load(explicit)?;
    cfg.apply_overrides(overrides);
    validate(&cfg)?;
    Ok(cfg)
}

pub fn validate(cfg: &AppConfig) -> Result<(), ConfigError> {
    let retry = &cfg.retry;
    if !retry.base_interval.is_finite() || retry.base_interval <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "retry.base_interval must be > 0 (got {})",
            retry.base_interval
        )));
    }
    if retry.max_attempts_per_minute == 0 {
        return Err(ConfigError::Invalid(
            "retry.max_attempts_per_minute must be > 0".into(),
        ));
    }
    if cfg.browser.webdriver_url.trim().is_empty() {
        return Err(ConfigError::Invalid("browser.webdriver_url is empty".into()));
    }
    if cfg.browser.wait_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "browser.wait_timeout_secs must be > 0".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BrowserMode, BrowserType};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn json_file_is_parsed_with_defaults_for_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"retry": {"max_retries": 7}, "browser": {"browser_type": "firefox"}, "debug": true}"#,
        )
        .unwrap();

        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.retry.max_retries, 7);
        assert_eq!(cfg.retry.base_interval, 5.0);
        assert_eq!(cfg.retry.max_attempts_per_minute, 10);
        assert_eq!(cfg.browser.browser_type, BrowserType::Firefox);
        assert_eq!(cfg.browser.mode, BrowserMode::Headless);
        assert!(cfg.debug);
    }

    #[test]
    fn toml_file_is_parsed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sniper.toml");
        std::fs::write(
            &path,
            "log_level = \"warn\"\n[retry]\nbase_interval = 2.5\n[browser]\nmode = \"headed\"\nprofile_path = \"/tmp/profile\"\n",
        )
        .unwrap();

        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.retry.base_interval, 2.5);
        assert_eq!(cfg.browser.mode, BrowserMode::Headed);
        assert_eq!(cfg.browser.profile_path.as_deref(), Some("/tmp/profile"));
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn cli_overrides_win_field_by_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"retry": {"base_interval": 9.0, "max_retries": 3, "max_attempts_per_minute": 4}}"#,
        )
        .unwrap();

        let overrides = ConfigOverrides {
            base_interval: Some(1.5),
            max_retries: None,
            browser_mode: Some(BrowserMode::Headed),
        };
        let cfg = load_with_overrides(Some(&path), &overrides).unwrap();
        assert_eq!(cfg.retry.base_interval, 1.5);
        assert_eq!(cfg.retry.max_retries, 3);
        assert_eq!(cfg.retry.max_attempts_per_minute, 4);
        assert_eq!(cfg.browser.mode, BrowserMode::Headed);
    }

    #[test]
    fn missing_explicit_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load(Some(&dir.path().join("nope.json"))).unwrap();
        assert_eq!(cfg.retry, crate::config::RetryConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_from_path(&path),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn validation_rejects_non_positive_values() {
        let mut cfg = AppConfig::default();
        cfg.retry.base_interval = 0.0;
        assert!(validate(&cfg).is_err());

        let mut cfg = AppConfig::default();
        cfg.retry.max_attempts_per_minute = 0;
        assert!(validate(&cfg).is_err());

        let mut cfg = AppConfig::default();
        cfg.retry.max_retries = 0;
        assert!(validate(&cfg).is_ok());
    }
}
