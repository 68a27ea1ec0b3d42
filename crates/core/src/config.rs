use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::paths::Paths;

/// Tool configuration, persisted as JSON at `~/.snowtask/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Target task-list URL, including the encoded sysparm filter query.
    #[serde(default)]
    pub url: String,
    /// Login username, typed into the username field verbatim.
    #[serde(default)]
    pub username: String,
    /// Credential service name used when looking up the password.
    #[serde(default = "default_service")]
    pub service: String,
    /// Wall-clock budget in milliseconds shared by every waiting stage.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Browser engine: "edge" or "chrome".
    #[serde(default = "default_browser")]
    pub browser: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_service() -> String {
    "ServiceNow".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_browser() -> String {
    "edge".to_string()
}

fn default_headless() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            service: default_service(),
            timeout_ms: default_timeout_ms(),
            browser: default_browser(),
            headless: default_headless(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.service, "ServiceNow");
        assert_eq!(cfg.timeout_ms, 10_000);
        assert_eq!(cfg.browser, "edge");
        assert!(cfg.headless);
        assert!(cfg.url.is_empty());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let raw = r#"{
  "url": "https://example.service-now.com/task_list.do",
  "username": "a.user"
}"#;
        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.url, "https://example.service-now.com/task_list.do");
        assert_eq!(cfg.username, "a.user");
        assert_eq!(cfg.timeout_ms, 10_000);
    }

    #[test]
    fn test_camel_case_keys() {
        let raw = r#"{"timeoutMs": 20000, "browser": "chrome", "headless": false}"#;
        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.timeout_ms, 20_000);
        assert_eq!(cfg.browser, "chrome");
        assert!(!cfg.headless);
    }

    #[test]
    fn test_round_trip() {
        let mut cfg = Config::default();
        cfg.url = "https://example.com".into();
        cfg.timeout_ms = 20_000;
        let json = serde_json::to_string(&cfg).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.url, cfg.url);
        assert_eq!(back.timeout_ms, 20_000);
    }
}
