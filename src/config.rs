use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::{DriverError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub interception: InterceptionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub disable_images: bool,
    pub args: Vec<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptionConfig {
    /// Successful calls slower than this are logged at info level
    pub threshold_ms: u64,
    /// Cap on collection entries shown in a log line; `None` shows all
    pub max_rendered_items: Option<usize>,
    /// Default `tracing` filter for the binary, overridden by `RUST_LOG`
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DriverError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }
}

impl BrowserConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl InterceptionConfig {
    pub fn threshold(&self) -> Duration {
        Duration::from_millis(self.threshold_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            disable_images: false,
            args: vec![],
            timeout_ms: 30000,
        }
    }
}

impl Default for InterceptionConfig {
    fn default() -> Self {
        Self {
            threshold_ms: 500,
            max_rendered_items: None,
            log_level: "info".to_string(),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(
            r#"{ "interception": { "threshold_ms": 0 }, "browser": { "headless": false } }"#,
        )
        .unwrap();

        assert_eq!(config.interception.threshold(), Duration::ZERO);
        assert_eq!(config.interception.log_level, "info");
        assert!(!config.browser.headless);
        assert_eq!(config.browser.viewport, Viewport::default());
        assert_eq!(config.browser.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = Config::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, DriverError::Serialization(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::from_json_file("/nonexistent/driver-interceptor.json").unwrap_err();
        assert!(matches!(err, DriverError::Io(_)));
    }
}
