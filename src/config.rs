//! Configuration management for Scout-Oxide

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default engine when a request does not name one
    pub default_engine: String,

    /// Chromium executable path override
    pub chromium_path: Option<String>,

    /// Firefox executable path override
    pub firefox_path: Option<String>,

    /// WebKit executable path (required to use the webkit engine)
    pub webkit_path: Option<String>,

    /// Directory for screenshot artifacts (defaults to the system temp dir)
    pub artifact_dir: Option<PathBuf>,

    /// Navigation timeout in milliseconds
    pub navigation_timeout: u64,

    /// Default per-action timeout in milliseconds
    pub action_timeout: u64,

    /// Default wait-for-element timeout in milliseconds
    pub wait_timeout: u64,

    /// Engine startup deadline in milliseconds
    pub launch_timeout: u64,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_engine: "chromium".to_string(),
            chromium_path: None,
            firefox_path: None,
            webkit_path: None,
            artifact_dir: None,
            navigation_timeout: 30000,
            action_timeout: 5000,
            wait_timeout: 10000,
            launch_timeout: 10000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(engine) = env::var("SCOUT_DEFAULT_ENGINE") {
            config.default_engine = engine;
        }

        if let Ok(path) = env::var("SCOUT_CHROMIUM_PATH") {
            config.chromium_path = Some(path);
        }

        if let Ok(path) = env::var("SCOUT_FIREFOX_PATH") {
            config.firefox_path = Some(path);
        }

        if let Ok(path) = env::var("SCOUT_WEBKIT_PATH") {
            config.webkit_path = Some(path);
        }

        if let Ok(dir) = env::var("SCOUT_ARTIFACT_DIR") {
            config.artifact_dir = Some(PathBuf::from(dir));
        }

        if let Ok(timeout) = env::var("SCOUT_NAVIGATION_TIMEOUT") {
            config.navigation_timeout = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid SCOUT_NAVIGATION_TIMEOUT"))?;
        }

        if let Ok(timeout) = env::var("SCOUT_ACTION_TIMEOUT") {
            config.action_timeout = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid SCOUT_ACTION_TIMEOUT"))?;
        }

        if let Ok(timeout) = env::var("SCOUT_WAIT_TIMEOUT") {
            config.wait_timeout = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid SCOUT_WAIT_TIMEOUT"))?;
        }

        if let Ok(timeout) = env::var("SCOUT_LAUNCH_TIMEOUT") {
            config.launch_timeout = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid SCOUT_LAUNCH_TIMEOUT"))?;
        }

        if let Ok(log_level) = env::var("SCOUT_LOG_LEVEL") {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_engine, "chromium");
        assert_eq!(config.navigation_timeout, 30000);
        assert_eq!(config.action_timeout, 5000);
        assert!(config.artifact_dir.is_none());
    }

    #[test]
    fn test_from_toml() {
        let config: Config = toml::from_str(
            r#"
            default_engine = "firefox"
            action_timeout = 2500
            artifact_dir = "/tmp/scout-artifacts"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_engine, "firefox");
        assert_eq!(config.action_timeout, 2500);
        assert_eq!(
            config.artifact_dir,
            Some(PathBuf::from("/tmp/scout-artifacts"))
        );
        // Unspecified fields keep their defaults
        assert_eq!(config.navigation_timeout, 30000);
    }
}
