//! Operation argument types
//!
//! Deserialized from the caller's JSON and validated before any session is
//! acquired.

use serde::Deserialize;

use crate::actions::ActionRequest;
use crate::config::Config;
use crate::session::EngineKind;
use crate::{Error, Result};

/// Arguments for `scrape_page`
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeArgs {
    pub url: String,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default, alias = "waitFor")]
    pub wait_for: Option<String>,
    #[serde(default)]
    pub screenshot: bool,
}

/// Arguments for `test_react_app` / `run_action_sequence`
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceArgs {
    pub url: String,
    pub actions: Vec<ActionRequest>,
    #[serde(default)]
    pub engine: Option<String>,
}

/// Arguments for `get_page_info`
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfoArgs {
    pub url: String,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default, alias = "includePerformance")]
    pub include_performance: bool,
}

/// Arguments for `wait_for_element`
#[derive(Debug, Clone, Deserialize)]
pub struct WaitForElementArgs {
    pub url: String,
    pub selector: String,
    /// Timeout in milliseconds
    #[serde(default, alias = "timeoutMs", alias = "timeout_ms")]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub engine: Option<String>,
}

/// Arguments for `run_package_script`
#[derive(Debug, Clone, Deserialize)]
pub struct RunScriptArgs {
    pub script: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

/// Validate and normalize a URL argument
pub fn validated_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_argument("url must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Resolve the engine for a request
///
/// The request's engine name wins; otherwise the configured default. An
/// unknown name is `EngineUnavailable`, decided before any process starts.
pub fn resolve_engine(requested: Option<&str>, config: &Config) -> Result<EngineKind> {
    match requested {
        Some(name) => name.parse(),
        None => config.default_engine.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_url_rejects_empty() {
        assert!(matches!(
            validated_url("   "),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(
            validated_url(" https://example.com ").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_resolve_engine_request_wins() {
        let config = Config::default();
        assert_eq!(
            resolve_engine(Some("firefox"), &config).unwrap(),
            EngineKind::Firefox
        );
        assert_eq!(resolve_engine(None, &config).unwrap(), EngineKind::Chromium);
    }

    #[test]
    fn test_resolve_engine_unknown_is_unavailable() {
        let config = Config::default();
        assert!(matches!(
            resolve_engine(Some("netscape"), &config),
            Err(Error::EngineUnavailable(_))
        ));
    }

    #[test]
    fn test_scrape_args_aliases() {
        let args: ScrapeArgs = serde_json::from_value(serde_json::json!({
            "url": "https://example.com",
            "waitFor": "2000",
            "screenshot": true
        }))
        .unwrap();

        assert_eq!(args.wait_for.as_deref(), Some("2000"));
        assert!(args.screenshot);
        assert!(args.selector.is_none());
    }
}
