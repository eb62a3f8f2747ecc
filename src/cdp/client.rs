//! CDP client implementation
//!
//! High-level client with typed methods over a raw connection.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::sync::Arc;
use tracing::{debug, info};

use super::traits::{CdpClient, CdpConnection, EvaluationResult, NavigationResult};
use super::types::{EvaluateParams, EvaluateResponse, RemoteObject};
use crate::Error;

/// CDP client implementation
#[derive(Debug, Clone)]
pub struct CdpClientImpl {
    /// Underlying CDP connection
    connection: Arc<dyn CdpConnection>,
}

impl CdpClientImpl {
    /// Create a new CDP client
    pub fn new(connection: Arc<dyn CdpConnection>) -> Self {
        Self { connection }
    }

    /// Parse remote object value to evaluation result
    fn parse_remote_object(obj: &RemoteObject) -> EvaluationResult {
        match obj.r#type.as_str() {
            "string" => EvaluationResult::String(
                obj.value
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
            ),
            "number" => {
                EvaluationResult::Number(obj.value.as_ref().and_then(|v| v.as_f64()).unwrap_or(0.0))
            }
            "boolean" => EvaluationResult::Bool(
                obj.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false),
            ),
            "undefined" | "null" => EvaluationResult::Null,
            "object" | "function" | "bigint" | "symbol" => {
                EvaluationResult::Object(obj.value.clone().unwrap_or(serde_json::Value::Null))
            }
            _ => EvaluationResult::Null,
        }
    }
}

#[async_trait]
impl CdpClient for CdpClientImpl {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        info!("Navigating to {}", url);

        let result = self
            .call_method("Page.navigate", serde_json::json!({ "url": url }))
            .await
            .map_err(|e| Error::navigation_failed(format!("{}: {}", url, e)))?;

        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str()) {
            if !error_text.is_empty() {
                return Err(Error::navigation_failed(format!("{}: {}", url, error_text)));
            }
        }

        // Wait for page load by polling document.readyState; more reliable
        // than the load event, which can fire before we attach.
        let max_attempts = 50;
        let mut page_loaded = false;

        for attempt in 0..max_attempts {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            match self.evaluate("document.readyState", false).await {
                Ok(EvaluationResult::String(state)) if state == "complete" => {
                    debug!("Page loaded after {} poll(s)", attempt + 1);
                    page_loaded = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("readyState poll {} failed: {}", attempt + 1, e);
                }
            }
        }

        if !page_loaded {
            debug!("Page load polling window elapsed, continuing anyway");
        }

        let final_url = match self.evaluate("window.location.href", false).await {
            Ok(EvaluationResult::String(href)) => href,
            _ => url.to_string(),
        };

        Ok(NavigationResult {
            url: final_url,
            is_loaded: page_loaded,
        })
    }

    /// Evaluate JavaScript in the page
    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, Error> {
        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(await_promise),
            return_by_value: Some(true),
        };

        let result = self
            .call_method(
                "Runtime.evaluate",
                serde_json::to_value(params)
                    .map_err(|e| Error::cdp(format!("Serialization error: {}", e)))?,
            )
            .await?;

        let response: EvaluateResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse evaluate response: {}", e)))?;

        if let Some(exception) = response.exception_details {
            return Err(Error::script_execution_failed(
                exception
                    .get("exception")
                    .and_then(|e| e.get("description"))
                    .and_then(|d| d.as_str())
                    .unwrap_or("Unknown error")
                    .to_string(),
            ));
        }

        Ok(Self::parse_remote_object(&response.result))
    }

    /// Capture a full-page PNG screenshot
    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        debug!("Capturing screenshot");

        let params = serde_json::json!({
            "format": "png",
            "captureBeyondViewport": true,
        });

        let result = self.call_method("Page.captureScreenshot", params).await?;

        let data = result
            .get("data")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::cdp("No data in screenshot result"))?;

        BASE64
            .decode(data)
            .map_err(|e| Error::cdp(format!("Failed to decode screenshot: {}", e)))
    }

    /// Enable a domain
    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        let method = format!("{}.enable", domain);
        let _ = self.call_method(&method, serde_json::json!({})).await?;
        Ok(())
    }

    /// Call a raw CDP method
    async fn call_method(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, Error> {
        let response = self.connection.send_command(method, params).await?;

        if let Some(error) = response.error {
            return Err(Error::cdp(format!(
                "{} failed: {} (code {})",
                method, error.message, error.code
            )));
        }

        Ok(response.result)
    }

    /// Close the underlying connection
    async fn close(&self) -> Result<(), Error> {
        self.connection.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_object_string() {
        let obj = RemoteObject {
            r#type: "string".to_string(),
            value: Some(serde_json::json!("test")),
            ..Default::default()
        };

        let result = CdpClientImpl::parse_remote_object(&obj);
        assert!(matches!(result, EvaluationResult::String(s) if s == "test"));
    }

    #[test]
    fn test_parse_remote_object_number() {
        let obj = RemoteObject {
            r#type: "number".to_string(),
            value: Some(serde_json::json!(42.5)),
            ..Default::default()
        };

        let result = CdpClientImpl::parse_remote_object(&obj);
        assert!(matches!(result, EvaluationResult::Number(n) if n == 42.5));
    }

    #[test]
    fn test_parse_remote_object_bool() {
        let obj = RemoteObject {
            r#type: "boolean".to_string(),
            value: Some(serde_json::json!(true)),
            ..Default::default()
        };

        let result = CdpClientImpl::parse_remote_object(&obj);
        assert!(matches!(result, EvaluationResult::Bool(true)));
    }

    #[test]
    fn test_parse_remote_object_undefined() {
        let obj = RemoteObject {
            r#type: "undefined".to_string(),
            ..Default::default()
        };

        let result = CdpClientImpl::parse_remote_object(&obj);
        assert!(matches!(result, EvaluationResult::Null));
    }

    #[test]
    fn test_parse_remote_object_object() {
        let obj = RemoteObject {
            r#type: "object".to_string(),
            value: Some(serde_json::json!({"a": 1})),
            ..Default::default()
        };

        let result = CdpClientImpl::parse_remote_object(&obj);
        assert!(matches!(result, EvaluationResult::Object(_)));
    }
}
