//! CDP-backed page handle
//!
//! Implements `PageHandle` over a `CdpClient`. Element operations are page
//! scripts from [`super::scripts`]; the missing-element sentinel is mapped
//! to `ElementNotFound` here so callers never see it.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::scripts;
use super::traits::{PageHandle, PageSummary, PerformanceMetrics};
use crate::cdp::traits::{CdpClient, EvaluationResult};
use crate::Error;

/// Page handle over a live CDP target
#[derive(Debug, Clone)]
pub struct CdpPage {
    client: Arc<dyn CdpClient>,
    navigation_timeout: Duration,
}

impl CdpPage {
    /// Create a new page handle
    pub fn new(client: Arc<dyn CdpClient>, navigation_timeout: Duration) -> Self {
        Self {
            client,
            navigation_timeout,
        }
    }

    /// The underlying CDP client
    pub fn client(&self) -> Arc<dyn CdpClient> {
        Arc::clone(&self.client)
    }

    /// Evaluate an element script and map the missing sentinel
    async fn eval_element(&self, selector: &str, script: &str) -> Result<String, Error> {
        match self.client.evaluate(script, false).await? {
            EvaluationResult::String(s) if s == scripts::MISSING => {
                Err(Error::element_not_found(selector.to_string()))
            }
            EvaluationResult::String(s) => Ok(s),
            other => Err(Error::cdp(format!(
                "unexpected evaluation result for {}: {:?}",
                selector, other
            ))),
        }
    }
}

#[async_trait]
impl PageHandle for CdpPage {
    async fn navigate(&self, url: &str) -> Result<(), Error> {
        debug!("Navigating page to {}", url);

        match tokio::time::timeout(self.navigation_timeout, self.client.navigate(url)).await {
            Ok(result) => result.map(|_| ()),
            Err(_) => Err(Error::navigation_failed(format!(
                "{}: timed out after {}ms",
                url,
                self.navigation_timeout.as_millis()
            ))),
        }
    }

    async fn exists(&self, selector: &str) -> Result<bool, Error> {
        match self
            .client
            .evaluate(&scripts::exists_script(selector), false)
            .await?
        {
            EvaluationResult::Bool(present) => Ok(present),
            _ => Ok(false),
        }
    }

    async fn click(&self, selector: &str) -> Result<(), Error> {
        self.eval_element(selector, &scripts::click_script(selector))
            .await
            .map(|_| ())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), Error> {
        self.eval_element(selector, &scripts::fill_script(selector, value))
            .await
            .map(|_| ())
    }

    async fn text_content(&self, selector: &str) -> Result<String, Error> {
        self.eval_element(selector, &scripts::text_content_script(selector))
            .await
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, Error> {
        let payload = self
            .eval_element(selector, &scripts::attribute_script(selector, name))
            .await?;

        let parsed: serde_json::Value = serde_json::from_str(&payload)
            .map_err(|e| Error::cdp(format!("Failed to parse attribute payload: {}", e)))?;

        Ok(parsed
            .get("value")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, Error> {
        let payload = self
            .eval_element(selector, &scripts::is_visible_script(selector))
            .await?;
        Ok(payload == "true")
    }

    async fn body_text(&self) -> Result<String, Error> {
        match self.client.evaluate(scripts::BODY_TEXT_SCRIPT, false).await? {
            EvaluationResult::String(text) => Ok(text),
            _ => Ok(String::new()),
        }
    }

    async fn matching_text(&self, selector: &str) -> Result<Vec<String>, Error> {
        let payload = match self
            .client
            .evaluate(&scripts::matching_text_script(selector), false)
            .await?
        {
            EvaluationResult::String(s) => s,
            _ => return Ok(Vec::new()),
        };

        serde_json::from_str(&payload)
            .map_err(|e| Error::cdp(format!("Failed to parse matching text: {}", e)))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        self.client.screenshot().await
    }

    async fn summary(&self) -> Result<PageSummary, Error> {
        let payload = match self
            .client
            .evaluate(scripts::PAGE_SUMMARY_SCRIPT, false)
            .await?
        {
            EvaluationResult::String(s) => s,
            other => {
                return Err(Error::cdp(format!(
                    "unexpected summary result: {:?}",
                    other
                )))
            }
        };

        serde_json::from_str(&payload)
            .map_err(|e| Error::cdp(format!("Failed to parse page summary: {}", e)))
    }

    async fn performance(&self) -> Result<PerformanceMetrics, Error> {
        let payload = match self
            .client
            .evaluate(scripts::PERFORMANCE_SCRIPT, false)
            .await?
        {
            EvaluationResult::String(s) => s,
            // An engine without the Performance API reports no metrics
            _ => return Ok(PerformanceMetrics::default()),
        };

        serde_json::from_str(&payload)
            .map_err(|e| Error::cdp(format!("Failed to parse performance metrics: {}", e)))
    }
}
