//! Session traits and engine data types
//!
//! Abstract interfaces between the sequencing engine and the browser: an
//! `EngineDriver` starts one isolated engine instance per request, and the
//! instance's `PageHandle` is the only capability the executor, inspector
//! and condition resolver operate on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Browser engine kinds
///
/// Closed set; an unknown name fails with `EngineUnavailable` before any
/// process is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl EngineKind {
    /// Engine name as it appears in requests and logs
    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Chromium => "chromium",
            EngineKind::Firefox => "firefox",
            EngineKind::Webkit => "webkit",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(EngineKind::Chromium),
            "firefox" => Ok(EngineKind::Firefox),
            "webkit" => Ok(EngineKind::Webkit),
            other => Err(crate::Error::engine_unavailable(format!(
                "unknown engine '{}'",
                other
            ))),
        }
    }
}

/// A meta tag extracted from the page head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

/// A heading extracted from the page, in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// Structural page metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSummary {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub meta: Vec<MetaTag>,
    #[serde(default)]
    pub headings: Vec<Heading>,
    #[serde(default)]
    pub links: u64,
    #[serde(default)]
    pub images: u64,
    #[serde(default)]
    pub forms: u64,
}

/// Timing metrics from the browser's Performance API
///
/// Every field is optional: engines report different subsets (first-paint in
/// particular is absent on some), and a missing metric is an absent field,
/// never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom_content_loaded_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_complete_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_paint_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_contentful_paint_ms: Option<f64>,
}

/// Page handle trait
///
/// The typed capability for one live page. All element operations address
/// elements by CSS selector; a missing element is `ElementNotFound`.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigate to a URL and wait for the document to settle
    async fn navigate(&self, url: &str) -> Result<(), crate::Error>;

    /// Whether an element matching the selector is present
    async fn exists(&self, selector: &str) -> Result<bool, crate::Error>;

    /// Click the first element matching the selector
    async fn click(&self, selector: &str) -> Result<(), crate::Error>;

    /// Fill the first matching input with a value
    async fn fill(&self, selector: &str, value: &str) -> Result<(), crate::Error>;

    /// Text content of the first matching element
    async fn text_content(&self, selector: &str) -> Result<String, crate::Error>;

    /// Attribute value of the first matching element (None when the
    /// attribute is not set; a missing element is an error)
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, crate::Error>;

    /// Whether the first matching element is visible
    async fn is_visible(&self, selector: &str) -> Result<bool, crate::Error>;

    /// Visible text of the whole document body
    async fn body_text(&self) -> Result<String, crate::Error>;

    /// Text of every element matching the selector, in document order
    async fn matching_text(&self, selector: &str) -> Result<Vec<String>, crate::Error>;

    /// Capture a full-page PNG screenshot
    async fn screenshot(&self) -> Result<Vec<u8>, crate::Error>;

    /// Structural page metadata
    async fn summary(&self) -> Result<PageSummary, crate::Error>;

    /// Performance timings, with absent metrics as absent fields
    async fn performance(&self) -> Result<PerformanceMetrics, crate::Error>;
}

/// One live, isolated browser engine
#[async_trait]
pub trait EngineInstance: Send + Sync {
    /// The single page owned by this instance
    fn page(&self) -> Arc<dyn PageHandle>;

    /// Terminate the engine. Must tolerate being called on an already
    /// faulted instance.
    async fn shutdown(&self) -> Result<(), crate::Error>;
}

/// Engine driver trait
///
/// Starts one isolated, headless engine instance with one page. Failure to
/// start is `EngineUnavailable`.
#[async_trait]
pub trait EngineDriver: Send + Sync {
    async fn start(&self, kind: EngineKind) -> Result<Box<dyn EngineInstance>, crate::Error>;
}
