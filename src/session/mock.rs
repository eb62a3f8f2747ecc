//! Mock engine implementation for testing
//!
//! A scriptable in-memory page plus a driver with start/stop counters, so
//! the sequencing engine's ordering, isolation and release guarantees can be
//! exercised without a browser.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::traits::{
    EngineDriver, EngineInstance, EngineKind, PageHandle, PageSummary, PerformanceMetrics,
};
use crate::{Error, Result};

/// Engine start/stop counters shared across a driver's instances
#[derive(Debug, Clone, Default)]
pub struct EngineCounters {
    started: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

impl EngineCounters {
    /// Engines started so far
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Engines stopped so far
    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Engines currently live
    pub fn live(&self) -> usize {
        self.started() - self.stopped()
    }
}

/// One element in the mock DOM
#[derive(Debug, Clone)]
pub struct MockElement {
    text: String,
    attributes: HashMap<String, String>,
    visible: bool,
    click_fails: bool,
    appears_after: Duration,
}

impl MockElement {
    /// An immediately present, visible element with the given text
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            attributes: HashMap::new(),
            visible: true,
            click_fails: false,
            appears_after: Duration::ZERO,
        }
    }

    /// Add an attribute
    pub fn with_attribute<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Make the element present but not visible
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Make clicks on the element fail
    pub fn failing_click(mut self) -> Self {
        self.click_fails = true;
        self
    }

    /// Delay the element's appearance in the DOM
    pub fn appearing_after(mut self, delay: Duration) -> Self {
        self.appears_after = delay;
        self
    }
}

/// Mock page with a scriptable DOM
#[derive(Debug, Default)]
pub struct MockPage {
    elements: RwLock<HashMap<String, (MockElement, Option<Instant>)>>,
    body_text: RwLock<String>,
    title: RwLock<String>,
    url: RwLock<String>,
    navigations: RwLock<Vec<String>>,
    clicks: RwLock<Vec<String>>,
    fills: RwLock<Vec<(String, String)>>,
    navigate_fails: AtomicBool,
    summary: RwLock<Option<PageSummary>>,
    performance: RwLock<PerformanceMetrics>,
    screenshots_taken: AtomicUsize,
}

impl MockPage {
    /// Create an empty mock page
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element under a selector
    pub async fn insert_element<S: Into<String>>(&self, selector: S, element: MockElement) {
        let inserted_at = if element.appears_after.is_zero() {
            None
        } else {
            Some(Instant::now())
        };
        self.elements
            .write()
            .await
            .insert(selector.into(), (element, inserted_at));
    }

    /// Set the document body text
    pub async fn set_body_text<S: Into<String>>(&self, text: S) {
        *self.body_text.write().await = text.into();
    }

    /// Set the page title
    pub async fn set_title<S: Into<String>>(&self, title: S) {
        *self.title.write().await = title.into();
    }

    /// Replace the structural summary wholesale
    pub async fn set_summary(&self, summary: PageSummary) {
        *self.summary.write().await = Some(summary);
    }

    /// Set the performance metrics the page reports
    pub async fn set_performance(&self, metrics: PerformanceMetrics) {
        *self.performance.write().await = metrics;
    }

    /// Make navigation fail
    pub fn fail_navigation(&self) {
        self.navigate_fails.store(true, Ordering::SeqCst);
    }

    /// URLs navigated to, in order
    pub async fn navigations(&self) -> Vec<String> {
        self.navigations.read().await.clone()
    }

    /// Selectors clicked, in order
    pub async fn clicks(&self) -> Vec<String> {
        self.clicks.read().await.clone()
    }

    /// (selector, value) fills, in order
    pub async fn fills(&self) -> Vec<(String, String)> {
        self.fills.read().await.clone()
    }

    /// Screenshots captured so far
    pub fn screenshot_count(&self) -> usize {
        self.screenshots_taken.load(Ordering::SeqCst)
    }

    /// Look up an element that is present right now
    async fn ready_element(&self, selector: &str) -> Option<MockElement> {
        let elements = self.elements.read().await;
        let (element, inserted_at) = elements.get(selector)?;
        match inserted_at {
            Some(at) if at.elapsed() < element.appears_after => None,
            _ => Some(element.clone()),
        }
    }
}

#[async_trait]
impl PageHandle for MockPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        if self.navigate_fails.load(Ordering::SeqCst) {
            return Err(Error::navigation_failed(url.to_string()));
        }
        self.navigations.write().await.push(url.to_string());
        *self.url.write().await = url.to_string();
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.ready_element(selector).await.is_some())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .ready_element(selector)
            .await
            .ok_or_else(|| Error::element_not_found(selector.to_string()))?;

        if element.click_fails {
            return Err(Error::script_execution_failed(format!(
                "click on {} intercepted",
                selector
            )));
        }

        self.clicks.write().await.push(selector.to_string());
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.ready_element(selector)
            .await
            .ok_or_else(|| Error::element_not_found(selector.to_string()))?;

        self.fills
            .write()
            .await
            .push((selector.to_string(), value.to_string()));

        if let Some((element, _)) = self.elements.write().await.get_mut(selector) {
            element
                .attributes
                .insert("value".to_string(), value.to_string());
        }
        Ok(())
    }

    async fn text_content(&self, selector: &str) -> Result<String> {
        self.ready_element(selector)
            .await
            .map(|e| e.text)
            .ok_or_else(|| Error::element_not_found(selector.to_string()))
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        self.ready_element(selector)
            .await
            .map(|e| e.attributes.get(name).cloned())
            .ok_or_else(|| Error::element_not_found(selector.to_string()))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        self.ready_element(selector)
            .await
            .map(|e| e.visible)
            .ok_or_else(|| Error::element_not_found(selector.to_string()))
    }

    async fn body_text(&self) -> Result<String> {
        Ok(self.body_text.read().await.clone())
    }

    async fn matching_text(&self, selector: &str) -> Result<Vec<String>> {
        Ok(self
            .ready_element(selector)
            .await
            .map(|e| vec![e.text])
            .unwrap_or_default())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.screenshots_taken.fetch_add(1, Ordering::SeqCst);
        // Minimal PNG signature + IHDR, enough to look like an image
        Ok(vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00,
            0x00, 0x90, 0x77, 0x53, 0xDE,
        ])
    }

    async fn summary(&self) -> Result<PageSummary> {
        if let Some(summary) = self.summary.read().await.clone() {
            return Ok(summary);
        }
        Ok(PageSummary {
            title: self.title.read().await.clone(),
            url: self.url.read().await.clone(),
            ..Default::default()
        })
    }

    async fn performance(&self) -> Result<PerformanceMetrics> {
        Ok(self.performance.read().await.clone())
    }
}

/// Mock engine driver
#[derive(Default)]
pub struct MockDriver {
    page: Arc<MockPage>,
    counters: EngineCounters,
    fail_start: std::sync::Mutex<Option<String>>,
    fail_shutdown: AtomicBool,
}

impl MockDriver {
    /// Driver with an empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver whose sessions expose the given page
    pub fn with_page(page: Arc<MockPage>) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    /// The shared start/stop counters
    pub fn counters(&self) -> EngineCounters {
        self.counters.clone()
    }

    /// The page every session of this driver exposes
    pub fn page(&self) -> Arc<MockPage> {
        Arc::clone(&self.page)
    }

    /// Make the next start attempt fail
    pub fn fail_next_start<S: Into<String>>(&self, reason: S) {
        *self.fail_start.lock().expect("fail_start lock") = Some(reason.into());
    }

    /// Make shutdown of subsequently started instances fail
    pub fn fail_shutdown(&self) {
        self.fail_shutdown.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EngineDriver for MockDriver {
    async fn start(&self, _kind: EngineKind) -> Result<Box<dyn EngineInstance>> {
        if let Some(reason) = self.fail_start.lock().expect("fail_start lock").take() {
            return Err(Error::engine_unavailable(reason));
        }

        self.counters.started.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MockInstance {
            page: Arc::clone(&self.page),
            counters: self.counters.clone(),
            fail_shutdown: self.fail_shutdown.load(Ordering::SeqCst),
            stopped: AtomicBool::new(false),
        }))
    }
}

/// One mock engine instance
struct MockInstance {
    page: Arc<MockPage>,
    counters: EngineCounters,
    fail_shutdown: bool,
    stopped: AtomicBool,
}

#[async_trait]
impl EngineInstance for MockInstance {
    fn page(&self) -> Arc<dyn PageHandle> {
        Arc::clone(&self.page) as Arc<dyn PageHandle>
    }

    async fn shutdown(&self) -> Result<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if self.fail_shutdown {
            return Err(Error::internal("injected shutdown fault"));
        }
        self.counters.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
