//! Common test utilities
//!
//! Shared fixtures for the integration suites: a dispatcher over the mock
//! engine driver plus canned page setups.

use std::sync::Arc;

use scout_oxide::config::Config;
use scout_oxide::session::mock::{EngineCounters, MockDriver, MockElement, MockPage};
use scout_oxide::tools::ToolDispatcher;

/// A dispatcher over a mock engine, with the page and lifecycle counters
pub fn mock_dispatcher() -> (ToolDispatcher, Arc<MockPage>, EngineCounters) {
    let page = Arc::new(MockPage::new());
    let driver = Arc::new(MockDriver::with_page(Arc::clone(&page)));
    let counters = driver.counters();

    let config = Config {
        // Fast timeouts keep the suites quick
        action_timeout: 1000,
        wait_timeout: 1000,
        ..Default::default()
    };

    let dispatcher = ToolDispatcher::with_driver(config, driver);
    (dispatcher, page, counters)
}

/// Populate a page with a small login form
pub async fn setup_login_page(page: &MockPage) {
    page.insert_element("#login", MockElement::new("Sign in")).await;
    page.insert_element("#user", MockElement::new("")).await;
    page.insert_element("#status", MockElement::new("ready")).await;
    page.set_body_text("Welcome to the login page").await;
    page.set_title("Login").await;
}
