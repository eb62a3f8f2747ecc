//! Wait conditions
//!
//! A wait specification is either a fixed duration or an element locator,
//! decided once at the boundary: a pure-digit string is a duration in
//! milliseconds, anything else is a selector. The resolver only guarantees
//! the deadline is respected, not a particular poll cadence.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::session::PageHandle;
use crate::{Error, Result};

/// Poll cadence for locator waits
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Discriminated wait condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitSpec {
    /// Elapse a fixed number of milliseconds, unconditionally
    Duration(u64),
    /// Await an element matching the selector becoming present
    Locator(String),
}

impl WaitSpec {
    /// Parse a raw wait string
    pub fn parse(raw: &str) -> WaitSpec {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(ms) = trimmed.parse::<u64>() {
                return WaitSpec::Duration(ms);
            }
        }
        WaitSpec::Locator(trimmed.to_string())
    }
}

impl std::fmt::Display for WaitSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitSpec::Duration(ms) => write!(f, "{}ms", ms),
            WaitSpec::Locator(selector) => f.write_str(selector),
        }
    }
}

/// Resolves a wait condition against a page
pub struct ConditionResolver;

impl ConditionResolver {
    /// Block until the condition holds and return the elapsed time
    ///
    /// Duration waits always succeed, independent of DOM state and of
    /// `timeout`. Locator waits poll for presence until found or the
    /// deadline passes, then fail with `ElementNotFound`.
    pub async fn resolve(
        page: &dyn PageHandle,
        spec: &WaitSpec,
        timeout: Duration,
    ) -> Result<Duration> {
        let started = Instant::now();

        match spec {
            WaitSpec::Duration(ms) => {
                debug!("Waiting a fixed {}ms", ms);
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(started.elapsed())
            }
            WaitSpec::Locator(selector) => {
                debug!("Waiting up to {:?} for {}", timeout, selector);
                loop {
                    if page.exists(selector).await? {
                        return Ok(started.elapsed());
                    }
                    if started.elapsed() >= timeout {
                        return Err(Error::element_not_found(format!(
                            "{} did not appear within {}ms",
                            selector,
                            timeout.as_millis()
                        )));
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }
}
