//! `wait_for_element` operation
//!
//! Navigates, then blocks until the wait condition holds or the deadline
//! passes. A locator that never appears is still a well-formed not-found
//! report: the session was acquired, so the contract is to report, not to
//! fault.

use std::time::{Duration, Instant};

use super::args::{resolve_engine, validated_url, WaitForElementArgs};
use super::{Report, ToolDispatcher, WaitReport};
use crate::actions::{ConditionResolver, WaitSpec};
use crate::{Error, Result};

pub async fn run(dispatcher: &ToolDispatcher, args: WaitForElementArgs) -> Result<Report> {
    let url = validated_url(&args.url)?;
    let selector = args.selector.trim().to_string();
    if selector.is_empty() {
        return Err(Error::invalid_argument("selector must not be empty"));
    }
    let engine = resolve_engine(args.engine.as_deref(), &dispatcher.config)?;
    let timeout = Duration::from_millis(args.timeout.unwrap_or(dispatcher.config.wait_timeout));

    dispatcher
        .sessions
        .scoped(engine, |page| async move {
            page.navigate(&url).await?;

            let spec = WaitSpec::parse(&selector);
            let started = Instant::now();

            match ConditionResolver::resolve(page.as_ref(), &spec, timeout).await {
                Ok(elapsed) => {
                    // Element state is only readable for locator waits; a
                    // duration wait succeeded by elapsing.
                    let (visible, text) = match &spec {
                        WaitSpec::Locator(sel) => (
                            page.is_visible(sel).await.ok(),
                            page.text_content(sel).await.ok(),
                        ),
                        WaitSpec::Duration(_) => (None, None),
                    };

                    Ok(Report::Wait {
                        outcome: WaitReport {
                            selector,
                            found: true,
                            elapsed_ms: elapsed.as_millis() as u64,
                            visible,
                            text,
                        },
                    })
                }
                Err(Error::ElementNotFound(_)) => Ok(Report::Wait {
                    outcome: WaitReport {
                        selector,
                        found: false,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                        visible: None,
                        text: None,
                    },
                }),
                Err(e) => Err(e),
            }
        })
        .await
}
