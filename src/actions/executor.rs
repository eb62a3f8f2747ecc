//! Action executor
//!
//! Runs an ordered action list against one page. Actions execute strictly
//! in input order, each under its own timeout; a failing action is recorded
//! and the sequence continues. The caller always gets one outcome per
//! action.

use std::sync::Arc;
use tracing::{debug, instrument};

use super::types::{Action, ActionKind, ActionOutcome};
use super::wait::{ConditionResolver, WaitSpec};
use crate::artifacts::ArtifactStore;
use crate::session::PageHandle;
use crate::{Error, Result};

/// Shorten extracted text for report lines
fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > 80 {
        let cut: String = trimmed.chars().take(80).collect();
        format!("{}…", cut)
    } else {
        trimmed.to_string()
    }
}

/// Action executor
pub struct ActionExecutor {
    artifacts: Arc<ArtifactStore>,
}

impl ActionExecutor {
    /// Create a new executor
    pub fn new(artifacts: Arc<ArtifactStore>) -> Self {
        Self { artifacts }
    }

    /// Execute actions in order, recording one outcome each
    pub async fn execute(
        &self,
        page: &dyn PageHandle,
        actions: &[Action],
    ) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(actions.len());
        for (index, action) in actions.iter().enumerate() {
            let outcome = self.execute_one(page, action).await;
            debug!(
                "Action {} ({}) -> {}",
                index + 1,
                action.kind.name(),
                if outcome.success { "ok" } else { "failed" }
            );
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Execute one action in isolation
    #[instrument(skip(self, page, action), fields(kind = action.kind.name()))]
    async fn execute_one(&self, page: &dyn PageHandle, action: &Action) -> ActionOutcome {
        let kind = action.kind.name().to_string();
        let target = action
            .target
            .clone()
            .unwrap_or_else(|| "page".to_string());

        // Wait actions own their deadline: the resolver enforces it for
        // locators, and duration waits run to completion by contract.
        if action.kind == ActionKind::Wait {
            return match self.run_wait(page, action).await {
                Ok(detail) => ActionOutcome::ok(kind, target, detail),
                Err(e) => ActionOutcome::failed(kind, target, &e),
            };
        }

        match tokio::time::timeout(action.timeout, self.run_action(page, action)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => ActionOutcome::failed(kind, target, &e),
            Err(_) => ActionOutcome::failed(
                kind.clone(),
                target,
                &Error::timeout(format!(
                    "{} did not complete within {}ms",
                    kind,
                    action.timeout.as_millis()
                )),
            ),
        }
    }

    /// Resolve a wait action
    async fn run_wait(&self, page: &dyn PageHandle, action: &Action) -> Result<String> {
        let raw = action
            .target
            .as_deref()
            .ok_or_else(|| Error::invalid_argument("wait action requires a condition"))?;
        let spec = WaitSpec::parse(raw);
        let elapsed = ConditionResolver::resolve(page, &spec, action.timeout).await?;
        Ok(format!("condition met after {}ms", elapsed.as_millis()))
    }

    /// Run one non-wait action body
    async fn run_action(&self, page: &dyn PageHandle, action: &Action) -> Result<ActionOutcome> {
        let kind = action.kind.name().to_string();
        let target = action
            .target
            .clone()
            .unwrap_or_else(|| "page".to_string());

        match &action.kind {
            ActionKind::Click => {
                let selector = self.required_target(action)?;
                page.click(selector).await?;
                Ok(ActionOutcome::ok(kind, target, "clicked"))
            }
            ActionKind::Fill => {
                let selector = self.required_target(action)?;
                let value = action
                    .value
                    .as_deref()
                    .ok_or_else(|| Error::invalid_argument("fill action requires a value"))?;
                page.fill(selector, value).await?;
                Ok(ActionOutcome::ok(
                    kind,
                    target,
                    format!("filled with \"{}\"", value),
                ))
            }
            ActionKind::Screenshot => {
                let bytes = page.screenshot().await?;
                let path = self.artifacts.store_screenshot(&bytes).await?;
                let detail = format!("saved to {}", path.display());
                Ok(ActionOutcome::ok(kind, target, detail).with_artifact(path))
            }
            ActionKind::GetText => {
                let selector = self.required_target(action)?;
                let text = page.text_content(selector).await?;
                Ok(ActionOutcome::ok(
                    kind,
                    target,
                    format!("text: \"{}\"", preview(&text)),
                ))
            }
            ActionKind::GetAttribute => {
                let selector = self.required_target(action)?;
                let name = action.value.as_deref().ok_or_else(|| {
                    Error::invalid_argument("get-attribute action requires an attribute name")
                })?;
                let detail = match page.attribute(selector, name).await? {
                    Some(value) => format!("{} = \"{}\"", name, preview(&value)),
                    None => format!("{} is not set", name),
                };
                Ok(ActionOutcome::ok(kind, target, detail))
            }
            ActionKind::Unsupported(name) => Err(Error::unsupported_action(name.clone())),
            // Handled by execute_one
            ActionKind::Wait => Err(Error::internal("wait action routed to run_action")),
        }
    }

    fn required_target<'a>(&self, action: &'a Action) -> Result<&'a str> {
        action
            .target
            .as_deref()
            .ok_or_else(|| Error::invalid_argument("action requires a selector"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::types::ActionRequest;
    use crate::session::mock::{MockElement, MockPage};
    use std::time::Duration;

    fn store() -> Arc<ArtifactStore> {
        Arc::new(ArtifactStore::new(None))
    }

    fn action(kind: &str, selector: Option<&str>, value: Option<&str>) -> Action {
        Action::from_request(
            &ActionRequest {
                action: kind.to_string(),
                selector: selector.map(str::to_string),
                value: value.map(str::to_string),
                timeout: None,
            },
            Duration::from_millis(1000),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_every_action_gets_an_outcome() {
        let page = MockPage::new();
        page.insert_element("#a", MockElement::new("A")).await;

        let actions = vec![
            action("click", Some("#a"), None),
            action("click", Some("#missing"), None),
            action("get-text", Some("#a"), None),
        ];

        let executor = ActionExecutor::new(store());
        let outcomes = executor.execute(&page, &actions).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert!(outcomes[2].success);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_sequence() {
        let page = MockPage::new();
        page.insert_element("#login", MockElement::new("Login")).await;
        page.insert_element("#user", MockElement::new("")).await;
        page.insert_element("#status", MockElement::new("ready")).await;

        // The scenario: a failing click mid-sequence leaves the rest running
        let actions = vec![
            action("click", Some("#login"), None),
            action("fill", Some("#user"), Some("alice")),
            action("click", Some("#missing"), None),
            action("get-text", Some("#status"), None),
        ];

        let executor = ActionExecutor::new(store());
        let outcomes = executor.execute(&page, &actions).await;

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].success);
        assert!(outcomes[1].success);
        assert!(!outcomes[2].success);
        assert!(outcomes[2].error.as_deref().unwrap().contains("#missing"));
        assert!(outcomes[3].success);
        assert!(outcomes[3].detail.contains("ready"));

        // Order of side effects preserved
        assert_eq!(page.clicks().await, vec!["#login"]);
        assert_eq!(
            page.fills().await,
            vec![("#user".to_string(), "alice".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unsupported_kind_is_recorded_not_fatal() {
        let page = MockPage::new();
        page.insert_element("#a", MockElement::new("A")).await;

        let actions = vec![
            action("hover", Some("#a"), None),
            action("click", Some("#a"), None),
        ];

        let executor = ActionExecutor::new(store());
        let outcomes = executor.execute(&page, &actions).await;

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].success);
        assert!(outcomes[0].error.as_deref().unwrap().contains("hover"));
        assert!(outcomes[1].success);
    }

    #[tokio::test]
    async fn test_wait_action_with_duration_succeeds() {
        let page = MockPage::new();

        let mut wait = action("wait", Some("50"), None);
        wait.timeout = Duration::from_millis(10); // irrelevant for durations

        let executor = ActionExecutor::new(store());
        let outcomes = executor.execute(&page, &[wait]).await;

        assert!(outcomes[0].success);
        assert!(outcomes[0].detail.contains("condition met"));
    }

    #[tokio::test]
    async fn test_wait_action_locator_timeout_fails() {
        let page = MockPage::new();

        let mut wait = action("wait", Some("#never"), None);
        wait.timeout = Duration::from_millis(200);

        let executor = ActionExecutor::new(store());
        let outcomes = executor.execute(&page, &[wait]).await;

        assert!(!outcomes[0].success);
        assert!(outcomes[0].error.as_deref().unwrap().contains("#never"));
    }

    #[tokio::test]
    async fn test_screenshot_records_artifact() {
        let page = MockPage::new();

        let executor = ActionExecutor::new(store());
        let outcomes = executor.execute(&page, &[action("screenshot", None, None)]).await;

        assert!(outcomes[0].success);
        let artifact = outcomes[0].artifact.as_ref().unwrap();
        assert!(artifact.to_string_lossy().ends_with(".png"));
        assert_eq!(page.screenshot_count(), 1);

        let _ = tokio::fs::remove_file(artifact).await;
    }

    #[tokio::test]
    async fn test_get_attribute_reads_value() {
        let page = MockPage::new();
        page.insert_element(
            "#link",
            MockElement::new("Docs").with_attribute("href", "/docs"),
        )
        .await;

        let executor = ActionExecutor::new(store());
        let outcomes = executor
            .execute(
                &page,
                &[
                    action("get-attribute", Some("#link"), Some("href")),
                    action("get-attribute", Some("#link"), Some("rel")),
                ],
            )
            .await;

        assert!(outcomes[0].success);
        assert!(outcomes[0].detail.contains("/docs"));
        // Present element, unset attribute: still a success
        assert!(outcomes[1].success);
        assert!(outcomes[1].detail.contains("not set"));
    }

    #[tokio::test]
    async fn test_slow_action_times_out() {
        let page = MockPage::new();
        page.insert_element(
            "#slow",
            MockElement::new("x").appearing_after(Duration::from_millis(500)),
        )
        .await;

        let mut click = action("click", Some("#slow"), None);
        click.timeout = Duration::from_millis(100);

        let executor = ActionExecutor::new(store());
        let outcomes = executor.execute(&page, &[click]).await;

        // The element is not there yet, so the click fails fast with
        // ElementNotFound rather than waiting
        assert!(!outcomes[0].success);
    }
}
