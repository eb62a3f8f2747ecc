//! Action data model
//!
//! Actions arrive as loosely-typed requests, are validated once into
//! immutable `Action` values before any session exists, and produce one
//! `ActionOutcome` each, success or failure.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

/// Action kinds
///
/// Closed set with an explicit unsupported arm. An unknown kind string is
/// not a validation error: it becomes a recorded failure when executed, so
/// one bad step never aborts a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Click,
    Fill,
    Wait,
    Screenshot,
    GetText,
    GetAttribute,
    Unsupported(String),
}

impl ActionKind {
    /// Decide the kind from a request string
    ///
    /// Accepts kebab-case, snake_case and camelCase spellings.
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "click" => ActionKind::Click,
            "fill" => ActionKind::Fill,
            "wait" => ActionKind::Wait,
            "screenshot" => ActionKind::Screenshot,
            "gettext" => ActionKind::GetText,
            "getattribute" => ActionKind::GetAttribute,
            _ => ActionKind::Unsupported(name.trim().to_string()),
        }
    }

    /// Kind name as it appears in report lines
    pub fn name(&self) -> &str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Fill => "fill",
            ActionKind::Wait => "wait",
            ActionKind::Screenshot => "screenshot",
            ActionKind::GetText => "get-text",
            ActionKind::GetAttribute => "get-attribute",
            ActionKind::Unsupported(name) => name,
        }
    }
}

/// One action as supplied by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    /// Action kind name
    #[serde(alias = "kind", alias = "type")]
    pub action: String,
    /// Target locator (CSS selector, or a wait condition for `wait`)
    #[serde(default, alias = "target")]
    pub selector: Option<String>,
    /// Input text for `fill`, attribute name for `get-attribute`
    #[serde(default)]
    pub value: Option<String>,
    /// Per-action timeout in milliseconds
    #[serde(default, alias = "timeoutMs", alias = "timeout_ms")]
    pub timeout: Option<u64>,
}

/// One validated, immutable action
#[derive(Debug, Clone)]
pub struct Action {
    pub kind: ActionKind,
    pub target: Option<String>,
    pub value: Option<String>,
    pub timeout: Duration,
}

impl Action {
    /// Validate a request into an action
    ///
    /// Runs before session acquisition; a missing required field is
    /// `InvalidArgument` and fails the whole request up front.
    pub fn from_request(request: &ActionRequest, default_timeout: Duration) -> Result<Self> {
        let kind = ActionKind::from_name(&request.action);
        let target = request
            .selector
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let value = request.value.clone();

        match &kind {
            ActionKind::Click | ActionKind::Wait | ActionKind::GetText => {
                if target.is_none() {
                    return Err(Error::invalid_argument(format!(
                        "{} action requires a selector",
                        kind.name()
                    )));
                }
            }
            ActionKind::Fill => {
                if target.is_none() {
                    return Err(Error::invalid_argument("fill action requires a selector"));
                }
                if value.is_none() {
                    return Err(Error::invalid_argument("fill action requires a value"));
                }
            }
            ActionKind::GetAttribute => {
                if target.is_none() {
                    return Err(Error::invalid_argument(
                        "get-attribute action requires a selector",
                    ));
                }
                if value.is_none() {
                    return Err(Error::invalid_argument(
                        "get-attribute action requires an attribute name as its value",
                    ));
                }
            }
            // Screenshot targets the whole page; unsupported kinds are
            // recorded at execution time, not rejected here.
            ActionKind::Screenshot | ActionKind::Unsupported(_) => {}
        }

        Ok(Action {
            kind,
            target,
            value,
            timeout: request
                .timeout
                .map(Duration::from_millis)
                .unwrap_or(default_timeout),
        })
    }
}

/// Recorded result of one action
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub kind: String,
    pub target: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

impl ActionOutcome {
    /// A successful outcome
    pub fn ok<K: Into<String>, T: Into<String>, D: Into<String>>(
        kind: K,
        target: T,
        detail: D,
    ) -> Self {
        Self {
            success: true,
            kind: kind.into(),
            target: target.into(),
            detail: detail.into(),
            error: None,
            artifact: None,
        }
    }

    /// A failed outcome carrying the captured error
    pub fn failed<K: Into<String>, T: Into<String>>(kind: K, target: T, error: &Error) -> Self {
        let message = error.to_string();
        Self {
            success: false,
            kind: kind.into(),
            target: target.into(),
            detail: message.clone(),
            error: Some(message),
            artifact: None,
        }
    }

    /// Attach an artifact path
    pub fn with_artifact(mut self, path: PathBuf) -> Self {
        self.artifact = Some(path);
        self
    }

    /// Render as a report line: `<marker> <kind> <target>: <detail>`
    pub fn render_line(&self) -> String {
        let marker = if self.success { "✓" } else { "✗" };
        format!("{} {} {}: {}", marker, self.kind, self.target, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(action: &str, selector: Option<&str>, value: Option<&str>) -> ActionRequest {
        ActionRequest {
            action: action.to_string(),
            selector: selector.map(str::to_string),
            value: value.map(str::to_string),
            timeout: None,
        }
    }

    const DEFAULT: Duration = Duration::from_millis(5000);

    #[test]
    fn test_kind_spellings() {
        assert_eq!(ActionKind::from_name("click"), ActionKind::Click);
        assert_eq!(ActionKind::from_name("get-text"), ActionKind::GetText);
        assert_eq!(ActionKind::from_name("getText"), ActionKind::GetText);
        assert_eq!(ActionKind::from_name("get_attribute"), ActionKind::GetAttribute);
        assert_eq!(
            ActionKind::from_name("hover"),
            ActionKind::Unsupported("hover".to_string())
        );
    }

    #[test]
    fn test_click_requires_selector() {
        let result = Action::from_request(&request("click", None, None), DEFAULT);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_fill_requires_value() {
        let result = Action::from_request(&request("fill", Some("#user"), None), DEFAULT);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let action = Action::from_request(&request("fill", Some("#user"), Some("alice")), DEFAULT)
            .unwrap();
        assert_eq!(action.kind, ActionKind::Fill);
        assert_eq!(action.value.as_deref(), Some("alice"));
    }

    #[test]
    fn test_get_attribute_requires_name() {
        let result = Action::from_request(&request("get-attribute", Some("#link"), None), DEFAULT);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_screenshot_needs_no_target() {
        let action = Action::from_request(&request("screenshot", None, None), DEFAULT).unwrap();
        assert_eq!(action.kind, ActionKind::Screenshot);
        assert!(action.target.is_none());
    }

    #[test]
    fn test_unknown_kind_validates() {
        // Unknown kinds pass validation and fail later as recorded outcomes
        let action = Action::from_request(&request("teleport", None, None), DEFAULT).unwrap();
        assert_eq!(
            action.kind,
            ActionKind::Unsupported("teleport".to_string())
        );
    }

    #[test]
    fn test_timeout_override() {
        let mut req = request("click", Some("#go"), None);
        req.timeout = Some(250);
        let action = Action::from_request(&req, DEFAULT).unwrap();
        assert_eq!(action.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_outcome_lines() {
        let ok = ActionOutcome::ok("click", "#login", "clicked");
        assert_eq!(ok.render_line(), "✓ click #login: clicked");

        let err = Error::element_not_found("#missing");
        let failed = ActionOutcome::failed("click", "#missing", &err);
        assert!(failed.render_line().starts_with("✗ click #missing:"));
        assert!(failed.render_line().contains("#missing"));
    }
}
