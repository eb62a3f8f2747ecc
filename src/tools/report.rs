//! Operation reports
//!
//! Every operation produces one `Report`, serializable as structured JSON
//! and renderable as text. A report is always well-formed: per-action
//! failures live inside it, they never replace it.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::actions::ActionOutcome;
use crate::inspect::PageSnapshot;

/// Result of a `wait_for_element` operation
#[derive(Debug, Clone, Serialize)]
pub struct WaitReport {
    pub selector: String,
    pub found: bool,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One operation's report
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    /// Extracted text, optionally with screenshot artifacts
    Text {
        text: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        artifacts: Vec<PathBuf>,
    },
    /// Ordered per-step outcomes of an action sequence
    Sequence {
        outcomes: Vec<ActionOutcome>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        artifacts: Vec<PathBuf>,
    },
    /// Structured page snapshot
    Snapshot { snapshot: PageSnapshot },
    /// Wait-for-element outcome
    Wait {
        #[serde(flatten)]
        outcome: WaitReport,
    },
    /// Captured output of a forwarded package script
    Script {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl Report {
    /// Build a sequence report, lifting artifact paths out of the outcomes
    pub fn sequence(outcomes: Vec<ActionOutcome>) -> Self {
        let artifacts = outcomes
            .iter()
            .filter_map(|o| o.artifact.clone())
            .collect();
        Report::Sequence {
            outcomes,
            artifacts,
        }
    }

    /// Render the report as human-readable text
    pub fn render_text(&self) -> String {
        match self {
            Report::Text { text, artifacts } => {
                let mut out = text.clone();
                for artifact in artifacts {
                    let _ = write!(out, "\n[screenshot: {}]", artifact.display());
                }
                out
            }
            Report::Sequence { outcomes, .. } => outcomes
                .iter()
                .map(ActionOutcome::render_line)
                .collect::<Vec<_>>()
                .join("\n"),
            Report::Snapshot { snapshot } => render_snapshot(snapshot),
            Report::Wait { outcome } => render_wait(outcome),
            Report::Script {
                status,
                stdout,
                stderr,
            } => {
                let mut out = match status {
                    Some(code) => format!("exit status: {}", code),
                    None => "terminated by signal".to_string(),
                };
                if !stdout.is_empty() {
                    let _ = write!(out, "\n{}", stdout.trim_end());
                }
                if !stderr.is_empty() {
                    let _ = write!(out, "\n[stderr]\n{}", stderr.trim_end());
                }
                out
            }
        }
    }
}

fn render_snapshot(snapshot: &PageSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Title: {}", snapshot.summary.title);
    let _ = writeln!(out, "URL: {}", snapshot.summary.url);
    let _ = writeln!(out, "Load time: {}ms", snapshot.load_time_ms);

    if !snapshot.summary.meta.is_empty() {
        let _ = writeln!(out, "Meta tags:");
        for tag in &snapshot.summary.meta {
            let _ = writeln!(out, "  {}: {}", tag.name, tag.content);
        }
    }

    if !snapshot.summary.headings.is_empty() {
        let _ = writeln!(out, "Headings:");
        for heading in &snapshot.summary.headings {
            let _ = writeln!(out, "  [h{}] {}", heading.level, heading.text);
        }
    }

    let _ = writeln!(
        out,
        "Links: {}, Images: {}, Forms: {}",
        snapshot.summary.links, snapshot.summary.images, snapshot.summary.forms
    );

    if let Some(perf) = &snapshot.performance {
        let _ = writeln!(out, "Performance:");
        let mut line = |label: &str, value: Option<f64>| {
            if let Some(ms) = value {
                let _ = writeln!(out, "  {}: {:.1}ms", label, ms);
            }
        };
        line("DOM content loaded", perf.dom_content_loaded_ms);
        line("Load complete", perf.load_complete_ms);
        line("First paint", perf.first_paint_ms);
        line("First contentful paint", perf.first_contentful_paint_ms);
    }

    out.trim_end().to_string()
}

fn render_wait(outcome: &WaitReport) -> String {
    if outcome.found {
        let mut out = format!(
            "✓ {} appeared after {}ms",
            outcome.selector, outcome.elapsed_ms
        );
        if let Some(visible) = outcome.visible {
            let _ = write!(out, " (visible: {})", visible);
        }
        if let Some(text) = &outcome.text {
            if !text.is_empty() {
                let _ = write!(out, "\ntext: {}", text);
            }
        }
        out
    } else {
        format!(
            "✗ {} not found within {}ms",
            outcome.selector, outcome.elapsed_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PageSummary;

    #[test]
    fn test_sequence_report_collects_artifacts() {
        let shot = ActionOutcome::ok("screenshot", "page", "saved")
            .with_artifact(PathBuf::from("/tmp/scout-1.png"));
        let report = Report::sequence(vec![ActionOutcome::ok("click", "#a", "clicked"), shot]);

        match &report {
            Report::Sequence {
                outcomes,
                artifacts,
            } => {
                assert_eq!(outcomes.len(), 2);
                assert_eq!(artifacts, &vec![PathBuf::from("/tmp/scout-1.png")]);
            }
            _ => panic!("expected sequence report"),
        }
    }

    #[test]
    fn test_sequence_render_one_line_per_outcome() {
        let report = Report::sequence(vec![
            ActionOutcome::ok("navigate", "https://example.com", "page loaded in 12ms"),
            ActionOutcome::failed(
                "click",
                "#missing",
                &crate::Error::element_not_found("#missing"),
            ),
        ]);

        let text = report.render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("✓ navigate"));
        assert!(lines[1].starts_with("✗ click"));
    }

    #[test]
    fn test_wait_report_render() {
        let found = Report::Wait {
            outcome: WaitReport {
                selector: "#app".to_string(),
                found: true,
                elapsed_ms: 130,
                visible: Some(true),
                text: Some("Ready".to_string()),
            },
        };
        let text = found.render_text();
        assert!(text.contains("appeared after 130ms"));
        assert!(text.contains("visible: true"));
        assert!(text.contains("Ready"));

        let missing = Report::Wait {
            outcome: WaitReport {
                selector: "#gone".to_string(),
                found: false,
                elapsed_ms: 5000,
                visible: None,
                text: None,
            },
        };
        assert!(missing.render_text().contains("not found within 5000ms"));
    }

    #[test]
    fn test_snapshot_render() {
        let report = Report::Snapshot {
            snapshot: PageSnapshot {
                summary: PageSummary {
                    title: "Example".to_string(),
                    url: "https://example.com/".to_string(),
                    links: 2,
                    ..Default::default()
                },
                load_time_ms: 42,
                performance: None,
            },
        };

        let text = report.render_text();
        assert!(text.contains("Title: Example"));
        assert!(text.contains("Load time: 42ms"));
        assert!(!text.contains("Performance"));
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report::Text {
            text: "body".to_string(),
            artifacts: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("text"));
        // Empty artifact lists are omitted
        assert!(json.get("artifacts").is_none());
    }
}
