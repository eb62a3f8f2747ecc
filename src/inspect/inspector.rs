//! Page inspector
//!
//! Produces a structured snapshot of a page: structural metadata always,
//! performance timings only when asked for. Navigation load time is measured
//! around the navigation call itself, so it is populated even when the
//! engine reports no timing entries.

use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

use crate::session::{PageHandle, PageSummary, PerformanceMetrics};
use crate::Result;

/// Structured extraction result for one page
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    #[serde(flatten)]
    pub summary: PageSummary,
    /// Wall-clock time of the navigation call, in milliseconds
    pub load_time_ms: u64,
    /// Engine-reported timings, present only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
}

/// Page inspector
pub struct PageInspector;

impl PageInspector {
    /// Navigate to a URL and snapshot the resulting page
    ///
    /// Navigation failures surface as the whole operation's failure; a
    /// failure to read performance metrics does not, the fields just stay
    /// absent.
    pub async fn snapshot(
        page: &dyn PageHandle,
        url: &str,
        include_performance: bool,
    ) -> Result<PageSnapshot> {
        let started = Instant::now();
        page.navigate(url).await?;
        let load_time_ms = started.elapsed().as_millis() as u64;

        debug!("Navigated to {} in {}ms", url, load_time_ms);

        let summary = page.summary().await?;

        let performance = if include_performance {
            match page.performance().await {
                Ok(metrics) => Some(metrics),
                Err(e) => {
                    warn!("Performance metrics unavailable for {}: {}", url, e);
                    Some(PerformanceMetrics::default())
                }
            }
        } else {
            None
        };

        Ok(PageSnapshot {
            summary,
            load_time_ms,
            performance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::MockPage;
    use crate::session::{Heading, MetaTag};

    #[tokio::test]
    async fn test_snapshot_populates_structure() {
        let page = MockPage::new();
        page.set_summary(PageSummary {
            title: "Example".to_string(),
            url: "https://example.com/".to_string(),
            meta: vec![MetaTag {
                name: "description".to_string(),
                content: "An example".to_string(),
            }],
            headings: vec![Heading {
                level: 1,
                text: "Welcome".to_string(),
            }],
            links: 3,
            images: 1,
            forms: 0,
        })
        .await;

        let snapshot = PageInspector::snapshot(&page, "https://example.com", false)
            .await
            .unwrap();

        assert_eq!(snapshot.summary.title, "Example");
        assert_eq!(snapshot.summary.meta.len(), 1);
        assert_eq!(snapshot.summary.headings[0].level, 1);
        assert_eq!(snapshot.summary.links, 3);
        assert_eq!(page.navigations().await, vec!["https://example.com"]);
    }

    #[tokio::test]
    async fn test_performance_gated_by_flag() {
        let page = MockPage::new();
        page.set_performance(PerformanceMetrics {
            dom_content_loaded_ms: Some(80.0),
            ..Default::default()
        })
        .await;

        let without = PageInspector::snapshot(&page, "https://example.com", false)
            .await
            .unwrap();
        assert!(without.performance.is_none());

        let with = PageInspector::snapshot(&page, "https://example.com", true)
            .await
            .unwrap();
        let metrics = with.performance.unwrap();
        assert_eq!(metrics.dom_content_loaded_ms, Some(80.0));
        // Metrics the engine never reported stay absent
        assert!(metrics.first_paint_ms.is_none());
    }

    #[tokio::test]
    async fn test_navigation_failure_is_fatal() {
        let page = MockPage::new();
        page.fail_navigation();

        let result = PageInspector::snapshot(&page, "https://down.example", true).await;
        assert!(matches!(
            result,
            Err(crate::Error::NavigationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_serialization_flattens_summary() {
        let page = MockPage::new();
        page.set_title("Flat").await;

        let snapshot = PageInspector::snapshot(&page, "https://example.com", false)
            .await
            .unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json.get("title").and_then(|v| v.as_str()), Some("Flat"));
        assert!(json.get("load_time_ms").is_some());
        assert!(json.get("performance").is_none());
    }
}
