//! `scrape_page` operation
//!
//! Navigate, optionally resolve a wait condition, extract text (whole body
//! or concatenated selector matches), optionally capture a screenshot.

use std::sync::Arc;
use std::time::Duration;

use super::args::{resolve_engine, validated_url, ScrapeArgs};
use super::{Report, ToolDispatcher};
use crate::actions::{ConditionResolver, WaitSpec};
use crate::Result;

pub async fn run(dispatcher: &ToolDispatcher, args: ScrapeArgs) -> Result<Report> {
    let url = validated_url(&args.url)?;
    let engine = resolve_engine(args.engine.as_deref(), &dispatcher.config)?;
    let wait_spec = args.wait_for.as_deref().map(WaitSpec::parse);
    let wait_timeout = Duration::from_millis(dispatcher.config.wait_timeout);
    let selector = args.selector;
    let want_screenshot = args.screenshot;
    let artifacts = Arc::clone(&dispatcher.artifacts);

    dispatcher
        .sessions
        .scoped(engine, |page| async move {
            page.navigate(&url).await?;

            if let Some(spec) = &wait_spec {
                ConditionResolver::resolve(page.as_ref(), spec, wait_timeout).await?;
            }

            let text = match &selector {
                Some(sel) => page.matching_text(sel).await?.join("\n"),
                None => page.body_text().await?,
            };

            let mut artifact_paths = Vec::new();
            if want_screenshot {
                let bytes = page.screenshot().await?;
                artifact_paths.push(artifacts.store_screenshot(&bytes).await?);
            }

            Ok(Report::Text {
                text,
                artifacts: artifact_paths,
            })
        })
        .await
}
