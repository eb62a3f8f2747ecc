//! `get_page_info` operation
//!
//! Session-scoped wrapper around the page inspector.

use super::args::{resolve_engine, validated_url, PageInfoArgs};
use super::{Report, ToolDispatcher};
use crate::inspect::PageInspector;
use crate::Result;

pub async fn run(dispatcher: &ToolDispatcher, args: PageInfoArgs) -> Result<Report> {
    let url = validated_url(&args.url)?;
    let engine = resolve_engine(args.engine.as_deref(), &dispatcher.config)?;
    let include_performance = args.include_performance;

    dispatcher
        .sessions
        .scoped(engine, |page| async move {
            let snapshot =
                PageInspector::snapshot(page.as_ref(), &url, include_performance).await?;
            Ok(Report::Snapshot { snapshot })
        })
        .await
}
