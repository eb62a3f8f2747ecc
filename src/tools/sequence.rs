//! `test_react_app` / `run_action_sequence` operation
//!
//! Navigates, then runs the caller's ordered actions with per-action failure
//! isolation. The report always carries one leading navigation entry plus
//! exactly one outcome per requested action; a navigation failure is the
//! whole operation's failure instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::args::{resolve_engine, validated_url, SequenceArgs};
use super::{Report, ToolDispatcher};
use crate::actions::{Action, ActionExecutor, ActionOutcome};
use crate::Result;

pub async fn run(dispatcher: &ToolDispatcher, args: SequenceArgs) -> Result<Report> {
    let url = validated_url(&args.url)?;
    let engine = resolve_engine(args.engine.as_deref(), &dispatcher.config)?;
    let default_timeout = Duration::from_millis(dispatcher.config.action_timeout);

    // All actions validate before any session exists
    let actions = args
        .actions
        .iter()
        .map(|request| Action::from_request(request, default_timeout))
        .collect::<Result<Vec<_>>>()?;

    let artifacts = Arc::clone(&dispatcher.artifacts);

    dispatcher
        .sessions
        .scoped(engine, |page| async move {
            let started = Instant::now();
            page.navigate(&url).await?;

            let mut outcomes = Vec::with_capacity(actions.len() + 1);
            outcomes.push(ActionOutcome::ok(
                "navigate",
                &url,
                format!("page loaded in {}ms", started.elapsed().as_millis()),
            ));

            let executor = ActionExecutor::new(artifacts);
            outcomes.extend(executor.execute(page.as_ref(), &actions).await);

            Ok(Report::sequence(outcomes))
        })
        .await
}
