//! Scout-Oxide service entry point
//!
//! Reads one JSON operation request from stdin and writes the report to
//! stdout. The surrounding transport is whatever invokes this binary; every
//! post-acquisition failure still comes back as a well-formed JSON body.
//!
//! Request shape:
//! ```json
//! { "op": "scrape_page", "args": { "url": "https://example.com" } }
//! ```
//!
//! Environment: `SCOUT_*` variables override configuration (see
//! `config.rs`); `RUST_LOG` controls logging.

use anyhow::Context;
use scout_oxide::config::Config;
use scout_oxide::tools::ToolDispatcher;
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// One inbound request
#[derive(Debug, Deserialize)]
struct ToolRequest {
    op: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first so its log level can back RUST_LOG
    let config = match std::env::args().nth(1) {
        Some(flag) if flag == "--config" => {
            let path = std::env::args()
                .nth(2)
                .context("--config requires a path")?;
            Config::from_file(&path)?
        }
        _ => Config::from_env()?,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Scout-Oxide v{}", scout_oxide::VERSION);

    let dispatcher = ToolDispatcher::new(config)?;

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("failed to read request from stdin")?;

    let request: ToolRequest =
        serde_json::from_str(&input).context("request is not valid JSON")?;

    info!("Received operation {}", request.op);

    let body = match dispatcher.dispatch(&request.op, request.args).await {
        Ok(report) => {
            let text = report.render_text();
            serde_json::json!({
                "success": true,
                "report": report,
                "text": text,
            })
        }
        Err(e) => serde_json::json!({
            "success": false,
            "error": e.to_string(),
        }),
    };

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
