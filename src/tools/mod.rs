//! Operation dispatch
//!
//! Maps a named operation plus JSON arguments to one session-scoped call.
//! Every operation follows the same shape: validate arguments, acquire a
//! session, run, release unconditionally, build the report. Validation
//! failures never acquire a session.

pub mod args;
pub mod report;
pub mod scrape;
pub mod sequence;
pub mod info;
pub mod wait;
pub mod runner;

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::info;

use crate::artifacts::ArtifactStore;
use crate::config::Config;
use crate::session::{EngineDriver, EngineLauncher, SessionManager};
use crate::{Error, Result};

pub use report::{Report, WaitReport};

/// Parse operation arguments, surfacing malformed input as `InvalidArgument`
fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| Error::invalid_argument(format!("{}", e)))
}

/// Routes named operations to their handlers
pub struct ToolDispatcher {
    pub(crate) sessions: SessionManager,
    pub(crate) config: Config,
    pub(crate) artifacts: Arc<ArtifactStore>,
}

impl ToolDispatcher {
    /// Dispatcher over real browser engines
    pub fn new(config: Config) -> Result<Self> {
        let launcher = EngineLauncher::new(config.clone())?;
        Ok(Self::with_driver(config, Arc::new(launcher)))
    }

    /// Dispatcher over an injected engine driver
    pub fn with_driver(config: Config, driver: Arc<dyn EngineDriver>) -> Self {
        let artifacts = Arc::new(ArtifactStore::new(config.artifact_dir.clone()));
        Self {
            sessions: SessionManager::new(driver),
            config,
            artifacts,
        }
    }

    /// Dispatch one operation
    pub async fn dispatch(&self, op: &str, arguments: serde_json::Value) -> Result<Report> {
        info!("Dispatching operation {}", op);

        match op {
            "scrape_page" => scrape::run(self, parse_args(arguments)?).await,
            "test_react_app" | "run_action_sequence" => {
                sequence::run(self, parse_args(arguments)?).await
            }
            "get_page_info" => info::run(self, parse_args(arguments)?).await,
            "wait_for_element" => wait::run(self, parse_args(arguments)?).await,
            "run_package_script" => runner::run(parse_args(arguments)?).await,
            other => Err(Error::invalid_argument(format!(
                "unknown operation '{}'",
                other
            ))),
        }
    }
}
