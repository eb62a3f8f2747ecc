//! Engine launcher
//!
//! The real `EngineDriver`: spawns one isolated headless browser process per
//! session with remote debugging on an OS-assigned port, waits for the
//! DevTools endpoint, creates the session's single page target and connects
//! the CDP client. Every failure on this path is `EngineUnavailable`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::page::CdpPage;
use super::traits::{EngineDriver, EngineInstance, EngineKind, PageHandle};
use crate::cdp::{CdpClient, CdpClientImpl, CdpWebSocketConnection};
use crate::config::Config;
use crate::{Error, Result};

/// Launches and owns real browser processes
pub struct EngineLauncher {
    config: Config,
    http: reqwest::Client,
}

impl EngineLauncher {
    /// Create a new launcher
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Executable candidates for an engine kind
    ///
    /// A configured path wins outright; webkit has no stock CDP build, so it
    /// is config-only.
    fn candidates(&self, kind: EngineKind) -> Result<Vec<String>> {
        let configured = match kind {
            EngineKind::Chromium => self.config.chromium_path.clone(),
            EngineKind::Firefox => self.config.firefox_path.clone(),
            EngineKind::Webkit => {
                return self
                    .config
                    .webkit_path
                    .clone()
                    .map(|p| vec![p])
                    .ok_or_else(|| {
                        Error::engine_unavailable(
                            "the webkit engine requires SCOUT_WEBKIT_PATH to be set",
                        )
                    });
            }
        };

        if let Some(path) = configured {
            return Ok(vec![path]);
        }

        Ok(match kind {
            EngineKind::Chromium => vec![
                "chromium".to_string(),
                "chromium-browser".to_string(),
                "google-chrome".to_string(),
                "google-chrome-stable".to_string(),
            ],
            EngineKind::Firefox => vec!["firefox".to_string()],
            EngineKind::Webkit => unreachable!("webkit is config-only"),
        })
    }

    /// Build the launch command for one candidate executable
    fn command_for(
        &self,
        kind: EngineKind,
        executable: &str,
        port: u16,
        profile_dir: &Path,
    ) -> Command {
        let mut cmd = Command::new(executable);

        match kind {
            EngineKind::Chromium => {
                cmd.arg("--headless=new")
                    .arg(format!("--remote-debugging-port={}", port))
                    .arg(format!("--user-data-dir={}", profile_dir.display()))
                    .arg("--no-first-run")
                    .arg("--no-default-browser-check")
                    .arg("--disable-background-networking")
                    .arg("--disable-gpu")
                    .arg("about:blank");
            }
            EngineKind::Firefox => {
                cmd.arg("--headless")
                    .arg(format!("--remote-debugging-port={}", port))
                    .arg("-profile")
                    .arg(profile_dir)
                    .arg("--no-remote")
                    .arg("about:blank");
            }
            EngineKind::Webkit => {
                cmd.arg("--headless")
                    .arg(format!("--remote-debugging-port={}", port));
            }
        }

        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        // Leaked sessions still reap the process
        cmd.kill_on_drop(true);
        cmd
    }

    /// Poll the DevTools HTTP endpoint until it answers or the launch
    /// deadline expires
    async fn wait_for_endpoint(&self, port: u16) -> Result<()> {
        let url = format!("http://127.0.0.1:{}/json/version", port);
        let deadline =
            tokio::time::Instant::now() + Duration::from_millis(self.config.launch_timeout);

        loop {
            if let Ok(resp) = self.http.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::engine_unavailable(format!(
                    "DevTools endpoint on port {} did not come up within {}ms",
                    port, self.config.launch_timeout
                )));
            }

            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    /// Create the session's page target and return its WebSocket URL
    async fn create_page_target(&self, port: u16) -> Result<String> {
        // /json/new creates a fresh page and returns it directly
        let new_url = format!("http://127.0.0.1:{}/json/new?about:blank", port);
        if let Ok(resp) = self.http.put(&new_url).send().await {
            if resp.status().is_success() {
                if let Ok(target) = resp.json::<serde_json::Value>().await {
                    if let Some(ws) = target.get("webSocketDebuggerUrl").and_then(|v| v.as_str()) {
                        debug!("Created page target via /json/new: {}", ws);
                        return Ok(ws.to_string());
                    }
                }
            }
        }

        // Fallback for engines that only expose the target list (Firefox)
        let list_url = format!("http://127.0.0.1:{}/json/list", port);
        let targets: Vec<serde_json::Value> = self
            .http
            .get(&list_url)
            .send()
            .await
            .map_err(|e| Error::engine_unavailable(format!("Failed to list targets: {}", e)))?
            .json()
            .await
            .map_err(|e| Error::engine_unavailable(format!("Failed to parse targets: {}", e)))?;

        targets
            .iter()
            .find(|t| t.get("type").and_then(|v| v.as_str()) == Some("page"))
            .and_then(|t| t.get("webSocketDebuggerUrl").and_then(|v| v.as_str()))
            .map(|s| s.to_string())
            .ok_or_else(|| Error::engine_unavailable("no page target exposed by the engine"))
    }
}

/// Reserve an OS-assigned port for the debugging endpoint
fn free_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")
        .map_err(|e| Error::engine_unavailable(format!("could not reserve a port: {}", e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| Error::engine_unavailable(format!("could not read reserved port: {}", e)))?
        .port();
    drop(listener);
    Ok(port)
}

#[async_trait]
impl EngineDriver for EngineLauncher {
    async fn start(&self, kind: EngineKind) -> Result<Box<dyn EngineInstance>> {
        let candidates = self.candidates(kind)?;
        let port = free_port()?;
        let profile_dir =
            std::env::temp_dir().join(format!("scout-profile-{}", Uuid::new_v4()));

        tokio::fs::create_dir_all(&profile_dir)
            .await
            .map_err(|e| Error::engine_unavailable(format!("profile dir: {}", e)))?;

        let mut child: Option<Child> = None;
        let mut last_error = None;

        for candidate in &candidates {
            match self.command_for(kind, candidate, port, &profile_dir).spawn() {
                Ok(spawned) => {
                    info!("Started {} ({}) on port {}", kind, candidate, port);
                    child = Some(spawned);
                    break;
                }
                Err(e) => {
                    debug!("Candidate {} not startable: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        let mut child = child.ok_or_else(|| {
            Error::engine_unavailable(format!(
                "no {} executable could be started ({})",
                kind,
                last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no candidates".to_string())
            ))
        })?;

        if let Err(e) = self.wait_for_endpoint(port).await {
            let _ = child.kill().await;
            let _ = tokio::fs::remove_dir_all(&profile_dir).await;
            return Err(e);
        }

        let ws_url = match self.create_page_target(port).await {
            Ok(url) => url,
            Err(e) => {
                let _ = child.kill().await;
                let _ = tokio::fs::remove_dir_all(&profile_dir).await;
                return Err(e);
            }
        };

        let connection = match CdpWebSocketConnection::connect(&ws_url).await {
            Ok(conn) => conn,
            Err(e) => {
                let _ = child.kill().await;
                let _ = tokio::fs::remove_dir_all(&profile_dir).await;
                return Err(Error::engine_unavailable(format!(
                    "could not attach to page target: {}",
                    e
                )));
            }
        };

        let client: Arc<dyn CdpClient> = Arc::new(CdpClientImpl::new(connection));

        for domain in ["Page", "Runtime"] {
            if let Err(e) = client.enable_domain(domain).await {
                let _ = client.close().await;
                let _ = child.kill().await;
                let _ = tokio::fs::remove_dir_all(&profile_dir).await;
                return Err(Error::engine_unavailable(format!(
                    "could not enable {} domain: {}",
                    domain, e
                )));
            }
        }

        let page = Arc::new(CdpPage::new(
            Arc::clone(&client),
            Duration::from_millis(self.config.navigation_timeout),
        ));

        Ok(Box::new(LaunchedEngine {
            kind,
            child: Mutex::new(child),
            client,
            page,
            profile_dir,
            active: AtomicBool::new(true),
        }))
    }
}

/// One launched browser process plus its connected page
struct LaunchedEngine {
    kind: EngineKind,
    child: Mutex<Child>,
    client: Arc<dyn CdpClient>,
    page: Arc<CdpPage>,
    profile_dir: PathBuf,
    active: AtomicBool,
}

#[async_trait]
impl EngineInstance for LaunchedEngine {
    fn page(&self) -> Arc<dyn PageHandle> {
        Arc::clone(&self.page) as Arc<dyn PageHandle>
    }

    async fn shutdown(&self) -> Result<()> {
        if self.active.swap(false, Ordering::SeqCst) {
            debug!("Shutting down {} engine", self.kind);

            if let Err(e) = self.client.close().await {
                debug!("CDP close during shutdown failed: {}", e);
            }

            let mut child = self.child.lock().await;
            if let Err(e) = child.kill().await {
                // The process may have exited on its own
                warn!("Engine process kill failed: {}", e);
            }

            let _ = tokio::fs::remove_dir_all(&self.profile_dir).await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_port_is_nonzero() {
        let port = free_port().unwrap();
        assert!(port > 0);
    }

    #[test]
    fn test_webkit_requires_configured_path() {
        let launcher = EngineLauncher::new(Config::default()).unwrap();
        let result = launcher.candidates(EngineKind::Webkit);
        assert!(matches!(result, Err(Error::EngineUnavailable(_))));
    }

    #[test]
    fn test_configured_path_wins() {
        let config = Config {
            chromium_path: Some("/opt/custom/chromium".to_string()),
            ..Default::default()
        };
        let launcher = EngineLauncher::new(config).unwrap();
        let candidates = launcher.candidates(EngineKind::Chromium).unwrap();
        assert_eq!(candidates, vec!["/opt/custom/chromium".to_string()]);
    }

    #[test]
    fn test_default_chromium_candidates() {
        let launcher = EngineLauncher::new(Config::default()).unwrap();
        let candidates = launcher.candidates(EngineKind::Chromium).unwrap();
        assert!(candidates.contains(&"chromium".to_string()));
        assert!(candidates.len() > 1);
    }
}
