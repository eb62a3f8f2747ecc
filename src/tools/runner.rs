//! `run_package_script` operation
//!
//! Stateless forwarder to a JavaScript package manager: spawn, capture,
//! report. No sequencing, no session, no shell.

use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

use super::args::RunScriptArgs;
use super::Report;
use crate::{Error, Result};

/// Package managers the forwarder will invoke
const ALLOWED_MANAGERS: &[&str] = &["npm", "pnpm", "yarn", "bun"];

pub async fn run(args: RunScriptArgs) -> Result<Report> {
    let script = args.script.trim();
    if script.is_empty() {
        return Err(Error::invalid_argument("script must not be empty"));
    }

    let manager = args.manager.as_deref().unwrap_or("npm");
    if !ALLOWED_MANAGERS.contains(&manager) {
        return Err(Error::invalid_argument(format!(
            "unsupported package manager '{}'",
            manager
        )));
    }

    let mut cmd = Command::new(manager);
    cmd.arg("run").arg(script).args(&args.args);
    if let Some(cwd) = &args.cwd {
        cmd.current_dir(cwd);
    }
    cmd.stdin(Stdio::null());

    info!("Forwarding to {} run {}", manager, script);

    let output = cmd
        .output()
        .await
        .map_err(|e| Error::internal(format!("failed to spawn {}: {}", manager, e)))?;

    Ok(Report::Script {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_script_rejected() {
        let result = run(RunScriptArgs {
            script: "  ".to_string(),
            args: vec![],
            manager: None,
            cwd: None,
        })
        .await;

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_unknown_manager_rejected() {
        let result = run(RunScriptArgs {
            script: "build".to_string(),
            args: vec![],
            manager: Some("make".to_string()),
            cwd: None,
        })
        .await;

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
