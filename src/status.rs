use crate::error::{LifecycleError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error};

/// Snapshot of installed and running backend versions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(rename = "installed-versions", default)]
    pub installed_versions: Vec<String>,

    #[serde(rename = "started", default)]
    pub started_versions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Status {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_installed(&self, tag: &str) -> bool {
        self.installed_versions.iter().any(|v| v == tag)
    }
}

/// Whether the backend is running, and at which version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartedStatus {
    Stopped,
    StartedWrongVersion,
    StartedCorrectVersion,
}

impl StartedStatus {
    pub fn classify(status: &Status, tag: &str) -> Self {
        if status.started_versions.is_empty() {
            StartedStatus::Stopped
        } else if status.started_versions.iter().any(|v| v == tag) {
            StartedStatus::StartedCorrectVersion
        } else {
            StartedStatus::StartedWrongVersion
        }
    }
}

/// Source of backend status. Never cached; every call re-queries.
///
/// Workspace upgrades are not part of this trait; they run as
/// `LifecycleCommand::Upgrade` with `--ws <dir>` through the process runner.
#[async_trait]
pub trait StatusQuery: Send + Sync {
    async fn status(&self) -> Result<Status>;
}

/// Queries status through `cwctl status -j`
pub struct CliStatusQuery {
    cli_path: String,
}

impl CliStatusQuery {
    pub fn new(cli_path: impl Into<String>) -> Self {
        Self {
            cli_path: cli_path.into(),
        }
    }
}

#[async_trait]
impl StatusQuery for CliStatusQuery {
    async fn status(&self) -> Result<Status> {
        debug!("Querying status with {} status -j", self.cli_path);

        let output = Command::new(&self.cli_path)
            .args(["status", "-j"])
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("Status query exited with {}: {}", output.status, stderr.trim());
            return Err(LifecycleError::status(format!(
                "{} status exited with {}: {}",
                self.cli_path,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let status = Status::parse(stdout.trim()).map_err(|e| {
            LifecycleError::status(format!("unreadable status output: {}", e))
        })?;

        debug!("Status: {:?}", status);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(installed: &[&str], started: &[&str]) -> Status {
        Status {
            installed_versions: installed.iter().map(|v| v.to_string()).collect(),
            started_versions: started.iter().map(|v| v.to_string()).collect(),
            url: None,
        }
    }

    #[test]
    fn test_parse_status_output() {
        let parsed = Status::parse(
            r#"{"status":"started","installed-versions":["0.5.0","0.4.0"],"started":["0.5.0"],"url":"http://127.0.0.1:10000/"}"#,
        )
        .unwrap();

        assert_eq!(parsed.installed_versions, vec!["0.5.0", "0.4.0"]);
        assert_eq!(parsed.started_versions, vec!["0.5.0"]);
        assert_eq!(parsed.url.as_deref(), Some("http://127.0.0.1:10000/"));
        assert!(parsed.is_installed("0.4.0"));
    }

    #[test]
    fn test_parse_missing_keys_as_empty() {
        let parsed = Status::parse(r#"{"status":"uninstalled"}"#).unwrap();
        assert_eq!(parsed, Status::default());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Status::parse("cwctl: command not found").is_err());
    }

    #[test]
    fn test_classify_started_status() {
        assert_eq!(
            StartedStatus::classify(&status(&["0.5.0"], &[]), "0.5.0"),
            StartedStatus::Stopped
        );
        assert_eq!(
            StartedStatus::classify(&status(&["0.5.0"], &["0.5.0"]), "0.5.0"),
            StartedStatus::StartedCorrectVersion
        );
        assert_eq!(
            StartedStatus::classify(&status(&["0.4.0"], &["0.4.0"]), "0.5.0"),
            StartedStatus::StartedWrongVersion
        );
    }

    #[tokio::test]
    async fn test_missing_cli_is_an_error() {
        let query = CliStatusQuery::new("/nonexistent/codewind/cwctl");
        assert!(query.status().await.is_err());
    }
}
