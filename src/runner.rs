use crate::command::LifecycleCommand;
use crate::error::{LifecycleError, Result};
use crate::progress::{line_stream, update_progress, ProgressSink};
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Lines of tool output kept for failure messages
const OUTPUT_TAIL_LINES: usize = 20;

/// Executes the external lifecycle tool.
///
/// Implementations must return [`LifecycleError::Cancelled`] when the user
/// aborts a running command, so the coordinator can restore prior state.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn execute(
        &self,
        command: LifecycleCommand,
        args: &[String],
        progress_title: Option<&str>,
    ) -> Result<()>;
}

/// Runs `cwctl` as a child process, streaming its combined output as progress
pub struct CliProcessRunner {
    cli_path: String,
    progress: Arc<dyn ProgressSink>,

    // Token for the command in flight; replaced after every cancel
    cancellation_token: Mutex<CancellationToken>,
}

impl CliProcessRunner {
    pub fn new(cli_path: impl Into<String>, progress: Arc<dyn ProgressSink>) -> Self {
        Self {
            cli_path: cli_path.into(),
            progress,
            cancellation_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Abort the command in flight. Later commands run normally.
    pub fn cancel_current(&self) {
        let mut token = self.cancellation_token.lock();
        token.cancel();
        *token = CancellationToken::new();
    }
}

#[async_trait]
impl ProcessRunner for CliProcessRunner {
    async fn execute(
        &self,
        command: LifecycleCommand,
        args: &[String],
        progress_title: Option<&str>,
    ) -> Result<()> {
        info!("Running {} {} {}", self.cli_path, command.cli_name(), args.join(" "));
        let cancellation_token = self.cancellation_token.lock().clone();

        let mut child = Command::new(&self.cli_path)
            .arg(command.cli_name())
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!("Failed to launch {}: {}", self.cli_path, e);
                LifecycleError::operation_failed(
                    command,
                    format!("could not launch {}: {}", self.cli_path, e),
                )
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LifecycleError::system("child stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| LifecycleError::system("child stderr was not captured"))?;

        if let Some(title) = progress_title {
            self.progress.begin(title);
        }

        let tail = Arc::new(Mutex::new(VecDeque::with_capacity(OUTPUT_TAIL_LINES)));
        let tail_writer = Arc::clone(&tail);
        let output = futures::stream::select(line_stream(stdout), line_stream(stderr)).inspect(
            move |line: &String| {
                let mut tail = tail_writer.lock();
                if tail.len() == OUTPUT_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line.clone());
            },
        );

        let sink = self.progress.as_ref();
        let outcome = tokio::select! {
            (_, status) = async { tokio::join!(update_progress(command, output, sink), child.wait()) } => Some(status),
            _ = cancellation_token.cancelled() => None,
        };

        self.progress.finish();

        let status = match outcome {
            Some(status) => status?,
            None => {
                warn!("{} cancelled, terminating {}", command, self.cli_path);
                if let Err(e) = child.kill().await {
                    warn!("Failed to terminate {}: {}", self.cli_path, e);
                }
                return Err(LifecycleError::Cancelled { command });
            }
        };

        if status.success() {
            debug!("{} completed", command);
            return Ok(());
        }

        let output = tail.lock().iter().cloned().collect::<Vec<_>>().join("\n");
        error!("{} exited with {}", command, status);

        let message = if output.is_empty() {
            format!("exited with {}", status)
        } else {
            format!("exited with {}:\n{}", status, output)
        };
        Err(LifecycleError::operation_failed(command, message))
    }
}
