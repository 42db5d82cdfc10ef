use crate::command::LifecycleCommand;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

/// Final line printed by the installer, carries no progress
pub const TAGGING_SENTINEL: &str = "Image Tagging Successful";

const PULL_MARKER: &str = "Pulling from";

/// Result of interpreting one line of tool output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressLine {
    Progress(String),
    Ignored,
    ParseError(String),
}

#[derive(Debug, Deserialize)]
struct PullRecord {
    #[serde(default)]
    status: String,
    #[serde(default)]
    id: String,
}

/// Receiver of progress messages, typically a UI progress bar
pub trait ProgressSink: Send + Sync {
    fn begin(&self, title: &str);
    fn report(&self, message: &str);
    fn finish(&self);
}

/// Interpret a single output line from `command`
pub fn parse_line(command: LifecycleCommand, line: &str) -> ProgressLine {
    if line.is_empty() {
        return ProgressLine::Ignored;
    }

    if !command.reports_json_progress() {
        return ProgressLine::Progress(line.to_string());
    }

    if line.trim() == TAGGING_SENTINEL {
        return ProgressLine::Ignored;
    }

    match serde_json::from_str::<PullRecord>(line) {
        Ok(record) if line.contains(PULL_MARKER) => {
            ProgressLine::Progress(format!("{}:{}", record.status, record.id))
        }
        Ok(_) => ProgressLine::Ignored,
        Err(e) => ProgressLine::ParseError(e.to_string()),
    }
}

/// Forward progress from a line stream to `sink` until the stream ends.
/// Returns the number of progress messages reported.
pub async fn update_progress<S>(command: LifecycleCommand, lines: S, sink: &dyn ProgressSink) -> usize
where
    S: Stream<Item = String>,
{
    let mut lines = std::pin::pin!(lines);
    let mut reported = 0;

    while let Some(line) = lines.next().await {
        match parse_line(command, &line) {
            ProgressLine::Progress(message) => {
                sink.report(&message);
                reported += 1;
            }
            ProgressLine::Ignored => {}
            ProgressLine::ParseError(e) => {
                warn!("Unreadable {} progress line {:?}: {}", command, line, e);
            }
        }
    }

    debug!("{} output closed after {} progress updates", command, reported);
    reported
}

/// Lazy stream of lines read from `reader`, ending when the reader closes
pub fn line_stream<R>(reader: R) -> impl Stream<Item = String> + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    futures::stream::unfold(BufReader::new(reader).lines(), |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((line, lines)),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read process output: {}", e);
                None
            }
        }
    })
}

/// Progress sink that writes to stderr
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn begin(&self, title: &str) {
        eprintln!("==> {}", title);
    }

    fn report(&self, message: &str) {
        eprintln!("    {}", message);
    }

    fn finish(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<String>>,
    }

    impl ProgressSink for RecordingSink {
        fn begin(&self, _title: &str) {}

        fn report(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }

        fn finish(&self) {}
    }

    fn lines(items: &[&str]) -> impl Stream<Item = String> {
        futures::stream::iter(items.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_plain_lines_forwarded_verbatim() {
        assert_eq!(
            parse_line(LifecycleCommand::Stop, "Stopping codewind-pfe ... done"),
            ProgressLine::Progress("Stopping codewind-pfe ... done".to_string())
        );
        assert_eq!(parse_line(LifecycleCommand::Start, ""), ProgressLine::Ignored);
    }

    #[test]
    fn test_whitespace_only_line_is_not_empty() {
        assert_eq!(
            parse_line(LifecycleCommand::Start, "   "),
            ProgressLine::Progress("   ".to_string())
        );
        assert!(matches!(
            parse_line(LifecycleCommand::Install, "   "),
            ProgressLine::ParseError(_)
        ));
    }

    #[test]
    fn test_install_pull_line() {
        assert_eq!(
            parse_line(
                LifecycleCommand::Install,
                r#"{"status":"Pulling from x","id":"latest"}"#
            ),
            ProgressLine::Progress("Pulling from x:latest".to_string())
        );
    }

    #[test]
    fn test_install_sentinel_suppressed() {
        assert_eq!(
            parse_line(LifecycleCommand::Install, "Image Tagging Successful"),
            ProgressLine::Ignored
        );
    }

    #[test]
    fn test_install_other_records_ignored() {
        assert_eq!(
            parse_line(
                LifecycleCommand::Install,
                r#"{"status":"Downloading","id":"a1b2c3"}"#
            ),
            ProgressLine::Ignored
        );
    }

    #[test]
    fn test_install_malformed_json() {
        assert!(matches!(
            parse_line(LifecycleCommand::Install, "not-json"),
            ProgressLine::ParseError(_)
        ));
    }

    #[tokio::test]
    async fn test_update_progress_plain_command() {
        let sink = RecordingSink::default();
        let count = update_progress(
            LifecycleCommand::Start,
            lines(&["Starting", "", "  ", "Started"]),
            &sink,
        )
        .await;

        assert_eq!(count, 3);
        assert_eq!(*sink.messages.lock(), vec!["Starting", "  ", "Started"]);
    }

    #[tokio::test]
    async fn test_update_progress_install_survives_bad_lines() {
        let sink = RecordingSink::default();
        let count = update_progress(
            LifecycleCommand::Install,
            lines(&[
                "not-json",
                r#"{"status":"Pulling from eclipse/codewind-pfe","id":"0.5.0"}"#,
                r#"{"status":"Extracting","id":"f00"}"#,
                "Image Tagging Successful",
            ]),
            &sink,
        )
        .await;

        assert_eq!(count, 1);
        assert_eq!(
            *sink.messages.lock(),
            vec!["Pulling from eclipse/codewind-pfe:0.5.0"]
        );
    }

    #[tokio::test]
    async fn test_line_stream_reads_until_close() {
        let reader: &[u8] = b"first\nsecond\n\nthird";
        let collected: Vec<String> = line_stream(reader).collect().await;
        assert_eq!(collected, vec!["first", "second", "", "third"]);
    }
}
