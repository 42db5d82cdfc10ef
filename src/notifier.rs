use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageLevel::Info => f.write_str("info"),
            MessageLevel::Warning => f.write_str("warning"),
            MessageLevel::Error => f.write_str("error"),
        }
    }
}

/// A message shown to the user, optionally with button choices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub level: MessageLevel,
    pub message: String,
    pub modal: bool,
    pub buttons: Vec<String>,
    /// Button chosen when prompts are answered unattended
    pub default_button: Option<String>,
}

impl Prompt {
    pub fn new(level: MessageLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            modal: false,
            buttons: Vec::new(),
            default_button: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, message)
    }

    pub fn modal(mut self) -> Self {
        self.modal = true;
        self
    }

    pub fn with_buttons(mut self, buttons: &[&str]) -> Self {
        self.buttons = buttons.iter().map(|b| b.to_string()).collect();
        self
    }

    pub fn with_default(mut self, button: &str) -> Self {
        self.default_button = Some(button.to_string());
        self
    }

    /// The default button if one is set and offered, otherwise the first button
    pub fn default_choice(&self) -> Option<String> {
        self.default_button
            .as_ref()
            .filter(|d| self.buttons.contains(*d))
            .or_else(|| self.buttons.first())
            .cloned()
    }
}

/// UI dialogs. `show` returns the label of the chosen button, or `None`
/// when the message was dismissed.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, prompt: Prompt) -> Option<String>;
    async fn open_external(&self, url: &str) -> Result<()>;
}

/// Terminal notifier: messages on stderr, choices read from stdin
pub struct ConsoleNotifier {
    assume_yes: bool,
}

impl ConsoleNotifier {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn pick(buttons: &[String], answer: &str) -> Option<String> {
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }

        if let Ok(index) = answer.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| buttons.get(i))
                .cloned();
        }

        buttons
            .iter()
            .find(|b| b.eq_ignore_ascii_case(answer))
            .cloned()
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn show(&self, prompt: Prompt) -> Option<String> {
        eprintln!("[{}] {}", prompt.level, prompt.message);

        if prompt.buttons.is_empty() {
            return None;
        }

        if self.assume_yes {
            let choice = prompt.default_choice();
            info!("Assuming {:?} for prompt: {}", choice, prompt.message);
            return choice;
        }

        for (i, button) in prompt.buttons.iter().enumerate() {
            eprintln!("  {}) {}", i + 1, button);
        }
        eprint!("Choose an option (empty to dismiss): ");

        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut answer).await {
            Ok(0) => None,
            Ok(_) => {
                let choice = Self::pick(&prompt.buttons, &answer);
                debug!("Prompt answered with {:?}", choice);
                choice
            }
            Err(e) => {
                warn!("Failed to read prompt answer: {}", e);
                None
            }
        }
    }

    async fn open_external(&self, url: &str) -> Result<()> {
        eprintln!("More information: {}", url);

        let opener = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "explorer"
        } else {
            "xdg-open"
        };

        match tokio::process::Command::new(opener)
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) if status.success() => debug!("Opened {} with {}", url, opener),
            Ok(status) => debug!("{} exited with {} for {}", opener, status, url),
            Err(e) => debug!("Could not launch {}: {}", opener, e),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buttons() -> Vec<String> {
        vec!["Install".to_string(), "More Info".to_string()]
    }

    #[test]
    fn test_pick_by_index_and_label() {
        assert_eq!(ConsoleNotifier::pick(&buttons(), "1\n"), Some("Install".to_string()));
        assert_eq!(
            ConsoleNotifier::pick(&buttons(), "more info"),
            Some("More Info".to_string())
        );
        assert_eq!(ConsoleNotifier::pick(&buttons(), "0"), None);
        assert_eq!(ConsoleNotifier::pick(&buttons(), "3"), None);
        assert_eq!(ConsoleNotifier::pick(&buttons(), ""), None);
    }

    #[tokio::test]
    async fn test_assume_yes_picks_first_button() {
        let notifier = ConsoleNotifier::new(true);
        let choice = notifier
            .show(Prompt::warning("Replace?").modal().with_buttons(&["Yes", "No"]))
            .await;
        assert_eq!(choice, Some("Yes".to_string()));
    }

    #[tokio::test]
    async fn test_assume_yes_honours_default_button() {
        let notifier = ConsoleNotifier::new(true);
        let choice = notifier
            .show(
                Prompt::warning("Install failed.")
                    .with_buttons(&["Retry", "More Info", "OK"])
                    .with_default("OK"),
            )
            .await;
        assert_eq!(choice, Some("OK".to_string()));
    }

    #[test]
    fn test_default_must_be_offered() {
        let prompt = Prompt::info("Install?")
            .with_buttons(&["Install"])
            .with_default("OK");
        assert_eq!(prompt.default_choice(), Some("Install".to_string()));
    }

    #[tokio::test]
    async fn test_message_without_buttons() {
        let notifier = ConsoleNotifier::new(false);
        assert_eq!(notifier.show(Prompt::info("Codewind installed")).await, None);
    }
}
