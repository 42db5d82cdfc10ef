use crate::command::LifecycleCommand;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("{running} is already in progress, cannot run {requested}")]
    Busy {
        running: LifecycleCommand,
        requested: LifecycleCommand,
    },

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("{command} was cancelled")]
    Cancelled { command: LifecycleCommand },

    #[error("{command} failed: {message}")]
    OperationFailed {
        command: LifecycleCommand,
        message: String,
    },

    #[error("Status query failed: {message}")]
    Status { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("System error: {message}")]
    System { message: String },
}

impl LifecycleError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn status<S: Into<String>>(message: S) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn operation_failed<S: Into<String>>(command: LifecycleCommand, message: S) -> Self {
        Self::OperationFailed {
            command,
            message: message.into(),
        }
    }

    /// Process-level abort signalled by the runner
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The user declined a confirmation; callers should not treat this as a failure
    pub fn is_user_cancelled(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Busy { running, .. } => format!(
                "Please wait for {} to finish before running another command.",
                running.label()
            ),
            Self::UserCancelled => "Cancelled.".to_string(),
            Self::Cancelled { command } => format!("Cancelled {}.", command.label()),
            Self::OperationFailed { command, message } => {
                format!("Error running {}: {}", command.label(), message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
