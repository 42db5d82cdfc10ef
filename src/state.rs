use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Application states of the local backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendState {
    Unknown,
    Stopped,
    Installing,
    InstallFailed,
    Starting,
    StartFailed,
    Started,
    Stopping,
    StopFailed,
    Removing,
    Error,
}

impl BackendState {
    /// True while a lifecycle command is driving the backend between states
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self,
            BackendState::Installing
                | BackendState::Starting
                | BackendState::Stopping
                | BackendState::Removing
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            BackendState::InstallFailed
                | BackendState::StartFailed
                | BackendState::StopFailed
                | BackendState::Error
        )
    }
}

impl fmt::Display for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BackendState::Unknown => "Unknown",
            BackendState::Stopped => "Stopped",
            BackendState::Installing => "Installing",
            BackendState::InstallFailed => "Install failed",
            BackendState::Starting => "Starting",
            BackendState::StartFailed => "Start failed",
            BackendState::Started => "Started",
            BackendState::Stopping => "Stopping",
            BackendState::StopFailed => "Stop failed",
            BackendState::Removing => "Removing",
            BackendState::Error => "Error",
        };
        f.write_str(label)
    }
}

/// Holder of the current application state. The coordinator only triggers
/// transitions through this trait.
pub trait StateHolder: Send + Sync {
    fn current_state(&self) -> BackendState;
    fn change_state(&self, state: BackendState);
}

/// In-memory state holder
pub struct SharedStateHolder {
    state: Mutex<BackendState>,
}

impl SharedStateHolder {
    pub fn new(initial: BackendState) -> Self {
        Self {
            state: Mutex::new(initial),
        }
    }
}

impl Default for SharedStateHolder {
    fn default() -> Self {
        Self::new(BackendState::Unknown)
    }
}

impl StateHolder for SharedStateHolder {
    fn current_state(&self) -> BackendState {
        *self.state.lock()
    }

    fn change_state(&self, state: BackendState) {
        let mut current = self.state.lock();
        debug!("Backend state changed from {:?} to {:?}", *current, state);
        *current = state;
    }
}
