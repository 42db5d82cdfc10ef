use crate::state::BackendState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State changes applied around a lifecycle command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransitions {
    pub during: BackendState,
    pub on_error: BackendState,
    pub after: BackendState,
}

/// Commands understood by the external lifecycle tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleCommand {
    Install,
    Start,
    Stop,
    Remove,
    Upgrade,
}

impl LifecycleCommand {
    pub const ALL: [LifecycleCommand; 5] = [
        LifecycleCommand::Install,
        LifecycleCommand::Start,
        LifecycleCommand::Stop,
        LifecycleCommand::Remove,
        LifecycleCommand::Upgrade,
    ];

    /// Sub-command passed to the lifecycle tool
    pub fn cli_name(&self) -> &'static str {
        match self {
            LifecycleCommand::Install => "install",
            LifecycleCommand::Start => "start",
            LifecycleCommand::Stop => "stop-all",
            LifecycleCommand::Remove => "remove",
            LifecycleCommand::Upgrade => "upgrade",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LifecycleCommand::Install => "install",
            LifecycleCommand::Start => "start",
            LifecycleCommand::Stop => "stop",
            LifecycleCommand::Remove => "remove",
            LifecycleCommand::Upgrade => "upgrade",
        }
    }

    /// Whether the command receives `-t <tag>`
    pub fn wants_tag(&self) -> bool {
        matches!(
            self,
            LifecycleCommand::Install | LifecycleCommand::Start | LifecycleCommand::Remove
        )
    }

    pub fn transitions(&self) -> Option<StateTransitions> {
        match self {
            LifecycleCommand::Install => Some(StateTransitions {
                during: BackendState::Installing,
                on_error: BackendState::InstallFailed,
                after: BackendState::Stopped,
            }),
            LifecycleCommand::Start => Some(StateTransitions {
                during: BackendState::Starting,
                on_error: BackendState::StartFailed,
                after: BackendState::Started,
            }),
            LifecycleCommand::Stop => Some(StateTransitions {
                during: BackendState::Stopping,
                on_error: BackendState::StopFailed,
                after: BackendState::Stopped,
            }),
            LifecycleCommand::Remove => Some(StateTransitions {
                during: BackendState::Removing,
                on_error: BackendState::Error,
                after: BackendState::Stopped,
            }),
            LifecycleCommand::Upgrade => None,
        }
    }

    /// Human-readable description of the running action
    pub fn action_name(&self, tag: &str) -> String {
        match self {
            LifecycleCommand::Install => format!("Installing Codewind {}", tag),
            LifecycleCommand::Start => format!("Starting Codewind {}", tag),
            LifecycleCommand::Stop => "Stopping Codewind".to_string(),
            LifecycleCommand::Remove => format!("Removing Codewind {}", tag),
            LifecycleCommand::Upgrade => "Migrating Codewind workspace".to_string(),
        }
    }

    /// Stop output is self-explanatory, so it runs without a progress title
    pub fn shows_progress_title(&self) -> bool {
        !matches!(self, LifecycleCommand::Stop)
    }

    /// Install streams JSON pull records instead of plain lines
    pub fn reports_json_progress(&self) -> bool {
        matches!(self, LifecycleCommand::Install)
    }
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_commands() {
        let tagged: Vec<_> = LifecycleCommand::ALL
            .iter()
            .filter(|cmd| cmd.wants_tag())
            .collect();
        assert_eq!(
            tagged,
            vec![
                &LifecycleCommand::Install,
                &LifecycleCommand::Start,
                &LifecycleCommand::Remove
            ]
        );
    }

    #[test]
    fn test_stop_has_no_progress_title() {
        assert!(!LifecycleCommand::Stop.shows_progress_title());
        assert!(LifecycleCommand::Install.shows_progress_title());
        assert!(LifecycleCommand::Upgrade.shows_progress_title());
    }

    #[test]
    fn test_start_transitions() {
        let transitions = LifecycleCommand::Start.transitions().unwrap();
        assert_eq!(transitions.during, BackendState::Starting);
        assert_eq!(transitions.on_error, BackendState::StartFailed);
        assert_eq!(transitions.after, BackendState::Started);
        assert!(LifecycleCommand::Upgrade.transitions().is_none());
    }

    #[test]
    fn test_action_name_includes_tag() {
        assert_eq!(
            LifecycleCommand::Install.action_name("0.5.0"),
            "Installing Codewind 0.5.0"
        );
        assert_eq!(LifecycleCommand::Stop.cli_name(), "stop-all");
    }
}
