use crate::command::LifecycleCommand;
use crate::config::LifecycleConfig;
use crate::error::Result;
use crate::notifier::Notifier;
use crate::runner::ProcessRunner;
use crate::state::{BackendState, StateHolder};
use crate::status::{Status, StatusQuery};
use crate::tag::resolve_tag;
use parking_lot::Mutex;
use std::sync::Arc;

/// Serialises lifecycle commands against the external tool and maps them to
/// application state transitions.
///
/// At most one command is in flight per coordinator. A second caller is
/// rejected with [`crate::LifecycleError::Busy`] instead of waiting.
pub struct LifecycleCoordinator {
    pub(super) config: LifecycleConfig,
    pub(super) runner: Arc<dyn ProcessRunner>,
    pub(super) status_query: Arc<dyn StatusQuery>,
    pub(super) state: Arc<dyn StateHolder>,
    pub(super) notifier: Arc<dyn Notifier>,

    // Command currently running, if any
    pub(super) current_operation: Mutex<Option<LifecycleCommand>>,
}

impl LifecycleCoordinator {
    pub fn new(
        config: LifecycleConfig,
        runner: Arc<dyn ProcessRunner>,
        status_query: Arc<dyn StatusQuery>,
        state: Arc<dyn StateHolder>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            runner,
            status_query,
            state,
            notifier,
            current_operation: Mutex::new(None),
        }
    }

    /// Backend version this coordinator installs and starts
    pub fn tag(&self) -> String {
        resolve_tag(
            None,
            &self.config.environment,
            &self.config.install.default_tag,
        )
    }

    pub fn current_operation(&self) -> Option<LifecycleCommand> {
        *self.current_operation.lock()
    }

    pub fn current_state(&self) -> BackendState {
        self.state.current_state()
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Fresh status snapshot from the status query
    pub async fn status(&self) -> Result<Status> {
        self.status_query.status().await
    }
}
