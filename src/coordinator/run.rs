use super::LifecycleCoordinator;
use crate::command::LifecycleCommand;
use crate::error::{LifecycleError, Result};
use crate::notifier::Prompt;
use crate::tag::resolve_tag;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

/// Marks a command as in flight; releases the slot when dropped
pub(super) struct OperationGuard<'a> {
    slot: &'a Mutex<Option<LifecycleCommand>>,
    command: LifecycleCommand,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
        debug!("Released lifecycle slot held by {}", self.command);
    }
}

impl LifecycleCoordinator {
    /// Claim the lifecycle slot, or return the command already holding it
    pub(super) fn try_begin(
        &self,
        command: LifecycleCommand,
    ) -> std::result::Result<OperationGuard<'_>, LifecycleCommand> {
        let mut current = self.current_operation.lock();
        if let Some(running) = *current {
            return Err(running);
        }
        *current = Some(command);

        Ok(OperationGuard {
            slot: &self.current_operation,
            command,
        })
    }

    /// Run a lifecycle command, using `tag_override` instead of the resolved
    /// tag when given.
    pub async fn run_command(
        &self,
        command: LifecycleCommand,
        tag_override: Option<&str>,
    ) -> Result<()> {
        self.run_command_with_args(command, tag_override, Vec::new())
            .await
    }

    pub(super) async fn run_command_with_args(
        &self,
        command: LifecycleCommand,
        tag_override: Option<&str>,
        extra_args: Vec<String>,
    ) -> Result<()> {
        let guard = match self.try_begin(command) {
            Ok(guard) => guard,
            Err(running) => {
                let err = LifecycleError::Busy {
                    running,
                    requested: command,
                };
                warn!("{}", err);
                self.notifier.show(Prompt::warning(err.user_message())).await;
                return Err(err);
            }
        };

        let tag = resolve_tag(
            tag_override,
            &self.config.environment,
            &self.config.install.default_tag,
        );

        let mut args = Vec::with_capacity(2 + extra_args.len());
        if command.wants_tag() {
            args.push("-t".to_string());
            args.push(tag.clone());
        }
        args.extend(extra_args);

        let previous_state = self.state.current_state();
        let transitions = command.transitions();
        if let Some(transitions) = transitions {
            self.state.change_state(transitions.during);
        }

        let action = command.action_name(&tag);
        let progress_title = command.shows_progress_title().then(|| action.clone());
        info!("{}", action);

        let result = self
            .runner
            .execute(command, &args, progress_title.as_deref())
            .await;

        match result {
            Ok(()) => {
                if let Some(transitions) = transitions {
                    self.state.change_state(transitions.after);
                }
                drop(guard);
                info!("{} completed", command);
                Ok(())
            }
            Err(e) if e.is_cancellation() => {
                self.state.change_state(previous_state);
                drop(guard);
                info!("{} cancelled, state restored to {:?}", command, previous_state);
                Err(e)
            }
            Err(e) => {
                if let Some(transitions) = transitions {
                    self.state.change_state(transitions.on_error);
                }
                drop(guard);
                error!("{} failed: {}", command, e);

                // Install failures are surfaced by the install dialog flow
                if command != LifecycleCommand::Install {
                    self.notifier.show(Prompt::error(e.user_message())).await;
                }
                Err(e)
            }
        }
    }

    pub async fn start(&self) -> Result<()> {
        self.run_command(LifecycleCommand::Start, None).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.run_command(LifecycleCommand::Stop, None).await
    }
}
