use super::types::{
    InstallConfirmation, RetryPromptOutcome, INSTALL_BUTTON, MORE_INFO_BUTTON, OK_BUTTON,
    RETRY_BUTTON,
};
use super::LifecycleCoordinator;
use crate::command::LifecycleCommand;
use crate::error::{LifecycleError, Result};
use crate::notifier::Prompt;
use crate::state::BackendState;
use tracing::{error, info, warn};

impl LifecycleCoordinator {
    /// Install the backend, asking first unless `prompt_for_install` is false
    /// or the environment is in dev/test mode.
    ///
    /// A failed or declined install falls into the retry prompt loop; the
    /// call returns once an install succeeds or the user gives up.
    pub async fn install(&self, prompt_for_install: bool) -> Result<()> {
        let mut prompt = prompt_for_install && !self.config.environment.mode.is_dev_or_test();
        if prompt_for_install && !prompt {
            info!(
                "Installing without confirmation in {} mode",
                self.config.environment.mode.as_str()
            );
        }

        loop {
            let confirmation = if prompt {
                self.confirm_install().await
            } else {
                InstallConfirmation::Accepted
            };

            let rejected = match confirmation {
                InstallConfirmation::Accepted => {
                    match self.run_command(LifecycleCommand::Install, None).await {
                        Ok(()) => {
                            self.notifier
                                .show(Prompt::info(format!(
                                    "Codewind {} was installed successfully.",
                                    self.tag()
                                )))
                                .await;
                            return Ok(());
                        }
                        Err(e) if e.is_cancellation() => return Err(e),
                        Err(e @ LifecycleError::Busy { .. }) => return Err(e),
                        Err(e) => {
                            error!("Install failed: {}", e);
                            self.state.change_state(BackendState::InstallFailed);
                            self.notifier.show(Prompt::error(e.user_message())).await;
                            false
                        }
                    }
                }
                InstallConfirmation::MoreInfoThenLoop => {
                    self.open_docs().await;
                    true
                }
                InstallConfirmation::Rejected => true,
            };

            self.on_install_fail_or_reject(rejected).await?;
            // Retry chosen; the user already agreed to install
            prompt = false;
        }
    }

    /// Warn that Codewind is not installed and offer Retry, More Info or OK.
    /// Returns once Retry is chosen; OK or dismissing the prompt fails with
    /// [`LifecycleError::UserCancelled`].
    pub async fn on_install_fail_or_reject(&self, rejected: bool) -> Result<()> {
        loop {
            match self.prompt_install_fail_or_reject(rejected).await {
                RetryPromptOutcome::Retry => return Ok(()),
                RetryPromptOutcome::MoreInfoThenLoop => self.open_docs().await,
                RetryPromptOutcome::Rejected => {
                    info!("User declined to install Codewind");
                    return Err(LifecycleError::UserCancelled);
                }
            }
        }
    }

    async fn confirm_install(&self) -> InstallConfirmation {
        let message = format!(
            "Codewind {} must be installed before it can start. \
             This downloads several container images and may take a few minutes. Install now?",
            self.tag()
        );

        let choice = self
            .notifier
            .show(
                Prompt::info(message)
                    .modal()
                    .with_buttons(&[INSTALL_BUTTON, MORE_INFO_BUTTON]),
            )
            .await;

        match choice.as_deref() {
            Some(INSTALL_BUTTON) => InstallConfirmation::Accepted,
            Some(MORE_INFO_BUTTON) => InstallConfirmation::MoreInfoThenLoop,
            _ => InstallConfirmation::Rejected,
        }
    }

    async fn prompt_install_fail_or_reject(&self, rejected: bool) -> RetryPromptOutcome {
        let message = if rejected {
            format!(
                "Codewind {} must be installed before projects can be created or managed.",
                self.tag()
            )
        } else {
            format!("Installing Codewind {} failed.", self.tag())
        };

        // Unattended answers acknowledge instead of retrying forever
        let choice = self
            .notifier
            .show(
                Prompt::warning(message)
                    .with_buttons(&[RETRY_BUTTON, MORE_INFO_BUTTON, OK_BUTTON])
                    .with_default(OK_BUTTON),
            )
            .await;

        match choice.as_deref() {
            Some(RETRY_BUTTON) => RetryPromptOutcome::Retry,
            Some(MORE_INFO_BUTTON) => RetryPromptOutcome::MoreInfoThenLoop,
            _ => RetryPromptOutcome::Rejected,
        }
    }

    async fn open_docs(&self) {
        let url = &self.config.install.docs_url;
        if let Err(e) = self.notifier.open_external(url).await {
            warn!("Failed to open {}: {}", url, e);
        }
    }
}
