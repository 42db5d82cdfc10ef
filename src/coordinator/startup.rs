use super::types::{STOP_AND_UPGRADE_BUTTON, UPGRADE_BUTTON};
use super::LifecycleCoordinator;
use crate::command::LifecycleCommand;
use crate::error::{LifecycleError, Result};
use crate::notifier::Prompt;
use crate::state::BackendState;
use crate::status::{StartedStatus, Status};
use crate::workspace::{is_migration_required, legacy_workspace_exists};
use tracing::{debug, info};

impl LifecycleCoordinator {
    /// Bring the backend up at the resolved tag: stop a mismatched running
    /// version, replace mismatched installs, install, start, and migrate a
    /// legacy workspace when needed.
    pub async fn install_and_start(&self) -> Result<()> {
        let tag = self.tag();
        let status = self.status_query.status().await?;
        let started = StartedStatus::classify(&status, &tag);
        info!("Codewind {} requested, backend is {:?}", tag, started);

        if started == StartedStatus::StartedCorrectVersion {
            self.state.change_state(BackendState::Started);
            return Ok(());
        }

        let mut upgrade_confirmed = false;

        if started == StartedStatus::StartedWrongVersion {
            let message = format!(
                "Codewind {} is running, but version {} is required. Stop it and upgrade to {}?",
                status.started_versions.join(", "),
                tag,
                tag
            );
            let choice = self
                .notifier
                .show(
                    Prompt::warning(message)
                        .modal()
                        .with_buttons(&[STOP_AND_UPGRADE_BUTTON]),
                )
                .await;

            if choice.as_deref() != Some(STOP_AND_UPGRADE_BUTTON) {
                info!("User declined to stop the running version");
                return Err(LifecycleError::UserCancelled);
            }

            self.run_command(LifecycleCommand::Stop, None).await?;
            upgrade_confirmed = true;
        }

        if !status.is_installed(&tag) {
            if !status.installed_versions.is_empty() {
                if !upgrade_confirmed {
                    let message = format!(
                        "Codewind {} is installed, but version {} is required. \
                         Remove the installed version and install {}?",
                        status.installed_versions.join(", "),
                        tag,
                        tag
                    );
                    let choice = self
                        .notifier
                        .show(Prompt::warning(message).modal().with_buttons(&[UPGRADE_BUTTON]))
                        .await;

                    if choice.as_deref() != Some(UPGRADE_BUTTON) {
                        info!("User declined to replace the installed version");
                        return Err(LifecycleError::UserCancelled);
                    }
                    upgrade_confirmed = true;
                }

                self.remove_all_images().await?;
            }

            self.install(!upgrade_confirmed).await?;
        }

        self.run_command(LifecycleCommand::Start, None).await?;
        self.migrate_legacy_workspace(&status.installed_versions)
            .await
    }

    /// Classify the running backend against the resolved tag, querying
    /// status when no snapshot is supplied.
    pub async fn started_status(&self, status: Option<&Status>) -> Result<StartedStatus> {
        let tag = self.tag();
        match status {
            Some(status) => Ok(StartedStatus::classify(status, &tag)),
            None => {
                let status = self.status_query.status().await?;
                Ok(StartedStatus::classify(&status, &tag))
            }
        }
    }

    /// Remove every installed version, one at a time
    pub async fn remove_all_images(&self) -> Result<()> {
        let status = self.status_query.status().await?;
        for version in &status.installed_versions {
            info!("Removing Codewind {}", version);
            self.run_command(LifecycleCommand::Remove, Some(version.as_str()))
                .await?;
        }
        Ok(())
    }

    async fn migrate_legacy_workspace(&self, installed_before: &[String]) -> Result<()> {
        let legacy_dir = self.config.workspace.legacy_dir();
        let exists = legacy_workspace_exists(&legacy_dir).await;

        if !is_migration_required(exists, installed_before) {
            debug!("No workspace migration needed");
            return Ok(());
        }

        info!("Migrating legacy workspace at {}", legacy_dir.display());
        self.run_command_with_args(
            LifecycleCommand::Upgrade,
            None,
            vec!["--ws".to_string(), legacy_dir.to_string_lossy().into_owned()],
        )
        .await?;

        self.notifier
            .show(Prompt::info(format!(
                "Your workspace at {} was migrated to the new Codewind workspace layout.",
                legacy_dir.display()
            )))
            .await;
        Ok(())
    }
}
