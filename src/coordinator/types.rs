/// Answer to the install confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallConfirmation {
    Accepted,
    MoreInfoThenLoop,
    Rejected,
}

/// Answer to the prompt shown after a failed or declined install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPromptOutcome {
    Retry,
    MoreInfoThenLoop,
    Rejected,
}

// Button labels
pub(super) const INSTALL_BUTTON: &str = "Install";
pub(super) const MORE_INFO_BUTTON: &str = "More Info";
pub(super) const RETRY_BUTTON: &str = "Retry";
pub(super) const OK_BUTTON: &str = "OK";
pub(super) const STOP_AND_UPGRADE_BUTTON: &str = "Stop and Upgrade";
pub(super) const UPGRADE_BUTTON: &str = "Upgrade";
