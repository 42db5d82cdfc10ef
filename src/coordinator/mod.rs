mod install;
mod orchestrator;
mod run;
mod startup;
mod types;


pub use orchestrator::LifecycleCoordinator;
pub use types::{InstallConfirmation, RetryPromptOutcome};
