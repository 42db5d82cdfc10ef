pub mod command;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod notifier;
pub mod progress;
pub mod runner;
pub mod state;
pub mod status;
pub mod tag;
pub mod workspace;

pub use command::{LifecycleCommand, StateTransitions};
pub use config::{EnvMode, LifecycleConfig};
pub use coordinator::{InstallConfirmation, LifecycleCoordinator, RetryPromptOutcome};
pub use error::{LifecycleError, Result};
pub use notifier::{ConsoleNotifier, MessageLevel, Notifier, Prompt};
pub use progress::{parse_line, update_progress, ConsoleProgress, ProgressLine, ProgressSink};
pub use runner::{CliProcessRunner, ProcessRunner};
pub use state::{BackendState, SharedStateHolder, StateHolder};
pub use status::{CliStatusQuery, StartedStatus, Status, StatusQuery};
pub use tag::resolve_tag;
pub use workspace::is_migration_required;
