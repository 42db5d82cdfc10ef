use anyhow::Result;
use clap::{Parser, Subcommand};
use codewind_lifecycle::{
    BackendState, CliProcessRunner, CliStatusQuery, ConsoleNotifier, ConsoleProgress,
    LifecycleCommand, LifecycleConfig, LifecycleCoordinator, LifecycleError, SharedStateHolder,
    StartedStatus,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "codewind-lifecycle")]
#[command(about = "Install, start, stop and remove the local Codewind backend")]
#[command(version)]
#[command(long_about = "Drives the cwctl lifecycle tool to bring the local Codewind backend \
up at the required version. Only one lifecycle command runs at a time; press Ctrl+C to \
cancel a running command.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "codewind.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Answer every confirmation with its default choice
    #[arg(short, long, help = "Assume yes for all confirmation prompts")]
    yes: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Action>,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Install if needed, then start the required version
    Up,
    /// Install the required version
    Install {
        /// Skip the install confirmation
        #[arg(long)]
        no_prompt: bool,
    },
    /// Start the backend
    Start {
        /// Version tag to start instead of the resolved one
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Stop all running backend containers
    Stop,
    /// Remove every installed version
    RemoveAll,
    /// Show installed and running versions
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting codewind-lifecycle v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match LifecycleConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if args.validate_config {
        println!("✓ Configuration is valid");
        return Ok(());
    }

    if args.yes {
        config.prompt.assume_yes = true;
    }

    let Some(action) = args.command else {
        eprintln!("No command given, see --help");
        std::process::exit(2);
    };

    let runner = Arc::new(CliProcessRunner::new(
        config.cli.path.clone(),
        Arc::new(ConsoleProgress),
    ));
    let status_query = Arc::new(CliStatusQuery::new(config.cli.path.clone()));
    let notifier = Arc::new(ConsoleNotifier::new(config.prompt.assume_yes));
    let state = Arc::new(SharedStateHolder::new(BackendState::Unknown));

    let coordinator = LifecycleCoordinator::new(
        config,
        runner.clone(),
        status_query,
        state,
        notifier,
    );

    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("Received SIGINT signal (Ctrl+C)");
            runner.cancel_current();
        }
    });

    let outcome = run_action(&coordinator, action).await;
    info!("Backend state: {}", coordinator.current_state());

    let exit_code = match outcome {
        Ok(()) => 0,
        Err(e) if e.is_user_cancelled() => {
            println!("{}", e.user_message());
            0
        }
        Err(e) if e.is_cancellation() => {
            eprintln!("{}", e.user_message());
            130
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("✗ {}", e.user_message());
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run_action(
    coordinator: &LifecycleCoordinator,
    action: Action,
) -> Result<(), LifecycleError> {
    match action {
        Action::Up => coordinator.install_and_start().await,
        Action::Install { no_prompt } => coordinator.install(!no_prompt).await,
        Action::Start { tag } => {
            coordinator
                .run_command(LifecycleCommand::Start, tag.as_deref())
                .await
        }
        Action::Stop => coordinator.stop().await,
        Action::RemoveAll => coordinator.remove_all_images().await,
        Action::Status => {
            let status = coordinator.status().await?;
            let started = coordinator.started_status(Some(&status)).await?;
            let description = match started {
                StartedStatus::Stopped => "stopped",
                StartedStatus::StartedWrongVersion => "started (wrong version)",
                StartedStatus::StartedCorrectVersion => "started",
            };

            println!("Required version:   {}", coordinator.tag());
            println!("Installed versions: {}", status.installed_versions.join(", "));
            println!("Started versions:   {}", status.started_versions.join(", "));
            println!("Backend:            {}", description);
            if let Some(url) = status.url {
                println!("URL:                {}", url);
            }
            Ok(())
        }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("codewind_lifecycle={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        Some("pretty") => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        None => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# codewind-lifecycle configuration file");
    println!("# CW_ENV (dev, test) and CW_TAG override [environment] at runtime");
    println!();
    println!("{}", toml::to_string_pretty(&LifecycleConfig::default())?);
    Ok(())
}
