//! Countdown CLI - a background-aware countdown timer
//!
//! Counts down in one-second ticks. Time spent in the background
//! (`b` key or `SIGUSR1`) is subtracted when returning to the
//! foreground (`f` key or `SIGUSR2`).

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tokio::task::LocalSet;

use countdown::cli::{run_countdown, simulate, Cli, Commands, Display};
use countdown::config::{load_config, ConfigError};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // The engine and its host are single-threaded; run everything on a LocalSet
    let local = LocalSet::new();
    if let Err(e) = local.run_until(execute(cli)).await {
        Display::show_error(&format!("{:#}", e));
        if let Some(config_error) = e.downcast_ref::<ConfigError>() {
            eprintln!("  {}", config_error.suggestion());
        }
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => {
            let config = args.apply(load_config(cli.config.as_deref())?);
            config.validate()?;
            run_countdown(config, args.json).await?;
        }
        Some(Commands::Simulate(args)) => {
            let snapshot = simulate(&args)?;
            Display::show_snapshot(&snapshot, args.json);
        }
        Some(Commands::Config) => {
            let config = load_config(cli.config.as_deref())?;
            Display::show_config(&config)?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
