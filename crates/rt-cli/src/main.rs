use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rt_cli::commands::{check, levels, report};
use rt_cli::{Cli, Commands, Config};

/// Load config and build a client, applying the `--api-key` override.
fn open_client(cli: &Cli) -> Result<rt_core::ReportClient> {
    let mut config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(api_key) = &cli.api_key {
        config.api_key = Some(api_key.clone());
    }
    tracing::debug!(?config, "loaded configuration");

    config.client().context("failed to create client")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Report(args)) => {
            let client = open_client(&cli)?;
            report::run(&mut out, &client, args)?;
        }
        Some(Commands::Check) => {
            let client = open_client(&cli)?;
            check::run(&mut out, &client)?;
        }
        Some(Commands::Levels) => {
            // Levels are fixed; no config or key needed
            levels::run(&mut out)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    out.flush()?;
    Ok(())
}
