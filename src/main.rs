//! goalpost - Script or Module?
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use goalpost::cli::{Cli, Commands};
use goalpost::config::{Config, ConfigManager};
use goalpost::error::GoalResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> GoalResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);

    let cache_dir = cli.cache_dir.as_deref();

    // Dispatch to command
    match cli.command {
        Commands::Resolve(args) => goalpost::cli::commands::resolve(args, &config, cache_dir).await,
        Commands::Cache(args) => goalpost::cli::commands::cache(args, &config, cache_dir).await,
        Commands::Config(args) => {
            goalpost::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("goalpost=warn"),
        1 => EnvFilter::new("goalpost=info"),
        _ => EnvFilter::new("goalpost=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
