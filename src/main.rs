//! Paper trading bot CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use trading_config::load_config;
use trading_monitor::{setup_logging, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Command-line flags win over the file
    if let Some(level) = cli.log_level {
        config.logging.level = level.as_str().to_string();
    }
    if cli.json_logs {
        config.logging.format = LogFormat::Json;
    }
    let _log_guard = setup_logging(&config.logging).context("Failed to initialise logging")?;

    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, config).await,
        Commands::Strategies => cli::commands::strategies::run(&config),
        Commands::ValidateConfig(args) => cli::commands::validate::run(args, &cli.config, &config),
    }
}
