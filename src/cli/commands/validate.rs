//! Validate configuration command.

use anyhow::{Context, Result};
use std::path::Path;
use trading_config::AppConfig;

use crate::cli::ValidateArgs;

pub fn run(args: ValidateArgs, config_path: &Path, config: &AppConfig) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);
    if !config_path.exists() {
        println!("File not found, using defaults and environment");
    }

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Strategy: {}", config.strategy.kind);
    println!("Bar interval: {} ms", config.market.interval_ms);
    println!("Volatility: {}", config.market.volatility);
    println!("Initial balance: {}", config.trading.initial_balance);
    println!("Trade size: {}", config.trading.trade_size);

    if args.print {
        println!();
        println!("{}", config.to_toml().context("Failed to render configuration")?);
    }

    Ok(())
}
