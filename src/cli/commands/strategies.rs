//! List strategies command.

use anyhow::Result;
use trading_config::AppConfig;
use trading_strategies::StrategyRegistry;

pub fn run(config: &AppConfig) -> Result<()> {
    let registry = StrategyRegistry::new();

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} [{}]", info.name, info.kind);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  Defaults: {}", info.default_config);
        println!();
    }

    println!("Use --strategy <tag> to select a strategy.");
    println!();
    println!("Strategy tags: {}", registry.names().join(", "));
    println!("Configured: {}", config.strategy.kind);
    if config.strategy.model_path.is_none() {
        println!("No model file configured; the model strategy falls back to RSI.");
    }

    Ok(())
}
