//! Run command: one bot trading the synthetic market.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use trading_broker::PaperAccount;
use trading_config::AppConfig;
use trading_core::traits::DecisionEngine;
use trading_data::{BarGenerator, EventBus};
use trading_engine::{EvaluationPipeline, TradingBot};
use trading_monitor::TracingSink;
use trading_strategies::{LinearPredictor, StrategyKind, StrategyRegistry, StrategySettings};

use crate::cli::RunArgs;

pub async fn run(args: RunArgs, mut config: AppConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    if let Some(seed) = args.seed {
        config.market.seed = Some(seed);
    }
    let requested = args.strategy.unwrap_or_else(|| config.strategy.kind.clone());

    let account = PaperAccount::new(config.trading.initial_balance);
    let registry = build_registry(&config.strategy);
    let (kind, engine) = create_engine(&registry, &requested, &config.strategy, &account)?;
    let bot_name = match kind {
        StrategyKind::Rsi => "RSI-Bot",
        StrategyKind::Model => "AI-Bot",
    };

    let pipeline = EvaluationPipeline::new(
        config.trading.trade_size,
        Arc::new(TracingSink::for_bot(bot_name)),
    );
    let bot = Arc::new(TradingBot::new(bot_name, engine, account, pipeline));

    let bus = Arc::new(EventBus::with_sink(Arc::new(TracingSink::new())));
    bus.subscribe(bot.clone());

    info!(
        bot = bot.name(),
        strategy = %bot.strategy_name(),
        portfolio = %bot.account().snapshot(),
        "Bot registered"
    );

    let mut generator = BarGenerator::new(config.market.generator_config(), bus);
    let status = spawn_status(bot.clone(), args.status_interval_secs);
    generator.start();

    match args.duration_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                    info!(secs, "Run duration elapsed");
                }
                result = tokio::signal::ctrl_c() => {
                    result.context("Failed to listen for Ctrl-C")?;
                }
            }
        }
        None => {
            println!("Press Ctrl-C to stop the bot...");
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
        }
    }

    info!("Stopping market data feed");
    generator.stop().await;
    if let Some(status) = status {
        status.abort();
    }

    let report = bot.report();
    match args.output.as_str() {
        "json" => println!("{}", report.to_json()?),
        _ => println!("{}", report.summary()),
    }

    Ok(())
}

/// Registry with the file-backed predictor attached when one is configured.
fn build_registry(settings: &StrategySettings) -> StrategyRegistry {
    let registry = StrategyRegistry::new();
    let Some(path) = &settings.model_path else {
        return registry;
    };

    match LinearPredictor::from_file(path) {
        Ok(predictor) => {
            info!(path = %path.display(), "Loaded prediction model");
            registry.with_predictor(Arc::new(predictor))
        }
        Err(e) => {
            warn!(error = %e, "Prediction model unavailable");
            registry
        }
    }
}

/// Create the requested engine, falling back to RSI when that fails.
fn create_engine(
    registry: &StrategyRegistry,
    requested: &str,
    settings: &StrategySettings,
    account: &PaperAccount,
) -> Result<(StrategyKind, Box<dyn DecisionEngine>)> {
    let attempt = requested
        .parse::<StrategyKind>()
        .and_then(|kind| Ok((kind, registry.create(kind.tag(), settings, account.clone())?)));

    match attempt {
        Ok(created) => Ok(created),
        Err(e) => {
            warn!(requested, error = %e, "Falling back to RSI strategy");
            let engine = registry
                .create(StrategyKind::Rsi.tag(), settings, account.clone())
                .context("Failed to create fallback RSI strategy")?;
            Ok((StrategyKind::Rsi, engine))
        }
    }
}

/// Periodically log what the bot last saw and did.
fn spawn_status(bot: Arc<TradingBot>, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let close = bot.last_bar().map(|bar| bar.close);
            let (base, asset) = bot.account().balances();
            info!(
                bot = bot.name(),
                last_decision = %bot.last_decision(),
                ?close,
                %base,
                %asset,
                "Status"
            );
        }
    }))
}
