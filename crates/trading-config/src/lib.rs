//! Configuration management.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `TRADING__`-prefixed environment variables (`TRADING__MARKET__SEED=7`).

mod settings;

pub use settings::{AppConfig, AppSettings, MarketSettings, TradingSettings};

use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::Path;

/// Load configuration from file and environment.
///
/// A missing file is not an error; every section has defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    build(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix("TRADING")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn build(path: &Path, env: Environment) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(env)
        .build()?;

    config.try_deserialize()
}
