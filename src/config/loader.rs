//! Configuration Loader
//!
//! Reads a TOML file, overlays `RATIO_ARB__SECTION__KEY` environment
//! variables, and validates the result before anything is built from it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::strategy::params::{MarketConfig, ParamsError, StrategyConfig};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "RATIO_ARB";

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub strategy: StrategySection,
    pub market: MarketSection,
}

/// Signal thresholds, sizing and gating behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySection {
    /// |z| at or above this trades the strong tier
    pub strong_threshold: f64,
    pub medium_threshold: f64,
    /// Anything under this is noise
    pub weak_threshold: f64,
    /// Lots for the weak tier; also the inventory skew granularity
    pub lot_size: u64,
    /// Maximum absolute position in lots
    pub position_limit: u64,
    /// Re-arm the weak tier together with medium and strong on a trough change
    pub reset_weak_tier_on_transition: bool,
    /// Suppress primary orders whose full fill would breach the limit
    pub enforce_position_limit: bool,
}

impl Default for StrategySection {
    fn default() -> Self {
        let defaults = StrategyConfig::default();
        Self {
            strong_threshold: defaults.strong_threshold,
            medium_threshold: defaults.medium_threshold,
            weak_threshold: defaults.weak_threshold,
            lot_size: defaults.lot_size,
            position_limit: defaults.position_limit,
            reset_weak_tier_on_transition: defaults.reset_weak_tier_on_transition,
            enforce_position_limit: defaults.enforce_position_limit,
        }
    }
}

/// Exchange price grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSection {
    /// Price increment in exchange units (cents)
    pub tick_size: u64,
    /// Exchange units per quoted unit; midpoints are divided by this
    pub price_scale: f64,
    /// Lowest bid the exchange accepts
    pub minimum_bid: u64,
    /// Highest ask the exchange accepts
    pub maximum_ask: u64,
}

impl Default for MarketSection {
    fn default() -> Self {
        let defaults = MarketConfig::default();
        Self {
            tick_size: defaults.tick_size,
            price_scale: defaults.price_scale,
            minimum_bid: defaults.minimum_bid,
            maximum_ask: defaults.maximum_ask,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),
    #[error("Validation failed: {0}")]
    ValidationError(#[from] ParamsError),
    #[error("Failed to render configuration: {0}")]
    RenderError(#[from] toml::ser::Error),
}

/// Load configuration from a TOML file with environment overrides
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config = parse_config(&content, true)?;
    tracing::debug!(path = %path.as_ref().display(), "Configuration loaded");
    Ok(config)
}

/// Parse TOML text, optionally overlaying the process environment
pub fn parse_config(content: &str, with_env: bool) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Toml));
    if with_env {
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );
    }
    let config: Config = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        StrategyConfig::from(self).validate()?;
        Ok(())
    }

    /// Resolved configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// Conversion from Config to StrategyConfig
impl From<&Config> for StrategyConfig {
    fn from(config: &Config) -> Self {
        StrategyConfig {
            strong_threshold: config.strategy.strong_threshold,
            medium_threshold: config.strategy.medium_threshold,
            weak_threshold: config.strategy.weak_threshold,
            lot_size: config.strategy.lot_size,
            position_limit: config.strategy.position_limit,
            reset_weak_tier_on_transition: config.strategy.reset_weak_tier_on_transition,
            enforce_position_limit: config.strategy.enforce_position_limit,
            market: MarketConfig {
                tick_size: config.market.tick_size,
                price_scale: config.market.price_scale,
                minimum_bid: config.market.minimum_bid,
                maximum_ask: config.market.maximum_ask,
            },
        }
    }
}
