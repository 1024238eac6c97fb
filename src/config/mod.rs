//! Configuration Module
//!
//! Loads and validates configuration from TOML files plus environment
//! overrides.

pub mod loader;

pub use loader::{
    load_config, parse_config, Config, ConfigError, MarketSection, StrategySection, ENV_PREFIX,
};
