//! Strategy Parameters
//!
//! Configuration structs for the ratio strategy.
//! Defaults reproduce the reference thresholds: tiers at 1.0 / 1.5 / 2.0
//! standard deviations, 10-lot base size, 100-cent ticks.

use serde::{Deserialize, Serialize};

use crate::domain::{Price, Volume};
use crate::strategy::classifier::Tier;

/// Main strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// |z| at or above this is a strong signal
    pub strong_threshold: f64,
    /// |z| at or above this is a medium signal
    pub medium_threshold: f64,
    /// Noise floor: |z| below this takes no action
    pub weak_threshold: f64,
    /// Lots traded at the weak threshold; also the inventory skew unit
    pub lot_size: u64,
    /// Absolute position bound in lots
    pub position_limit: u64,
    /// Clear the weak-tier flag of the vacated side on a trough switch
    pub reset_weak_tier_on_transition: bool,
    /// Suppress primary orders that could breach `position_limit`
    pub enforce_position_limit: bool,
    /// Exchange price grid
    pub market: MarketConfig,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            strong_threshold: 2.0,
            medium_threshold: 1.5,
            weak_threshold: 1.0,
            lot_size: 10,
            position_limit: 100,
            reset_weak_tier_on_transition: true,
            enforce_position_limit: false,
            market: MarketConfig::default(),
        }
    }
}

impl StrategyConfig {
    /// Create a new config with custom tier thresholds
    pub fn with_thresholds(mut self, weak: f64, medium: f64, strong: f64) -> Self {
        self.weak_threshold = weak;
        self.medium_threshold = medium;
        self.strong_threshold = strong;
        self
    }

    /// Create a new config with a custom base lot size
    pub fn with_lot_size(mut self, lot_size: u64) -> Self {
        self.lot_size = lot_size;
        self
    }

    /// Reproduce the reference gate reset, which never clears the weak tier
    pub fn with_legacy_weak_reset(mut self) -> Self {
        self.reset_weak_tier_on_transition = false;
        self
    }

    /// z-score threshold for a tier
    pub fn threshold(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Strong => self.strong_threshold,
            Tier::Medium => self.medium_threshold,
            Tier::Weak => self.weak_threshold,
        }
    }

    /// Lots for a tier: `floor(lot_size / weak * tier_threshold)`
    pub fn tier_volume(&self, tier: Tier) -> Volume {
        let per_sigma = self.lot_size as f64 / self.weak_threshold;
        (per_sigma * self.threshold(tier)).floor() as Volume
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.weak_threshold > 0.0
            && self.weak_threshold < self.medium_threshold
            && self.medium_threshold < self.strong_threshold
            && self.strong_threshold.is_finite())
        {
            return Err(ParamsError::InvalidThresholds {
                weak: self.weak_threshold,
                medium: self.medium_threshold,
                strong: self.strong_threshold,
            });
        }
        if self.lot_size == 0 {
            return Err(ParamsError::InvalidLotSize(self.lot_size));
        }
        if self.position_limit == 0 {
            return Err(ParamsError::InvalidPositionLimit(self.position_limit));
        }
        self.market.validate()?;
        Ok(())
    }
}

/// Exchange price grid and scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Minimum price increment in exchange units
    pub tick_size: Price,
    /// Divisor turning exchange units into midpoint units
    pub price_scale: f64,
    /// Lowest bid price the exchange accepts
    pub minimum_bid: Price,
    /// Highest ask price the exchange accepts
    pub maximum_ask: Price,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            tick_size: 100,
            price_scale: 100.0,
            minimum_bid: 1,
            maximum_ask: 2_147_483_647,
        }
    }
}

impl MarketConfig {
    /// Hedge sell price: minimum bid rounded up onto the tick grid
    pub fn min_bid_nearest_tick(&self) -> Price {
        (self.minimum_bid + self.tick_size) / self.tick_size * self.tick_size
    }

    /// Hedge buy price: maximum ask rounded down onto the tick grid
    pub fn max_ask_nearest_tick(&self) -> Price {
        self.maximum_ask / self.tick_size * self.tick_size
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.tick_size == 0 {
            return Err(ParamsError::InvalidTickSize(self.tick_size));
        }
        if !(self.price_scale > 0.0 && self.price_scale.is_finite()) {
            return Err(ParamsError::InvalidPriceScale(self.price_scale));
        }
        if self.minimum_bid >= self.maximum_ask {
            return Err(ParamsError::InvalidPriceBounds {
                minimum_bid: self.minimum_bid,
                maximum_ask: self.maximum_ask,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("Invalid thresholds: weak {weak}, medium {medium}, strong {strong} (need 0 < weak < medium < strong)")]
    InvalidThresholds { weak: f64, medium: f64, strong: f64 },
    #[error("Invalid lot size: {0} (must be > 0)")]
    InvalidLotSize(u64),
    #[error("Invalid position limit: {0} (must be > 0)")]
    InvalidPositionLimit(u64),
    #[error("Invalid tick size: {0} (must be > 0)")]
    InvalidTickSize(Price),
    #[error("Invalid price scale: {0} (must be finite and > 0)")]
    InvalidPriceScale(f64),
    #[error("Invalid price bounds: minimum bid {minimum_bid} must be below maximum ask {maximum_ask}")]
    InvalidPriceBounds { minimum_bid: Price, maximum_ask: Price },
}
