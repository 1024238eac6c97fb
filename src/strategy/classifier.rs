//! Signal Classifier
//!
//! Buckets a z-score into a direction and a discrete strength tier.
//! Thresholds are tested strongest first; anything under the weak
//! threshold is noise and yields no classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Volume;
use crate::strategy::params::StrategyConfig;

/// Discrete signal strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Weak,
    Medium,
    Strong,
}

impl Tier {
    /// Strongest first, the order thresholds are tested in
    pub const DESCENDING: [Tier; 3] = [Tier::Strong, Tier::Medium, Tier::Weak];

    pub(crate) fn index(self) -> usize {
        match self {
            Tier::Weak => 0,
            Tier::Medium => 1,
            Tier::Strong => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Weak => write!(f, "weak"),
            Tier::Medium => write!(f, "medium"),
            Tier::Strong => write!(f, "strong"),
        }
    }
}

/// Side of the mean the ratio has expanded to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Above,
    Below,
}

/// Result of classifying one z-score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub z_score: f64,
    pub direction: Direction,
    pub tier: Tier,
    /// Lots for this tier
    pub volume: Volume,
}

/// Classify `z_score` against the configured tier thresholds
pub fn classify(z_score: f64, config: &StrategyConfig) -> Option<Classification> {
    if !z_score.is_finite() {
        return None;
    }
    let magnitude = z_score.abs();
    let tier = Tier::DESCENDING
        .into_iter()
        .find(|&tier| magnitude >= config.threshold(tier))?;

    let direction = if z_score > 0.0 {
        Direction::Above
    } else {
        Direction::Below
    };

    Some(Classification {
        z_score,
        direction,
        tier,
        volume: config.tier_volume(tier),
    })
}
