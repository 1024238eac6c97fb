//! Trough Regime Detection
//!
//! A two-state hysteresis machine over the z-score sign, plus the gate
//! table that limits trading to one order per (trough, side, tier).
//!
//! - Buying trough: left only on a strictly positive z-score
//! - Selling trough: left only on a strictly negative z-score
//! - Entering a trough re-arms the opposite side's gates

mod gate;

pub use gate::GateTable;

use serde::Serialize;
use std::fmt;

use crate::domain::{Side, Volume};
use crate::strategy::classifier::{Classification, Tier};

/// Which mean-reversion trough the market is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegimeState {
    BuyingTrough,
    SellingTrough,
}

impl RegimeState {
    /// Side that trades while in this trough
    pub fn side(&self) -> Side {
        match self {
            RegimeState::BuyingTrough => Side::Buy,
            RegimeState::SellingTrough => Side::Sell,
        }
    }
}

impl fmt::Display for RegimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegimeState::BuyingTrough => write!(f, "buying trough"),
            RegimeState::SellingTrough => write!(f, "selling trough"),
        }
    }
}

/// A trough switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegimeTransition {
    pub from: RegimeState,
    pub to: RegimeState,
}

/// Permission to submit one order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Authorization {
    pub side: Side,
    pub tier: Tier,
    pub volume: Volume,
    /// Trough counter at the time of authorization
    pub trough: u64,
}

/// Regime state plus gate flags
#[derive(Debug, Clone)]
pub struct RegimeTracker {
    state: RegimeState,
    gates: GateTable,
    reset_weak_tier: bool,
    /// Incremented on every transition
    trough: u64,
}

impl RegimeTracker {
    /// Start in the buying trough with all gates armed
    pub fn new(reset_weak_tier: bool) -> Self {
        Self {
            state: RegimeState::BuyingTrough,
            gates: GateTable::new(),
            reset_weak_tier,
            trough: 0,
        }
    }

    /// Apply the hysteresis rule for a defined z-score
    pub fn update(&mut self, z_score: f64) -> Option<RegimeTransition> {
        let to = match self.state {
            RegimeState::SellingTrough if z_score < 0.0 => RegimeState::BuyingTrough,
            RegimeState::BuyingTrough if z_score > 0.0 => RegimeState::SellingTrough,
            _ => return None,
        };
        let from = self.state;
        self.state = to;
        self.trough += 1;
        // the side that trades in the new trough is already correct;
        // the vacated side becomes eligible again
        self.gates.reset_side(from.side(), self.reset_weak_tier);

        tracing::debug!(%from, %to, trough = self.trough, "Regime transition");
        Some(RegimeTransition { from, to })
    }

    /// Claim the gate for the active side at the classified tier
    pub fn authorize(&mut self, classification: &Classification) -> Option<Authorization> {
        let side = self.state.side();
        if !self.gates.claim(side, classification.tier) {
            tracing::trace!(%side, tier = %classification.tier, "Gate already fired this trough");
            return None;
        }
        Some(Authorization {
            side,
            tier: classification.tier,
            volume: classification.volume,
            trough: self.trough,
        })
    }

    pub fn state(&self) -> RegimeState {
        self.state
    }

    pub fn gates(&self) -> &GateTable {
        &self.gates
    }

    /// Number of transitions so far
    pub fn trough(&self) -> u64 {
        self.trough
    }
}
