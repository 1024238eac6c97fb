//! Per-trough gate flags, one per (side, tier).

use serde::Serialize;

use crate::domain::Side;
use crate::strategy::classifier::Tier;

/// Which tiers have already traded on each side in the current trough
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GateTable {
    /// Indexed `[side][tier]`
    fired: [[bool; 3]; 2],
}

impl GateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fired(&self, side: Side, tier: Tier) -> bool {
        self.fired[side.index()][tier.index()]
    }

    /// Set the flag if clear. Returns true when this call claimed it.
    pub fn claim(&mut self, side: Side, tier: Tier) -> bool {
        let flag = &mut self.fired[side.index()][tier.index()];
        if *flag {
            return false;
        }
        *flag = true;
        true
    }

    /// Clear the flags of one side. The weak tier is skipped unless
    /// `include_weak` is set.
    pub fn reset_side(&mut self, side: Side, include_weak: bool) {
        for tier in Tier::DESCENDING {
            if tier == Tier::Weak && !include_weak {
                continue;
            }
            self.fired[side.index()][tier.index()] = false;
        }
    }

    /// Tiers currently fired on a side, strongest first
    pub fn fired_tiers(&self, side: Side) -> Vec<Tier> {
        Tier::DESCENDING
            .into_iter()
            .filter(|&tier| self.has_fired(side, tier))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_once() {
        let mut gates = GateTable::new();
        assert!(gates.claim(Side::Buy, Tier::Medium));
        assert!(!gates.claim(Side::Buy, Tier::Medium));
        assert!(gates.has_fired(Side::Buy, Tier::Medium));
        assert!(!gates.has_fired(Side::Sell, Tier::Medium));
    }

    #[test]
    fn test_reset_side_all_tiers() {
        let mut gates = GateTable::new();
        for tier in Tier::DESCENDING {
            gates.claim(Side::Sell, tier);
            gates.claim(Side::Buy, tier);
        }
        gates.reset_side(Side::Sell, true);
        assert!(gates.fired_tiers(Side::Sell).is_empty());
        assert_eq!(gates.fired_tiers(Side::Buy).len(), 3);
    }

    #[test]
    fn test_reset_side_keeps_weak_when_excluded() {
        let mut gates = GateTable::new();
        for tier in Tier::DESCENDING {
            gates.claim(Side::Buy, tier);
        }
        gates.reset_side(Side::Buy, false);
        assert_eq!(gates.fired_tiers(Side::Buy), vec![Tier::Weak]);
    }
}
