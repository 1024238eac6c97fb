//! Strategy Layer - Ratio statistics, tier classification and trough gating
//!
//! Turns a stream of future/ETF midpoints into order authorizations:
//! - Running mean and standard deviation of the future/ETF price ratio
//! - Z-score bucketed into weak / medium / strong tiers
//! - Buying/selling trough hysteresis with one order per tier per trough
//!
//! Every stage returns `Option` while it has nothing to say yet.

pub mod classifier;
pub mod params;
pub mod ratio_stats;
pub mod regime;

pub use classifier::{classify, Classification, Direction, Tier};
pub use params::{MarketConfig, ParamsError, StrategyConfig};
pub use ratio_stats::{RatioSample, RatioTracker, RunningStatistics};
pub use regime::{Authorization, GateTable, RegimeState, RegimeTracker, RegimeTransition};
