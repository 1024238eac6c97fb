//! Streaming Ratio Statistics
//!
//! Tracks the latest future and ETF midpoints and folds their ratio into
//! running moments over the whole session, in O(1) memory.
//!
//! Fold order for a new ratio `x`:
//! - `count += 1`, `sum += x`, `mean = sum / count`
//! - `sum_sq_dev += (x - mean)^2` using the updated mean
//! - `std_dev = sqrt(sum_sq_dev / count)` (population)
//!
//! This is not textbook Welford and drifts from a batch standard deviation.
//! Decisions depend on the exact trajectory, so the order is fixed.

use serde::Serialize;

use crate::domain::Instrument;

/// Running moments of every ratio seen so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningStatistics {
    count: u64,
    sum: f64,
    sum_sq_dev: f64,
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one ratio into the moments
    pub fn fold(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        let mean = self.mean();
        let diff = x - mean;
        self.sum_sq_dev += diff * diff;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum_sq_dev / self.count as f64
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Standardized deviation of `x` from the running mean.
    ///
    /// None before the first sample or while the spread is zero.
    pub fn zscore(&self, x: f64) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let std_dev = self.std_dev();
        if std_dev == 0.0 {
            return None;
        }
        let z = (x - self.mean()) / std_dev;
        z.is_finite().then_some(z)
    }
}

/// One folded ratio together with the moments after folding it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatioSample {
    /// future_mid / etf_mid
    pub ratio: f64,
    /// Samples folded so far, including this one
    pub count: u64,
    pub mean: f64,
    pub std_dev: f64,
    /// None while the running spread is zero
    pub z_score: Option<f64>,
}

/// Latest midpoints per instrument plus the running ratio moments
#[derive(Debug, Clone, Default)]
pub struct RatioTracker {
    midpoints: [Option<f64>; 2],
    stats: RunningStatistics,
}

impl RatioTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a midpoint and, once both legs are known, fold the new ratio.
    ///
    /// Returns None while either leg is missing or the ETF midpoint is zero;
    /// the statistics are untouched in that case.
    pub fn observe(&mut self, instrument: Instrument, midpoint: f64) -> Option<RatioSample> {
        self.midpoints[instrument.index()] = Some(midpoint);

        let future_mid = self.midpoint(Instrument::Future)?;
        let etf_mid = self.midpoint(Instrument::Etf)?;
        if etf_mid == 0.0 {
            tracing::debug!("ETF midpoint is zero, ratio undefined");
            return None;
        }

        let ratio = future_mid / etf_mid;
        self.stats.fold(ratio);

        Some(RatioSample {
            ratio,
            count: self.stats.count(),
            mean: self.stats.mean(),
            std_dev: self.stats.std_dev(),
            z_score: self.stats.zscore(ratio),
        })
    }

    /// Latest midpoint recorded for an instrument
    pub fn midpoint(&self, instrument: Instrument) -> Option<f64> {
        self.midpoints[instrument.index()]
    }

    pub fn stats(&self) -> &RunningStatistics {
        &self.stats
    }

    /// Forget midpoints and moments
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
