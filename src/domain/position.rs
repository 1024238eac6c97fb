use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::market::Volume;
use super::order::Side;

/// Signed inventory in lots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    lots: i64,
    limit: u64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("Fill of {volume} lots on {side} would move position {current} past limit {limit}")]
    LimitExceeded {
        side: Side,
        volume: Volume,
        current: i64,
        limit: u64,
    },
    #[error("Fill of {volume} lots on {side} does not fit position {current}")]
    FillOutOfRange {
        side: Side,
        volume: Volume,
        current: i64,
    },
    #[error("Invalid lot size: {0}")]
    InvalidLotSize(u64),
}

impl Position {
    pub fn new(limit: u64) -> Self {
        Self { lots: 0, limit }
    }

    pub fn lots(&self) -> i64 {
        self.lots
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn is_flat(&self) -> bool {
        self.lots == 0
    }

    /// Apply filled volume: buys add, sells subtract.
    ///
    /// A fill the signed position cannot represent leaves it unchanged.
    pub fn apply_fill(&mut self, side: Side, volume: Volume) -> Result<i64, PositionError> {
        self.lots = self.projected(side, volume)?;
        Ok(self.lots)
    }

    /// Position after a full fill of `volume` on `side`
    pub fn projected(&self, side: Side, volume: Volume) -> Result<i64, PositionError> {
        i64::try_from(volume)
            .ok()
            .and_then(|lots| lots.checked_mul(side.sign()))
            .and_then(|delta| self.lots.checked_add(delta))
            .ok_or(PositionError::FillOutOfRange {
                side,
                volume,
                current: self.lots,
            })
    }

    /// Err if a full fill would leave `|position|` above the limit
    pub fn check_limit(&self, side: Side, volume: Volume) -> Result<(), PositionError> {
        if self.projected(side, volume)?.unsigned_abs() > self.limit {
            return Err(PositionError::LimitExceeded {
                side,
                volume,
                current: self.lots,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Whole lots of inventory, rounded toward negative infinity
    pub fn skew_lots(&self, lot_size: u64) -> Result<i64, PositionError> {
        match i64::try_from(lot_size) {
            Ok(lots) if lots > 0 => Ok(self.lots.div_euclid(lots)),
            _ => Err(PositionError::InvalidLotSize(lot_size)),
        }
    }
}
