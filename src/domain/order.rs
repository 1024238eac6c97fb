//! Orders
//!
//! Order identifiers, sides, lifespans and the live-order record kept for
//! every primary order until the exchange reports it closed.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::market::{Price, Volume};

/// Client order identifier. Zero is reserved for "no order".
pub type OrderId = u64;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// +1 for buys, -1 for sells
    pub fn sign(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// How long an order may rest on the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifespan {
    /// Execute what crosses immediately, cancel the remainder
    FillAndKill,
}

/// Lifecycle state of a primary order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl OrderStatus {
    /// True once the exchange holds no remaining volume
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A submitted primary order awaiting its final status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub volume: Volume,
    pub filled_volume: Volume,
    pub status: OrderStatus,
}

impl OpenOrder {
    pub fn new(id: OrderId, side: Side, price: Price, volume: Volume) -> Self {
        Self {
            id,
            side,
            price,
            volume,
            filled_volume: 0,
            status: OrderStatus::Pending,
        }
    }

    /// Add a fill notification to the running filled volume
    pub fn record_fill(&mut self, volume: Volume) {
        self.filled_volume = self.filled_volume.saturating_add(volume);
        self.status = if self.filled_volume >= self.volume {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    /// Apply an exchange status report carrying the cumulative fill volume
    pub fn apply_status(&mut self, fill_volume: Volume, remaining_volume: Volume) -> OrderStatus {
        self.filled_volume = self.filled_volume.max(fill_volume);
        self.status = match (remaining_volume, self.filled_volume) {
            (0, filled) if filled >= self.volume => OrderStatus::Filled,
            (0, _) => OrderStatus::Cancelled,
            (_, 0) => OrderStatus::Pending,
            _ => OrderStatus::PartiallyFilled,
        };
        self.status
    }

    pub fn remaining(&self) -> Volume {
        self.volume.saturating_sub(self.filled_volume)
    }
}

/// Monotonic client order id source shared by primary and hedge orders
#[derive(Debug, Clone)]
pub struct OrderIdGenerator {
    next: OrderId,
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl OrderIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the next id; ids are never reused
    pub fn next_id(&mut self) -> OrderId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next call will return
    pub fn peek(&self) -> OrderId {
        self.next
    }
}
