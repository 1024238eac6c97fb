//! Market Data Types
//!
//! Instruments, order book snapshots and per-instrument sequence tracking.
//! Prices are integer exchange units (cents); midpoints are scaled floats.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exchange price in integer units (cents)
pub type Price = u64;

/// Order or book volume in lots
pub type Volume = u64;

/// Number of levels reported per side of the book
pub const BOOK_DEPTH: usize = 5;

/// The two legs of the traded pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Future,
    Etf,
}

impl Instrument {
    /// Stable slot for per-instrument arrays
    pub fn index(self) -> usize {
        match self {
            Instrument::Future => 0,
            Instrument::Etf => 1,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instrument::Future => write!(f, "FUTURE"),
            Instrument::Etf => write!(f, "ETF"),
        }
    }
}

/// Top five levels of one instrument's book.
///
/// A price of zero means no liquidity at that level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub ask_prices: [Price; BOOK_DEPTH],
    pub ask_volumes: [Volume; BOOK_DEPTH],
    pub bid_prices: [Price; BOOK_DEPTH],
    pub bid_volumes: [Volume; BOOK_DEPTH],
}

impl BookSnapshot {
    /// Build a book with a single level on each side
    pub fn with_top(best_bid: Price, best_ask: Price, volume: Volume) -> Self {
        let mut book = Self::empty();
        book.bid_prices[0] = best_bid;
        book.ask_prices[0] = best_ask;
        if best_bid != 0 {
            book.bid_volumes[0] = volume;
        }
        if best_ask != 0 {
            book.ask_volumes[0] = volume;
        }
        book
    }

    /// Book with no liquidity on either side
    pub fn empty() -> Self {
        Self {
            ask_prices: [0; BOOK_DEPTH],
            ask_volumes: [0; BOOK_DEPTH],
            bid_prices: [0; BOOK_DEPTH],
            bid_volumes: [0; BOOK_DEPTH],
        }
    }

    pub fn best_bid(&self) -> Price {
        self.bid_prices[0]
    }

    pub fn best_ask(&self) -> Price {
        self.ask_prices[0]
    }

    /// Midpoint of the best bid and ask, divided by `price_scale`.
    ///
    /// The sum is taken in integers and divided once, so `price_scale = 100`
    /// yields exactly `(bid + ask) / 200.0`.
    pub fn midpoint(&self, price_scale: f64) -> f64 {
        self.best_bid().saturating_add(self.best_ask()) as f64 / (2.0 * price_scale)
    }

    /// Total volume resting on both sides
    pub fn total_volume(&self) -> Volume {
        self.ask_volumes.iter().chain(self.bid_volumes.iter()).sum()
    }
}

/// Midpoint of one book update, the only per-update value the ratio needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub instrument: Instrument,
    pub midpoint: f64,
    pub sequence: u64,
}

impl PriceObservation {
    pub fn from_book(
        instrument: Instrument,
        sequence: u64,
        book: &BookSnapshot,
        price_scale: f64,
    ) -> Self {
        Self {
            instrument,
            midpoint: book.midpoint(price_scale),
            sequence,
        }
    }
}

/// Outcome of checking an inbound sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// First message seen for the instrument
    First,
    /// Exactly one past the previous message
    InOrder,
    /// Messages were skipped; the update is still usable
    Gap { missed: u64 },
    /// Duplicate or older than the last accepted message
    Stale { last: u64 },
}

/// Per-instrument sequence number bookkeeping.
///
/// Used for gap and duplicate detection only; messages are never reordered.
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    last: [Option<u64>; 2],
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `sequence` and record it unless stale
    pub fn check(&mut self, instrument: Instrument, sequence: u64) -> SequenceCheck {
        let slot = &mut self.last[instrument.index()];
        let result = match *slot {
            None => SequenceCheck::First,
            Some(last) if sequence <= last => return SequenceCheck::Stale { last },
            Some(last) if sequence == last + 1 => SequenceCheck::InOrder,
            Some(last) => SequenceCheck::Gap {
                missed: sequence - last - 1,
            },
        };
        *slot = Some(sequence);
        result
    }

    /// Last accepted sequence number for an instrument
    pub fn last(&self, instrument: Instrument) -> Option<u64> {
        self.last[instrument.index()]
    }
}
