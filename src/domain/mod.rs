//! Domain Layer - Core value types for the ratio arbitrage engine
//!
//! Pure types with no I/O: instruments and book snapshots, order records,
//! and signed inventory. All external interactions happen through the
//! ports layer.

pub mod market;
pub mod order;
pub mod position;

pub use market::{
    BookSnapshot, Instrument, Price, PriceObservation, SequenceCheck, SequenceTracker, Volume,
    BOOK_DEPTH,
};
pub use order::{Lifespan, OpenOrder, OrderId, OrderIdGenerator, OrderStatus, Side};
pub use position::{Position, PositionError};
