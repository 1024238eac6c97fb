//! Inbound gateway callbacks as data.
//!
//! Each variant maps one-to-one onto a `TradingEngine::on_*` handler.

use serde::{Deserialize, Serialize};

use crate::domain::{BookSnapshot, Instrument, OrderId, Price, Volume};

/// One callback delivered by the exchange gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// Top of book changed
    QuoteUpdate {
        instrument: Instrument,
        sequence: u64,
        #[serde(flatten)]
        book: BookSnapshot,
    },
    /// Recent trading activity; informational only
    TradeTick {
        instrument: Instrument,
        sequence: u64,
        #[serde(flatten)]
        book: BookSnapshot,
    },
    /// A primary order (partially) filled
    OrderFilled {
        order_id: OrderId,
        price: Price,
        volume: Volume,
    },
    /// A hedge order (partially) filled
    HedgeFilled {
        order_id: OrderId,
        price: Price,
        volume: Volume,
    },
    /// Cumulative fill and remaining volume of a primary order.
    /// Zero remaining means the order is gone.
    OrderStatus {
        order_id: OrderId,
        fill_volume: Volume,
        remaining_volume: Volume,
        fees: i64,
    },
    /// Exchange-side error; `order_id` is zero when not order-specific
    Error { order_id: OrderId, message: String },
}

impl GatewayEvent {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayEvent::QuoteUpdate { .. } => "quote_update",
            GatewayEvent::TradeTick { .. } => "trade_tick",
            GatewayEvent::OrderFilled { .. } => "order_filled",
            GatewayEvent::HedgeFilled { .. } => "hedge_filled",
            GatewayEvent::OrderStatus { .. } => "order_status",
            GatewayEvent::Error { .. } => "error",
        }
    }
}
