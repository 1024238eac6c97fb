//! Outbound order commands accepted by the exchange gateway.
//!
//! Submission is fire-and-forget: a successful call only means the command
//! was handed off. Fills and statuses arrive later as inbound events.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Lifespan, OrderId, Price, Side, Volume};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway disconnected: {0}")]
    Disconnected(String),
    #[error("Failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to write command: {0}")]
    Io(#[from] std::io::Error),
    #[error("Command rejected: {0}")]
    Rejected(String),
}

/// A command as handed to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderCommand {
    InsertOrder {
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    },
    HedgeOrder {
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
    },
}

impl OrderCommand {
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderCommand::InsertOrder { order_id, .. } | OrderCommand::HedgeOrder { order_id, .. } => {
                *order_id
            }
        }
    }

    pub fn side(&self) -> Side {
        match self {
            OrderCommand::InsertOrder { side, .. } | OrderCommand::HedgeOrder { side, .. } => *side,
        }
    }

    pub fn volume(&self) -> Volume {
        match self {
            OrderCommand::InsertOrder { volume, .. } | OrderCommand::HedgeOrder { volume, .. } => {
                *volume
            }
        }
    }

    pub fn is_hedge(&self) -> bool {
        matches!(self, OrderCommand::HedgeOrder { .. })
    }

    /// Forward the command to the matching gateway method
    pub fn send_to<G: OrderGateway + ?Sized>(&self, gateway: &mut G) -> Result<(), GatewayError> {
        match *self {
            OrderCommand::InsertOrder {
                order_id,
                side,
                price,
                volume,
                lifespan,
            } => gateway.submit_order(order_id, side, price, volume, lifespan),
            OrderCommand::HedgeOrder {
                order_id,
                side,
                price,
                volume,
            } => gateway.submit_hedge_order(order_id, side, price, volume),
        }
    }
}

/// Outbound side of the exchange gateway
#[cfg_attr(test, mockall::automock)]
pub trait OrderGateway {
    /// Insert a primary order on the traded instrument
    fn submit_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    ) -> Result<(), GatewayError>;

    /// Send an aggressively priced order on the paired instrument
    fn submit_hedge_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
    ) -> Result<(), GatewayError>;
}
