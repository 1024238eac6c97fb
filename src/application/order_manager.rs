//! Order & Inventory Manager
//!
//! Prices and submits primary fill-and-kill orders, tracks them until the
//! exchange reports zero remaining volume, keeps the signed position, and
//! answers every primary fill with one hedge on the paired instrument.
//!
//! Hedges are priced at the extreme of the exchange's price band so they
//! cross immediately; their ids are not tracked.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::domain::{
    BookSnapshot, Lifespan, OpenOrder, OrderId, OrderIdGenerator, Position, PositionError, Price,
    Side, Volume,
};
use crate::ports::{GatewayError, OrderCommand, OrderGateway};
use crate::strategy::StrategyConfig;

/// Inventory-skewed reference prices. Zero means do not quote that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotePrices {
    pub bid: Price,
    pub ask: Price,
}

impl QuotePrices {
    pub fn for_side(&self, side: Side) -> Price {
        match side {
            Side::Buy => self.bid,
            Side::Sell => self.ask,
        }
    }
}

/// Result of asking for a primary order
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(OpenOrder),
    /// Reference price was zero
    NoLiquidity,
    /// A full fill would breach the position limit
    LimitBlocked(PositionError),
}

/// Primary-order tracking plus signed inventory
#[derive(Debug, Clone)]
pub struct OrderManager {
    config: StrategyConfig,
    ids: OrderIdGenerator,
    position: Position,
    bid_id: Option<OrderId>,
    ask_id: Option<OrderId>,
    bids: HashSet<OrderId>,
    asks: HashSet<OrderId>,
    live: HashMap<OrderId, OpenOrder>,
}

impl OrderManager {
    pub fn new(config: StrategyConfig) -> Self {
        let position = Position::new(config.position_limit);
        Self {
            config,
            ids: OrderIdGenerator::new(),
            position,
            bid_id: None,
            ask_id: None,
            bids: HashSet::new(),
            asks: HashSet::new(),
            live: HashMap::new(),
        }
    }

    /// Best bid/ask shifted by `-(position div lot_size) * tick_size`.
    ///
    /// An empty side stays at zero.
    pub fn reference_prices(&self, book: &BookSnapshot) -> Result<QuotePrices, PositionError> {
        let skew = self.position.skew_lots(self.config.lot_size)?;
        let tick = i64::try_from(self.config.market.tick_size).unwrap_or(i64::MAX);
        let adjustment = skew.saturating_mul(tick).saturating_neg();
        let shift = |price: Price| {
            if price == 0 {
                0
            } else {
                price.saturating_add_signed(adjustment)
            }
        };
        Ok(QuotePrices {
            bid: shift(book.best_bid()),
            ask: shift(book.best_ask()),
        })
    }

    /// Submit a fill-and-kill order on `side` at the skewed reference price
    pub fn submit_primary<G: OrderGateway + ?Sized>(
        &mut self,
        side: Side,
        volume: Volume,
        prices: QuotePrices,
        gateway: &mut G,
    ) -> Result<SubmitOutcome, GatewayError> {
        let price = prices.for_side(side);
        if price == 0 {
            tracing::warn!(%side, volume, "No reference price, not quoting");
            return Ok(SubmitOutcome::NoLiquidity);
        }
        if self.config.enforce_position_limit {
            if let Err(e) = self.position.check_limit(side, volume) {
                tracing::warn!("Order suppressed: {}", e);
                return Ok(SubmitOutcome::LimitBlocked(e));
            }
        }

        let id = self.ids.next_id();
        gateway.submit_order(id, side, price, volume, Lifespan::FillAndKill)?;

        match side {
            Side::Buy => {
                self.bid_id = Some(id);
                self.bids.insert(id);
            }
            Side::Sell => {
                self.ask_id = Some(id);
                self.asks.insert(id);
            }
        }
        let order = OpenOrder::new(id, side, price, volume);
        self.live.insert(id, order.clone());

        tracing::info!(order_id = id, %side, price, volume, "Submitted fill-and-kill order");
        Ok(SubmitOutcome::Submitted(order))
    }

    /// Book a primary fill and send the offsetting hedge.
    ///
    /// Fills for ids not tracked as live bids or asks are ignored, as are
    /// fills too large for the signed position. The position is updated
    /// even when the hedge submission fails.
    pub fn on_order_filled<G: OrderGateway + ?Sized>(
        &mut self,
        order_id: OrderId,
        price: Price,
        volume: Volume,
        gateway: &mut G,
    ) -> Result<Option<OrderCommand>, GatewayError> {
        let side = if self.bids.contains(&order_id) {
            Side::Buy
        } else if self.asks.contains(&order_id) {
            Side::Sell
        } else {
            tracing::info!(order_id, volume, "Fill for untracked order ignored");
            return Ok(None);
        };

        if let Err(e) = self.position.apply_fill(side, volume) {
            tracing::error!(order_id, "Fill not booked, no hedge sent: {}", e);
            return Ok(None);
        }
        if let Some(order) = self.live.get_mut(&order_id) {
            order.record_fill(volume);
        }
        tracing::info!(
            order_id,
            %side,
            price,
            volume,
            position = self.position.lots(),
            "Primary order filled"
        );

        let hedge_side = side.opposite();
        let hedge = OrderCommand::HedgeOrder {
            order_id: self.ids.next_id(),
            side: hedge_side,
            price: self.hedge_price(hedge_side),
            volume,
        };
        hedge.send_to(gateway)?;
        tracing::info!(order_id = hedge.order_id(), side = %hedge_side, volume, "Hedge sent");
        Ok(Some(hedge))
    }

    /// Apply a status report. Returns the closed order once nothing remains.
    ///
    /// Repeated zero-remaining reports for the same id are no-ops.
    pub fn on_order_status(
        &mut self,
        order_id: OrderId,
        fill_volume: Volume,
        remaining_volume: Volume,
    ) -> Option<OpenOrder> {
        if remaining_volume > 0 {
            if let Some(order) = self.live.get_mut(&order_id) {
                order.apply_status(fill_volume, remaining_volume);
            }
            return None;
        }

        if self.bid_id == Some(order_id) {
            self.bid_id = None;
        } else if self.ask_id == Some(order_id) {
            self.ask_id = None;
        }
        // may be either a bid or an ask
        self.bids.remove(&order_id);
        self.asks.remove(&order_id);

        let mut order = self.live.remove(&order_id)?;
        order.apply_status(fill_volume, 0);
        tracing::debug!(order_id, status = ?order.status, "Order closed");
        Some(order)
    }

    /// Exchange error for a live order closes it as if cancelled.
    pub fn on_error(&mut self, order_id: OrderId) -> Option<OpenOrder> {
        if order_id != 0 && self.is_live(order_id) {
            return self.on_order_status(order_id, 0, 0);
        }
        None
    }

    fn hedge_price(&self, side: Side) -> Price {
        match side {
            Side::Sell => self.config.market.min_bid_nearest_tick(),
            Side::Buy => self.config.market.max_ask_nearest_tick(),
        }
    }

    pub fn is_live(&self, order_id: OrderId) -> bool {
        self.bids.contains(&order_id) || self.asks.contains(&order_id)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn bid_id(&self) -> Option<OrderId> {
        self.bid_id
    }

    pub fn ask_id(&self) -> Option<OrderId> {
        self.ask_id
    }

    pub fn live_order(&self, order_id: OrderId) -> Option<&OpenOrder> {
        self.live.get(&order_id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Id the next submission will use
    pub fn next_order_id(&self) -> OrderId {
        self.ids.peek()
    }
}
