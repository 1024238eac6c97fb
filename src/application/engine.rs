//! Trading Engine
//!
//! One owned session: ratio statistics, trough regime, gate table and the
//! order manager, driven by gateway callbacks. Every handler runs to
//! completion before the next event is taken; nothing here blocks or
//! awaits.
//!
//! Quote pipeline:
//! 1. Sequence check (stale updates dropped)
//! 2. Midpoint of the updated book, folded into the ratio statistics
//! 3. Regime update on the z-score sign
//! 4. Tier classification and gate claim
//! 5. Skewed reference price from the same book, then submission

use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    BookSnapshot, Instrument, OrderId, PositionError, Price, PriceObservation, SequenceCheck,
    SequenceTracker, Volume,
};
use crate::ports::{GatewayError, GatewayEvent, OrderGateway};
use crate::strategy::{
    classify, ParamsError, RatioSample, RatioTracker, RegimeState, RegimeTracker, StrategyConfig,
    Tier,
};

use super::order_manager::{OrderManager, SubmitOutcome};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Order gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Position error: {0}")]
    Position(#[from] PositionError),
}

/// What a single quote update led to
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    /// Sequence number not newer than the last one seen
    Stale,
    /// No z-score yet: a leg is missing or the spread is zero
    Warmup,
    /// Defined z-score under the weak threshold
    BelowThreshold { z_score: f64 },
    /// Tier already traded in this trough
    Gated { z_score: f64, tier: Tier },
    /// Gate claimed; the order manager decided the rest
    Order(SubmitOutcome),
    /// Pipeline error, logged; no decision this tick
    Failed,
}

/// Event counters for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub events: u64,
    pub quote_updates: u64,
    pub stale_updates: u64,
    pub trade_ticks: u64,
    pub ratio_samples: u64,
    pub primary_orders: u64,
    pub order_fills: u64,
    pub hedge_orders: u64,
    pub hedge_fills: u64,
    pub exchange_errors: u64,
    pub failures: u64,
}

/// End-of-session report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub stats: SessionStats,
    pub position: i64,
    pub regime: RegimeState,
    pub troughs: u64,
    pub live_orders: usize,
    pub ratio_mean: f64,
    pub ratio_std_dev: f64,
    pub last_z_score: Option<f64>,
}

/// Signal engine bound to an outbound order gateway
pub struct TradingEngine<G: OrderGateway> {
    config: StrategyConfig,
    gateway: G,
    quote_sequences: SequenceTracker,
    tick_sequences: SequenceTracker,
    ratios: RatioTracker,
    regime: RegimeTracker,
    orders: OrderManager,
    stats: SessionStats,
    last_sample: Option<RatioSample>,
}

impl<G: OrderGateway> TradingEngine<G> {
    /// Create an engine after validating the configuration
    pub fn new(config: StrategyConfig, gateway: G) -> Result<Self, ParamsError> {
        config.validate()?;
        Ok(Self {
            regime: RegimeTracker::new(config.reset_weak_tier_on_transition),
            orders: OrderManager::new(config.clone()),
            config,
            gateway,
            quote_sequences: SequenceTracker::new(),
            tick_sequences: SequenceTracker::new(),
            ratios: RatioTracker::new(),
            stats: SessionStats::default(),
            last_sample: None,
        })
    }

    /// Dispatch one gateway callback to its handler
    pub fn handle(&mut self, event: GatewayEvent) {
        self.stats.events += 1;
        tracing::trace!(kind = event.kind(), "Gateway event");
        match event {
            GatewayEvent::QuoteUpdate {
                instrument,
                sequence,
                book,
            } => {
                self.on_quote_update(instrument, sequence, &book);
            }
            GatewayEvent::TradeTick {
                instrument,
                sequence,
                book,
            } => self.on_trade_tick(instrument, sequence, &book),
            GatewayEvent::OrderFilled {
                order_id,
                price,
                volume,
            } => self.on_order_filled(order_id, price, volume),
            GatewayEvent::HedgeFilled {
                order_id,
                price,
                volume,
            } => self.on_hedge_filled(order_id, price, volume),
            GatewayEvent::OrderStatus {
                order_id,
                fill_volume,
                remaining_volume,
                fees,
            } => self.on_order_status(order_id, fill_volume, remaining_volume, fees),
            GatewayEvent::Error { order_id, message } => self.on_error(order_id, &message),
        }
    }

    /// Run the signal pipeline for one book update.
    ///
    /// Errors are logged here and never escape; the next event is
    /// processed normally.
    pub fn on_quote_update(
        &mut self,
        instrument: Instrument,
        sequence: u64,
        book: &BookSnapshot,
    ) -> QuoteOutcome {
        self.stats.quote_updates += 1;
        match self.evaluate_quote(instrument, sequence, book) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.stats.failures += 1;
                tracing::error!(%instrument, sequence, "Quote update failed: {}", e);
                QuoteOutcome::Failed
            }
        }
    }

    fn evaluate_quote(
        &mut self,
        instrument: Instrument,
        sequence: u64,
        book: &BookSnapshot,
    ) -> Result<QuoteOutcome, EngineError> {
        match self.quote_sequences.check(instrument, sequence) {
            SequenceCheck::Stale { last } => {
                self.stats.stale_updates += 1;
                tracing::warn!(%instrument, sequence, last, "Dropping stale quote update");
                return Ok(QuoteOutcome::Stale);
            }
            SequenceCheck::Gap { missed } => {
                tracing::warn!(%instrument, sequence, missed, "Quote sequence gap");
            }
            SequenceCheck::First | SequenceCheck::InOrder => {}
        }

        let observation =
            PriceObservation::from_book(instrument, sequence, book, self.config.market.price_scale);
        tracing::debug!(%instrument, sequence, midpoint = observation.midpoint, "Quote update");
        let Some(sample) = self.ratios.observe(observation.instrument, observation.midpoint) else {
            return Ok(QuoteOutcome::Warmup);
        };
        self.stats.ratio_samples += 1;
        self.last_sample = Some(sample);
        tracing::debug!(
            ratio = sample.ratio,
            mean = sample.mean,
            std_dev = sample.std_dev,
            z_score = ?sample.z_score,
            "Ratio sample"
        );

        let Some(z_score) = sample.z_score else {
            return Ok(QuoteOutcome::Warmup);
        };

        if let Some(transition) = self.regime.update(z_score) {
            tracing::info!(from = %transition.from, to = %transition.to, z_score, "Trough changed");
        }

        let Some(classification) = classify(z_score, &self.config) else {
            return Ok(QuoteOutcome::BelowThreshold { z_score });
        };
        let Some(authorization) = self.regime.authorize(&classification) else {
            return Ok(QuoteOutcome::Gated {
                z_score,
                tier: classification.tier,
            });
        };

        tracing::info!(
            side = %authorization.side,
            tier = %authorization.tier,
            volume = authorization.volume,
            z_score,
            "Signal authorized"
        );

        let prices = self.orders.reference_prices(book)?;
        let outcome = self.orders.submit_primary(
            authorization.side,
            authorization.volume,
            prices,
            &mut self.gateway,
        )?;
        if matches!(outcome, SubmitOutcome::Submitted(_)) {
            self.stats.primary_orders += 1;
        }
        Ok(QuoteOutcome::Order(outcome))
    }

    /// Trade ticks are observed for sequencing only
    pub fn on_trade_tick(&mut self, instrument: Instrument, sequence: u64, book: &BookSnapshot) {
        self.stats.trade_ticks += 1;
        match self.tick_sequences.check(instrument, sequence) {
            SequenceCheck::Stale { last } => {
                tracing::warn!(%instrument, sequence, last, "Dropping stale trade tick");
            }
            SequenceCheck::Gap { missed } => {
                tracing::warn!(%instrument, sequence, missed, "Trade tick sequence gap");
            }
            SequenceCheck::First | SequenceCheck::InOrder => {
                tracing::trace!(%instrument, sequence, volume = book.total_volume(), "Trade tick");
            }
        }
    }

    pub fn on_order_filled(&mut self, order_id: OrderId, price: Price, volume: Volume) {
        self.stats.order_fills += 1;
        match self
            .orders
            .on_order_filled(order_id, price, volume, &mut self.gateway)
        {
            Ok(Some(_)) => self.stats.hedge_orders += 1,
            Ok(None) => {}
            Err(e) => {
                self.stats.failures += 1;
                tracing::error!(order_id, volume, "Hedge submission failed: {}", e);
            }
        }
    }

    pub fn on_hedge_filled(&mut self, order_id: OrderId, price: Price, volume: Volume) {
        self.stats.hedge_fills += 1;
        tracing::info!(order_id, price, volume, "Hedge filled");
    }

    pub fn on_order_status(
        &mut self,
        order_id: OrderId,
        fill_volume: Volume,
        remaining_volume: Volume,
        fees: i64,
    ) {
        tracing::info!(order_id, fill_volume, remaining_volume, fees, "Order status");
        self.orders
            .on_order_status(order_id, fill_volume, remaining_volume);
    }

    pub fn on_error(&mut self, order_id: OrderId, message: &str) {
        self.stats.exchange_errors += 1;
        tracing::warn!(order_id, "Exchange error: {}", message);
        if let Some(order) = self.orders.on_error(order_id) {
            tracing::info!(order_id, side = %order.side, "Order closed after error");
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let stats = self.ratios.stats();
        SessionSummary {
            stats: self.stats.clone(),
            position: self.orders.position().lots(),
            regime: self.regime.state(),
            troughs: self.regime.trough(),
            live_orders: self.orders.live_count(),
            ratio_mean: stats.mean(),
            ratio_std_dev: stats.std_dev(),
            last_z_score: self.last_sample.and_then(|s| s.z_score),
        }
    }

    pub fn orders(&self) -> &OrderManager {
        &self.orders
    }

    pub fn regime(&self) -> &RegimeTracker {
        &self.regime
    }

    pub fn ratios(&self) -> &RatioTracker {
        &self.ratios
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Lifespan, Side};
    use crate::ports::execution::MockOrderGateway;
    use crate::ports::RecordingGateway;
    use approx::assert_relative_eq;
    use mockall::predicate::eq;

    fn future_book() -> BookSnapshot {
        BookSnapshot::with_top(999_900, 1_000_100, 100)
    }

    fn etf_book(mid_cents: Price) -> BookSnapshot {
        BookSnapshot::with_top(mid_cents * 100 - 100, mid_cents * 100 + 100, 100)
    }

    fn engine() -> TradingEngine<RecordingGateway> {
        TradingEngine::new(StrategyConfig::default(), RecordingGateway::new()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = StrategyConfig::default().with_lot_size(0);
        assert!(TradingEngine::new(config, RecordingGateway::new()).is_err());
    }

    #[test]
    fn test_single_leg_is_warmup() {
        let mut engine = engine();
        let outcome = engine.on_quote_update(Instrument::Future, 1, &future_book());
        assert_eq!(outcome, QuoteOutcome::Warmup);
        assert_eq!(engine.ratios().stats().count(), 0);
    }

    #[test]
    fn test_first_ratio_has_no_signal() {
        let mut engine = engine();
        engine.on_quote_update(Instrument::Future, 1, &future_book());
        let outcome = engine.on_quote_update(Instrument::Etf, 1, &etf_book(5_000));
        assert_eq!(outcome, QuoteOutcome::Warmup);
        assert_eq!(engine.ratios().stats().count(), 1);
        assert!(engine.gateway().commands().is_empty());
    }

    #[test]
    fn test_positive_zscore_sells_etf_ask() {
        let mut mock = MockOrderGateway::new();
        mock.expect_submit_order()
            .with(
                eq(1),
                eq(Side::Sell),
                eq(450_100),
                eq(10),
                eq(Lifespan::FillAndKill),
            )
            .times(1)
            .returning(|_, _, _, _, _| Ok(()));
        mock.expect_submit_hedge_order().never();

        let mut engine = TradingEngine::new(StrategyConfig::default(), mock).unwrap();
        engine.on_quote_update(Instrument::Future, 1, &future_book());
        engine.on_quote_update(Instrument::Etf, 1, &etf_book(5_000));
        let outcome = engine.on_quote_update(Instrument::Etf, 2, &etf_book(4_500));

        assert!(matches!(
            outcome,
            QuoteOutcome::Order(SubmitOutcome::Submitted(_))
        ));
        assert_eq!(engine.regime().state(), RegimeState::SellingTrough);
        assert_eq!(engine.orders().ask_id(), Some(1));
        assert_relative_eq!(
            engine.summary().last_z_score.unwrap(),
            std::f64::consts::SQRT_2,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_stale_quote_is_dropped() {
        let mut engine = engine();
        engine.on_quote_update(Instrument::Future, 5, &future_book());
        let outcome = engine.on_quote_update(Instrument::Future, 5, &future_book());
        assert_eq!(outcome, QuoteOutcome::Stale);
        assert_eq!(engine.stats().stale_updates, 1);
    }

    #[test]
    fn test_sequences_are_per_instrument() {
        let mut engine = engine();
        engine.on_quote_update(Instrument::Future, 7, &future_book());
        let outcome = engine.on_quote_update(Instrument::Etf, 1, &etf_book(5_000));
        assert_eq!(outcome, QuoteOutcome::Warmup);
        assert_eq!(engine.stats().stale_updates, 0);
    }

    #[test]
    fn test_gap_is_processed() {
        let mut engine = engine();
        engine.on_quote_update(Instrument::Future, 1, &future_book());
        engine.on_quote_update(Instrument::Etf, 1, &etf_book(5_000));
        let outcome = engine.on_quote_update(Instrument::Etf, 9, &etf_book(4_500));
        assert!(matches!(outcome, QuoteOutcome::Order(_)));
    }

    #[test]
    fn test_submission_failure_is_contained() {
        let gateway = RecordingGateway::new();
        gateway.fail_next("disconnected");
        let mut engine = TradingEngine::new(StrategyConfig::default(), gateway).unwrap();
        engine.on_quote_update(Instrument::Future, 1, &future_book());
        engine.on_quote_update(Instrument::Etf, 1, &etf_book(5_000));

        let outcome = engine.on_quote_update(Instrument::Etf, 2, &etf_book(4_500));
        assert_eq!(outcome, QuoteOutcome::Failed);
        assert_eq!(engine.stats().failures, 1);
        assert_eq!(engine.orders().ask_id(), None);
        // gate stays consumed for the trough
        assert!(engine.regime().gates().has_fired(Side::Sell, Tier::Weak));
    }

    #[test]
    fn test_handle_dispatches_fill_and_status() {
        let mut engine = engine();
        engine.handle(GatewayEvent::QuoteUpdate {
            instrument: Instrument::Future,
            sequence: 1,
            book: future_book(),
        });
        engine.handle(GatewayEvent::QuoteUpdate {
            instrument: Instrument::Etf,
            sequence: 1,
            book: etf_book(5_000),
        });
        engine.handle(GatewayEvent::QuoteUpdate {
            instrument: Instrument::Etf,
            sequence: 2,
            book: etf_book(5_500),
        });
        engine.handle(GatewayEvent::OrderFilled {
            order_id: 1,
            price: 549_900,
            volume: 10,
        });
        engine.handle(GatewayEvent::OrderStatus {
            order_id: 1,
            fill_volume: 10,
            remaining_volume: 0,
            fees: 0,
        });
        engine.handle(GatewayEvent::HedgeFilled {
            order_id: 2,
            price: 100,
            volume: 10,
        });

        let summary = engine.summary();
        assert_eq!(summary.stats.events, 6);
        assert_eq!(summary.stats.primary_orders, 1);
        assert_eq!(summary.stats.hedge_orders, 1);
        assert_eq!(summary.stats.hedge_fills, 1);
        assert_eq!(summary.position, 10);
        assert_eq!(summary.live_orders, 0);
        assert_eq!(summary.regime, RegimeState::BuyingTrough);
    }

    #[test]
    fn test_trade_ticks_do_not_touch_statistics() {
        let mut engine = engine();
        engine.handle(GatewayEvent::TradeTick {
            instrument: Instrument::Future,
            sequence: 1,
            book: future_book(),
        });
        engine.handle(GatewayEvent::TradeTick {
            instrument: Instrument::Etf,
            sequence: 1,
            book: etf_book(5_000),
        });
        assert_eq!(engine.stats().trade_ticks, 2);
        assert_eq!(engine.ratios().stats().count(), 0);
    }

    #[test]
    fn test_error_event_counts() {
        let mut engine = engine();
        engine.handle(GatewayEvent::Error {
            order_id: 0,
            message: "session warning".into(),
        });
        assert_eq!(engine.stats().exchange_errors, 1);
    }
}
