//! Engine Scenario Tests
//!
//! End-to-end walks through the quote pipeline, order tracking and hedging:
//! 1. Warm-up and the first tradable signal
//! 2. Fill -> hedge -> inventory skew
//! 3. One order per tier per trough, re-armed on trough changes
//! 4. Status and error bookkeeping
//! 5. Orchestrated runs over a JSON-lines feed
//!
//! Future midpoint is held at 10_000.00 so the ratio moves with the ETF alone.

use approx::assert_relative_eq;
use tokio::io::BufReader;

use ratio_arb::adapters::JsonLinesFeed;
use ratio_arb::application::{
    QuoteOutcome, StopReason, SubmitOutcome, TradingEngine, TradingOrchestrator,
};
use ratio_arb::domain::{BookSnapshot, Instrument, Lifespan, OrderStatus, Side};
use ratio_arb::ports::{GatewayEvent, OrderCommand, RecordingGateway};
use ratio_arb::strategy::{RegimeState, StrategyConfig, Tier};

// ============================================================================
// Test Fixtures
// ============================================================================

fn future_book() -> BookSnapshot {
    BookSnapshot::with_top(999_900, 1_000_100, 200)
}

/// One-tick-wide ETF book around `mid` (in whole price units)
fn etf_book(mid: u64) -> BookSnapshot {
    BookSnapshot::with_top(mid * 100 - 100, mid * 100 + 100, 200)
}

struct Session {
    engine: TradingEngine<RecordingGateway>,
    gateway: RecordingGateway,
    etf_sequence: u64,
}

impl Session {
    fn with_config(config: StrategyConfig) -> Self {
        let gateway = RecordingGateway::new();
        let mut engine = TradingEngine::new(config, gateway.clone()).unwrap();
        engine.on_quote_update(Instrument::Future, 1, &future_book());
        Self {
            engine,
            gateway,
            etf_sequence: 0,
        }
    }

    fn new() -> Self {
        Self::with_config(StrategyConfig::default())
    }

    fn etf(&mut self, mid: u64) -> QuoteOutcome {
        self.etf_book(etf_book(mid))
    }

    fn etf_book(&mut self, book: BookSnapshot) -> QuoteOutcome {
        self.etf_sequence += 1;
        self.engine
            .on_quote_update(Instrument::Etf, self.etf_sequence, &book)
    }
}

fn insert(order_id: u64, side: Side, price: u64, volume: u64) -> OrderCommand {
    OrderCommand::InsertOrder {
        order_id,
        side,
        price,
        volume,
        lifespan: Lifespan::FillAndKill,
    }
}

fn hedge(order_id: u64, side: Side, price: u64, volume: u64) -> OrderCommand {
    OrderCommand::HedgeOrder {
        order_id,
        side,
        price,
        volume,
    }
}

// ============================================================================
// Warm-up and first signal
// ============================================================================

#[test]
fn test_first_ratio_never_trades() {
    let mut session = Session::new();
    assert_eq!(session.etf(5_000), QuoteOutcome::Warmup);

    let summary = session.engine.summary();
    assert_eq!(summary.stats.ratio_samples, 1);
    assert!(summary.last_z_score.is_none());
    assert!(session.gateway.commands().is_empty());
}

#[test]
fn test_future_only_updates_then_etf_drop_sells_once() {
    let mut session = Session::new();
    for sequence in 2..=3 {
        assert_eq!(
            session
                .engine
                .on_quote_update(Instrument::Future, sequence, &future_book()),
            QuoteOutcome::Warmup
        );
    }
    assert_eq!(session.engine.summary().stats.ratio_samples, 0);

    assert_eq!(session.etf(5_000), QuoteOutcome::Warmup);
    assert!(matches!(
        session.etf(4_500),
        QuoteOutcome::Order(SubmitOutcome::Submitted(_))
    ));

    assert_eq!(session.gateway.commands(), vec![insert(1, Side::Sell, 450_100, 10)]);
    let summary = session.engine.summary();
    assert_eq!(summary.stats.quote_updates, 5);
    assert_eq!(summary.stats.ratio_samples, 2);
    assert_eq!(summary.regime, RegimeState::SellingTrough);
}

#[test]
fn test_ratio_above_mean_sells_etf_at_ask() {
    let mut session = Session::new();
    session.etf(5_000);
    let outcome = session.etf(4_500);

    assert!(matches!(
        outcome,
        QuoteOutcome::Order(SubmitOutcome::Submitted(_))
    ));
    assert_eq!(session.engine.regime().state(), RegimeState::SellingTrough);
    assert_eq!(session.gateway.commands(), vec![insert(1, Side::Sell, 450_100, 10)]);
}

#[test]
fn test_ratio_below_mean_buys_etf_at_bid() {
    let mut session = Session::new();
    session.etf(5_000);
    session.etf(5_500);

    assert_eq!(session.engine.regime().state(), RegimeState::BuyingTrough);
    assert_eq!(session.gateway.commands(), vec![insert(1, Side::Buy, 549_900, 10)]);
    assert_relative_eq!(
        session.engine.summary().last_z_score.unwrap(),
        -std::f64::consts::SQRT_2,
        epsilon = 1e-9
    );
}

#[test]
fn test_constant_ratio_stays_silent() {
    let mut session = Session::new();
    for _ in 0..5 {
        assert_eq!(session.etf(5_000), QuoteOutcome::Warmup);
    }
    assert!(session.gateway.commands().is_empty());
}

// ============================================================================
// Fill -> hedge -> skew
// ============================================================================

#[test]
fn test_fill_hedges_and_skews_next_quote() {
    let mut session = Session::new();
    session.etf(5_000);
    session.etf(5_500);

    session.engine.handle(GatewayEvent::OrderFilled {
        order_id: 1,
        price: 549_900,
        volume: 10,
    });
    assert_eq!(session.engine.orders().position().lots(), 10);
    assert_eq!(session.gateway.hedges(), vec![hedge(2, Side::Sell, 100, 10)]);

    session.engine.handle(GatewayEvent::OrderStatus {
        order_id: 1,
        fill_volume: 10,
        remaining_volume: 0,
        fees: 0,
    });
    assert_eq!(session.engine.orders().bid_id(), None);

    // medium tier: 15 lots, bid skewed one tick lower by the long position
    let outcome = session.etf(6_000);
    match outcome {
        QuoteOutcome::Order(SubmitOutcome::Submitted(order)) => {
            assert_eq!(order.id, 3);
            assert_eq!(order.side, Side::Buy);
            assert_eq!(order.price, 599_800);
            assert_eq!(order.volume, 15);
        }
        other => panic!("expected a medium buy, got {other:?}"),
    }
    assert_relative_eq!(
        session.engine.summary().last_z_score.unwrap(),
        -1.5096,
        epsilon = 1e-4
    );
}

#[test]
fn test_partial_fills_hedge_each_slice() {
    let mut session = Session::new();
    session.etf(5_000);
    session.etf(4_500);

    for volume in [3, 7] {
        session.engine.on_order_filled(1, 450_100, volume);
    }
    assert_eq!(
        session.gateway.hedges(),
        vec![
            hedge(2, Side::Buy, 2_147_483_600, 3),
            hedge(3, Side::Buy, 2_147_483_600, 7),
        ]
    );
    assert_eq!(session.engine.orders().position().lots(), -10);
    assert_eq!(
        session.engine.orders().live_order(1).unwrap().status,
        OrderStatus::Filled
    );
}

#[test]
fn test_hedge_fill_is_informational() {
    let mut session = Session::new();
    session.etf(5_000);
    session.etf(5_500);
    session.engine.on_order_filled(1, 549_900, 10);

    session.engine.handle(GatewayEvent::HedgeFilled {
        order_id: 2,
        price: 100,
        volume: 10,
    });
    assert_eq!(session.engine.orders().position().lots(), 10);
    assert_eq!(session.engine.stats().hedge_fills, 1);
}

// ============================================================================
// Gating
// ============================================================================

#[test]
fn test_one_order_per_tier_per_trough() {
    let mut session = Session::new();
    session.etf(5_000);
    session.etf(4_500);
    let second = session.etf(4_400);
    let third = session.etf(4_300);

    assert!(matches!(second, QuoteOutcome::Gated { tier: Tier::Weak, .. }));
    assert!(matches!(third, QuoteOutcome::Gated { tier: Tier::Weak, .. }));
    assert_eq!(session.gateway.orders().len(), 1);
}

#[test]
fn test_reverting_signal_falls_below_threshold() {
    let mut session = Session::new();
    session.etf(5_000);
    session.etf(4_500);
    assert!(matches!(
        session.etf(4_500),
        QuoteOutcome::BelowThreshold { .. }
    ));
    assert_eq!(session.gateway.orders().len(), 1);
}

#[test]
fn test_trough_changes_rearm_the_vacated_side() {
    let mut session = Session::new();
    for mid in [5_000, 5_500, 4_500, 5_500, 4_000, 6_000] {
        session.etf(mid);
    }

    assert_eq!(
        session.gateway.orders(),
        vec![
            insert(1, Side::Buy, 549_900, 10),
            insert(2, Side::Sell, 450_100, 15),
            insert(3, Side::Buy, 549_900, 10),
            insert(4, Side::Sell, 400_100, 15),
            insert(5, Side::Buy, 599_900, 10),
        ]
    );
    assert_eq!(session.engine.regime().trough(), 4);
}

#[test]
fn test_legacy_weak_reset_keeps_weak_tier_spent() {
    let config = StrategyConfig::default().with_legacy_weak_reset();
    let mut session = Session::with_config(config);
    for mid in [5_000, 5_500, 4_500, 5_500, 4_000, 6_000] {
        session.etf(mid);
    }

    let sides: Vec<Side> = session.gateway.orders().iter().map(|c| c.side()).collect();
    assert_eq!(sides, vec![Side::Buy, Side::Sell, Side::Sell]);
}

#[test]
fn test_missing_reference_price_consumes_gate_without_order() {
    let mut session = Session::new();
    session.etf(5_000);

    // ask side empty on the book that triggers a sell
    let outcome = session.etf_book(BookSnapshot::with_top(899_900, 0, 200));
    assert_eq!(outcome, QuoteOutcome::Order(SubmitOutcome::NoLiquidity));
    assert!(session.gateway.commands().is_empty());
    assert_eq!(session.engine.orders().next_order_id(), 1);
    assert!(session
        .engine
        .regime()
        .gates()
        .has_fired(Side::Sell, Tier::Weak));
}

#[test]
fn test_position_limit_guard_suppresses_orders() {
    let config = StrategyConfig {
        enforce_position_limit: true,
        position_limit: 5,
        ..StrategyConfig::default()
    };
    let mut session = Session::with_config(config);
    session.etf(5_000);
    let outcome = session.etf(4_500);

    assert!(matches!(
        outcome,
        QuoteOutcome::Order(SubmitOutcome::LimitBlocked(_))
    ));
    assert!(session.gateway.commands().is_empty());
}

// ============================================================================
// Status and error bookkeeping
// ============================================================================

#[test]
fn test_duplicate_final_status_is_harmless() {
    let mut session = Session::new();
    session.etf(5_000);
    session.etf(4_500);

    for _ in 0..2 {
        session.engine.on_order_status(1, 0, 0, 0);
    }
    assert_eq!(session.engine.orders().ask_id(), None);
    assert_eq!(session.engine.orders().live_count(), 0);
    assert!(session.engine.orders().position().is_flat());
}

#[test]
fn test_error_closes_order_and_later_fill_is_ignored() {
    let mut session = Session::new();
    session.etf(5_000);
    session.etf(4_500);

    session.engine.handle(GatewayEvent::Error {
        order_id: 1,
        message: "price out of band".into(),
    });
    assert_eq!(session.engine.orders().ask_id(), None);
    assert!(!session.engine.orders().is_live(1));

    session.engine.on_order_filled(1, 450_100, 10);
    assert!(session.engine.orders().position().is_flat());
    assert!(session.gateway.hedges().is_empty());
}

#[test]
fn test_untargeted_error_changes_nothing() {
    let mut session = Session::new();
    session.etf(5_000);
    session.etf(4_500);

    session.engine.on_error(0, "throttled");
    assert_eq!(session.engine.orders().ask_id(), Some(1));
    assert_eq!(session.engine.stats().exchange_errors, 1);
}

// ============================================================================
// Orchestrated runs
// ============================================================================

#[tokio::test]
async fn test_orchestrator_over_json_lines() {
    let input = r#"{"type":"quote_update","instrument":"future","sequence":1,"ask_prices":[1000100,0,0,0,0],"ask_volumes":[10,0,0,0,0],"bid_prices":[999900,0,0,0,0],"bid_volumes":[10,0,0,0,0]}
{"type":"quote_update","instrument":"etf","sequence":1,"ask_prices":[500100,0,0,0,0],"ask_volumes":[10,0,0,0,0],"bid_prices":[499900,0,0,0,0],"bid_volumes":[10,0,0,0,0]}
{"type":"trade_tick","instrument":"etf","sequence":1,"ask_prices":[500100,0,0,0,0],"ask_volumes":[3,0,0,0,0],"bid_prices":[0,0,0,0,0],"bid_volumes":[0,0,0,0,0]}
garbage
{"type":"quote_update","instrument":"etf","sequence":2,"ask_prices":[550100,0,0,0,0],"ask_volumes":[10,0,0,0,0],"bid_prices":[549900,0,0,0,0],"bid_volumes":[10,0,0,0,0]}
{"type":"order_filled","order_id":1,"price":549900,"volume":4}
{"type":"order_status","order_id":1,"fill_volume":4,"remaining_volume":0,"fees":1}
"#;
    let feed = JsonLinesFeed::from_reader(BufReader::new(input.as_bytes()));
    let gateway = RecordingGateway::new();
    let mut orchestrator =
        TradingOrchestrator::new(StrategyConfig::default(), feed, gateway.clone()).unwrap();

    let summary = orchestrator.run().await.unwrap();

    assert_eq!(orchestrator.stop_reason(), Some(StopReason::FeedClosed));
    assert_eq!(summary.stats.events, 6);
    assert_eq!(summary.stats.trade_ticks, 1);
    assert_eq!(summary.position, 4);
    assert_eq!(summary.live_orders, 0);
    assert_eq!(
        gateway.commands(),
        vec![
            insert(1, Side::Buy, 549_900, 10),
            hedge(2, Side::Sell, 100, 4),
        ]
    );
}

#[tokio::test]
async fn test_summary_serializes() {
    let feed = JsonLinesFeed::from_reader(BufReader::new(&b""[..]));
    let mut orchestrator =
        TradingOrchestrator::new(StrategyConfig::default(), feed, RecordingGateway::new())
            .unwrap();
    let summary = orchestrator.run().await.unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["position"], 0);
    assert_eq!(json["regime"], "BuyingTrough");
    assert_eq!(json["stats"]["events"], 0);
}
