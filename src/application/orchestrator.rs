//! Trading Orchestrator
//!
//! Drains an event feed into the trading engine, one event at a time,
//! until the feed closes or shutdown is requested.

use std::future::Future;

use thiserror::Error;

use crate::ports::{EventFeed, FeedError, OrderGateway};
use crate::strategy::{ParamsError, RegimeState, StrategyConfig};

use super::engine::{SessionSummary, TradingEngine};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ParamsError),
    #[error("Event feed error: {0}")]
    FeedError(#[from] FeedError),
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FeedClosed,
    Shutdown,
}

/// Status snapshot of the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorStatus {
    pub is_running: bool,
    pub feed: String,
    pub position: i64,
    pub regime: RegimeState,
    pub events_processed: u64,
    pub current_zscore: Option<f64>,
}

/// Single consumer of gateway events
pub struct TradingOrchestrator<F: EventFeed, G: OrderGateway> {
    feed: F,
    engine: TradingEngine<G>,
    is_running: bool,
    stop_reason: Option<StopReason>,
}

impl<F: EventFeed, G: OrderGateway> TradingOrchestrator<F, G> {
    pub fn new(config: StrategyConfig, feed: F, gateway: G) -> Result<Self, OrchestratorError> {
        let engine = TradingEngine::new(config, gateway)?;
        Ok(Self {
            feed,
            engine,
            is_running: false,
            stop_reason: None,
        })
    }

    /// Run until the feed is exhausted
    pub async fn run(&mut self) -> Result<SessionSummary, OrchestratorError> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until the feed is exhausted or `shutdown` resolves.
    ///
    /// An event already taken off the channel is always processed to
    /// completion before shutdown is observed.
    pub async fn run_until<S>(&mut self, shutdown: S) -> Result<SessionSummary, OrchestratorError>
    where
        S: Future<Output = ()>,
    {
        let mut events = self.feed.subscribe().await?;
        self.is_running = true;
        tracing::info!(feed = self.feed.name(), "Starting trading orchestrator");

        tokio::pin!(shutdown);
        let reason = loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break StopReason::Shutdown,
                event = events.recv() => match event {
                    Some(event) => self.engine.handle(event),
                    None => break StopReason::FeedClosed,
                },
            }
        };

        self.is_running = false;
        self.stop_reason = Some(reason);
        let summary = self.engine.summary();
        tracing::info!(
            ?reason,
            events = summary.stats.events,
            position = summary.position,
            "Trading orchestrator stopped"
        );
        Ok(summary)
    }

    pub fn status(&self) -> OrchestratorStatus {
        let summary = self.engine.summary();
        OrchestratorStatus {
            is_running: self.is_running,
            feed: self.feed.name().to_string(),
            position: summary.position,
            regime: summary.regime,
            events_processed: summary.stats.events,
            current_zscore: summary.last_z_score,
        }
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn engine(&self) -> &TradingEngine<G> {
        &self.engine
    }
}
