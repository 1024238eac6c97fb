pub mod engine;
pub mod orchestrator;
pub mod order_manager;

pub use engine::{EngineError, QuoteOutcome, SessionStats, SessionSummary, TradingEngine};
pub use orchestrator::{OrchestratorError, OrchestratorStatus, StopReason, TradingOrchestrator};
pub use order_manager::{OrderManager, QuotePrices, SubmitOutcome};
