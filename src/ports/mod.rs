//! Ports Layer - Trait definitions for the exchange gateway
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Inbound gateway callbacks (quotes, ticks, fills, statuses, errors)
//! - Outbound order commands (fill-and-kill inserts, hedge orders)

pub mod execution;
pub mod market_data;
pub mod mocks;
pub mod models;

pub use execution::{GatewayError, OrderCommand, OrderGateway};
pub use market_data::{EventFeed, FeedError};
pub use mocks::{RecordingGateway, ScriptedFeed};
pub use models::GatewayEvent;
