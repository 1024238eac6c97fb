//! ratio-arb - Future/ETF Ratio Statistical Arbitrage Library
//!
//! Streams paired future and ETF quotes, tracks the running z-score of their
//! price ratio, trades its extremes once per tier per trough, and hedges
//! every fill on the paired instrument.
//!
//! # Modules
//!
//! - `domain`: Core value types (BookSnapshot, OpenOrder, Position)
//! - `ports`: Trait abstractions (OrderGateway, EventFeed) and gateway events
//! - `strategy`: Signal generation (RatioTracker, classify, RegimeTracker)
//! - `adapters`: External implementations (JSON-lines stdio, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Order manager, trading engine and orchestrator

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod strategy;
