//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - stdio: JSON-lines event feed and order gateway over files or stdio
//! - CLI: Command-line interface handlers

pub mod cli;
pub mod stdio;

pub use cli::CliApp;
pub use stdio::{JsonLinesFeed, JsonLinesGateway};
