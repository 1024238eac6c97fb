//! CLI Adapter
//!
//! `ratio-arb run` and `ratio-arb check-config`, parsed with clap derive.

mod commands;

pub use commands::{execute, CheckConfigCmd, CliApp, Command, RunCmd};

/// Parse process arguments, exiting with usage on error
pub fn parse_args() -> CliApp {
    <CliApp as clap::Parser>::parse()
}
