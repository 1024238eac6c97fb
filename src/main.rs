//! ratio-arb - Future/ETF ratio statistical arbitrage engine
//!
//! Reads gateway events as JSON lines and writes order commands as JSON lines.

use anyhow::Result;

use ratio_arb::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (RATIO_ARB__* overrides may live there)
    dotenvy::dotenv().ok();

    let app = cli::parse_args();
    cli::execute(app).await
}
