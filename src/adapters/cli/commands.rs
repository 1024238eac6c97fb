//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the ratio arbitrage engine.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::adapters::stdio::{JsonLinesFeed, JsonLinesGateway};
use crate::application::{SessionSummary, TradingOrchestrator};
use crate::config::{load_config, Config};
use crate::strategy::StrategyConfig;

/// ratio-arb - Future/ETF ratio statistical arbitrage engine
#[derive(Parser, Debug)]
#[command(
    name = "ratio-arb",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Future/ETF ratio statistical arbitrage engine",
    long_about = "ratio-arb reads gateway events as JSON lines, tracks the future/ETF \
                  price ratio, trades its z-score extremes once per tier per trough and \
                  hedges every fill on the paired instrument. Order commands are written \
                  as JSON lines."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process a gateway event stream
    Run(RunCmd),

    /// Validate a configuration file and print the resolved settings
    CheckConfig(CheckConfigCmd),
}

/// Process a gateway event stream
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Gateway events, one JSON object per line ("-" for stdin)
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    pub input: String,

    /// Order commands, one JSON object per line ("-" for stdout)
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    pub output: String,
}

/// Validate configuration
#[derive(Parser, Debug)]
pub struct CheckConfigCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/default.toml")]
    pub config: PathBuf,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    // Initialize logging based on flags
    init_logging(app.verbose, app.debug)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd).await,
        Command::CheckConfig(cmd) => check_config_command(cmd).await,
    }
}

/// Initialize logging system on stderr; stdout may carry order commands
fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn load_expanded(path: &Path) -> Result<Config> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    load_config(&expanded)
        .with_context(|| format!("Failed to load configuration from {}", expanded))
}

/// Handle run command
async fn run_command(cmd: RunCmd) -> Result<()> {
    let config = load_expanded(&cmd.config)?;
    let strategy_config = StrategyConfig::from(&config);

    tracing::info!("Starting ratio-arb engine...");
    tracing::info!("Config: {}", cmd.config.display());

    let commands_on_stdout = cmd.output == "-";
    let feed = JsonLinesFeed::from_arg(&cmd.input);
    let summary = if commands_on_stdout {
        drive(strategy_config, feed, JsonLinesGateway::stdout()).await?
    } else {
        let path = shellexpand::tilde(&cmd.output).into_owned();
        let gateway = JsonLinesGateway::create(&path)
            .with_context(|| format!("Failed to create order output {}", path))?;
        drive(strategy_config, feed, gateway).await?
    };

    let report = serde_json::to_string_pretty(&summary)?;
    if commands_on_stdout {
        eprintln!("{}", report);
    } else {
        println!("{}", report);
    }
    Ok(())
}

/// Run the orchestrator until the feed closes or Ctrl+C
async fn drive<W: Write>(
    config: StrategyConfig,
    feed: JsonLinesFeed,
    gateway: JsonLinesGateway<W>,
) -> Result<SessionSummary> {
    let mut orchestrator = TradingOrchestrator::new(config, feed, gateway)
        .context("Failed to create orchestrator")?;

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
        } else {
            std::future::pending::<()>().await;
        }
    };
    Ok(orchestrator.run_until(shutdown).await?)
}

/// Handle check-config command
async fn check_config_command(cmd: CheckConfigCmd) -> Result<()> {
    let config = load_expanded(&cmd.config)?;
    let strategy_config = StrategyConfig::from(&config);

    println!("✓ Configuration valid: {}", cmd.config.display());
    println!();
    print!("{}", config.to_toml()?);
    println!();
    println!("# derived");
    println!(
        "# hedge sell price: {}",
        strategy_config.market.min_bid_nearest_tick()
    );
    println!(
        "# hedge buy price:  {}",
        strategy_config.market.max_ask_nearest_tick()
    );
    Ok(())
}
