use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use contra_binance::{BinanceClient, BinanceClientConfig};
use contra_core::{roe, ConfigLoader};
use contra_engine::{PositionManager, PositionRow, ReportFormatter, RunReport};

#[derive(Parser)]
#[command(name = "contra")]
#[command(about = "Short-bias futures position risk manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one open/evaluate pass over the watchlist
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Print ROE for all open positions without placing orders
    Positions {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run_pass(&config).await,
        Commands::Positions { config } => print_positions(&config).await,
    }
}

async fn run_pass(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load_from_path(config_path)?;
    if config.trading.watchlist.is_empty() {
        tracing::warn!("watchlist is empty; only existing positions will be evaluated");
    }
    if config.trading.simulation {
        tracing::info!("simulation mode: orders will not reach the exchange");
    }

    let client = Arc::new(BinanceClient::new(BinanceClientConfig::from_settings(
        &config.binance,
    ))?);
    client.sync_time().await?;

    let manager = PositionManager::with_default_gateway(client, config.trading);
    let report = manager.run_once().await?;

    println!("{}", ReportFormatter::format(&report));
    Ok(())
}

async fn print_positions(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load_from_path(config_path)?;
    let client = BinanceClient::new(BinanceClientConfig::from_settings(&config.binance))?;
    client.sync_time().await?;

    let mut report = RunReport::default();
    for position in client.position_risk().await? {
        if !position.is_open() {
            continue;
        }
        match roe(&position) {
            Ok(value) => report.rows.push(PositionRow {
                symbol: position.symbol.clone(),
                roe: value,
                unrealized_profit: position.unrealized_profit,
            }),
            Err(e) => {
                tracing::error!(symbol = %position.symbol, error = %e, "failed to evaluate position");
            }
        }
    }

    println!("{}", ReportFormatter::format(&report));
    Ok(())
}
