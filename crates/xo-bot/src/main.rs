//! Trader XO Bot - Entry Point
//!
//! Evaluates one bar of market data per run and prints the trade decisions
//! as JSON. With `--quote`, also prints a signal-biased quote plan.

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::info;
use xo_bot::config::CONFIG_ENV;
use xo_bot::{AppConfig, MarketData, StrategyIntegration};
use xo_core::Price;
use xo_mm::{adjust_for_inventory, QuoteManager};
use xo_telemetry::Metrics;

/// Trader XO signal and market making bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via XO_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// JSON file mapping asset -> {current_price, price_history}
    #[arg(short, long)]
    market_data: String,

    /// Asset to build a hybrid quote plan for
    #[arg(long)]
    quote: Option<String>,

    /// Mid price for the quote plan (defaults to the asset's current price)
    #[arg(long, requires = "quote")]
    mid: Option<Price>,

    /// Current position in base units, for inventory-aware sizing
    #[arg(long, requires = "quote", requires = "max_position")]
    position: Option<Decimal>,

    /// Maximum position in base units
    #[arg(long, requires = "position")]
    max_position: Option<Decimal>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    xo_telemetry::init_logging()?;

    info!("Starting Trader XO Bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > XO_CONFIG env var > default
    let config = match args.config.or_else(|| std::env::var(CONFIG_ENV).ok()) {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            AppConfig::from_file(&path)?
        }
        None => AppConfig::load()?,
    };
    info!(
        strategy = %config.strategy_name,
        interval = %config.interval,
        "Configuration loaded"
    );

    let content = std::fs::read_to_string(&args.market_data)
        .with_context(|| format!("Failed to read market data: {}", args.market_data))?;
    let market_data: HashMap<String, MarketData> =
        serde_json::from_str(&content).context("Failed to parse market data")?;

    let assets = if config.assets.is_empty() {
        let mut keys: Vec<String> = market_data.keys().cloned().collect();
        keys.sort();
        keys
    } else {
        config.assets.clone()
    };

    let integration = StrategyIntegration::new(&config.strategy_name, config.signal.clone())?;

    // No indicator service is wired in; EMAs and Stoch RSI come from price history
    let decisions =
        integration.generate_trade_decisions(&assets, &market_data, None, &config.interval);
    println!("{}", serde_json::to_string_pretty(&decisions)?);

    for asset in &assets {
        info!("{}", integration.format_strategy_context(asset));
    }

    if let Some(asset) = args.quote {
        let decision = decisions
            .iter()
            .find(|d| d.asset == asset)
            .with_context(|| format!("No trade decision for {asset}"))?;

        let mid = match args.mid {
            Some(mid) => mid,
            None => {
                let price = market_data
                    .get(&asset)
                    .and_then(|d| d.current_price)
                    .with_context(|| format!("No current price for {asset}"))?;
                Price::from_f64(price)?
            }
        };
        anyhow::ensure!(mid.is_positive(), "Mid price must be positive, got {mid}");

        let mut manager = QuoteManager::new(config.quotes.clone());
        let mut hybrid = manager.combine_with_signal(&asset, mid, &decision.to_signal_result());

        if let (Some(position), Some(max_position)) = (args.position, args.max_position) {
            adjust_for_inventory(&mut hybrid.plan, position, max_position);
        }

        println!("{}", serde_json::to_string_pretty(&hybrid)?);
        manager.mark_refreshed(&asset);
    }

    if config.telemetry.dump_metrics {
        eprintln!("{}", Metrics::render()?);
    }

    Ok(())
}
