//! Live Card Example
//!
//! Reads one listing from a deployed marketplace over JSON-RPC and renders
//! its storefront card. The endpoint and contract address come from flags,
//! the environment, or a `.env` file.
//!
//! Use `-p` to choose the product id to display
//! Use `--marketplace-address` (or `SOUK_MARKETPLACE_ADDRESS`) to pick the
//! contract

use std::io;

use anyhow::{Result, bail};

use clap::Parser;
use souk::{
    card::ProductCard, chain::rpc::RpcReader, config::MarketConfig, products::ProductId, view,
};
use tracing_subscriber::EnvFilter;

/// Arguments for the live card example
#[derive(Debug, Parser)]
struct LiveCardArgs {
    /// Product id to display
    #[clap(short, long, default_value_t = 0)]
    product: u64,

    #[command(flatten)]
    config: MarketConfig,
}

/// Live Card Example
#[expect(clippy::print_stdout, reason = "Example code")]
#[tokio::main]
pub async fn main() -> Result<()> {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    let args = LiveCardArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let reader = RpcReader::new(args.config.rpc());
    let id = ProductId::new(args.product);

    let Some(card) = ProductCard::load(&reader, id).await? else {
        bail!("no product listed under id {id}");
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    view::write_card(&mut handle, &card)?;

    println!(
        "\nAsking price: {} cUSD",
        card.product
            .price
            .display_units(args.config.chain.token_decimals)
    );

    Ok(())
}
