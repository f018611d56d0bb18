//! Product Card Example
//!
//! This example loads a marketplace fixture set into an in-memory market,
//! reads one listing back through the marketplace seam, and renders the
//! storefront card to stdout.
//!
//! Use `-f` to load a fixture set by name
//! Use `-p` to choose the product id to display

use std::{io, time::Instant};

use anyhow::{Result, bail};

use clap::Parser;
use souk::{card::ProductCard, fixtures::MarketFixture, products::ProductId, view};

/// Arguments for the product card example
#[derive(Debug, Parser)]
struct ProductCardArgs {
    /// Fixture set to seed the marketplace with
    #[clap(short, long, default_value = "bakery")]
    fixture: String,

    /// Product id to display
    #[clap(short, long, default_value_t = 7)]
    product: u64,
}

/// Product Card Example
#[expect(clippy::print_stdout, reason = "Example code")]
#[tokio::main]
pub async fn main() -> Result<()> {
    let args = ProductCardArgs::parse();

    let market = MarketFixture::from_set(&args.fixture)?.into_market()?;
    let id = ProductId::new(args.product);

    let start = Instant::now();

    let Some(card) = ProductCard::load(&market, id).await? else {
        bail!("no product listed under id {id}");
    };

    let elapsed = start.elapsed().as_secs_f32();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    view::write_card(&mut handle, &card)?;

    println!("\nLoaded in {elapsed}s");

    Ok(())
}
