//! Purchase Example
//!
//! This example seeds an in-memory marketplace from a fixture set, then runs
//! the full purchase workflow (spend approval, buy, confirmation waits) and
//! leaves a reaction on the listing. Every storefront signal is forwarded to
//! the tracing subscriber, so run with `RUST_LOG=info` to watch the flow.
//!
//! Use `-f` to load a fixture set by name
//! Use `-p` to choose the product id to buy
//! Use `-r` to pick the reaction left after the purchase
//! Use `-d` to run with a disconnected wallet and watch the connect prompt

use std::{io, sync::Arc};

use anyhow::{Result, bail};

use clap::Parser;
use souk::{
    card::ProductCard,
    config::ConfirmationConfig,
    fixtures::MarketFixture,
    notify::LogNotifier,
    products::ProductId,
    reactions::Reaction,
    view,
    wallet::StaticWallet,
    workflows::{WorkflowOutcome, Workflows},
};
use tracing_subscriber::EnvFilter;

/// Arguments for the purchase example
#[derive(Debug, Parser)]
struct PurchaseArgs {
    /// Fixture set to seed the marketplace with
    #[clap(short, long, default_value = "bakery")]
    fixture: String,

    /// Product id to buy
    #[clap(short, long, default_value_t = 7)]
    product: u64,

    /// Reaction to leave once the purchase is mined
    #[clap(short, long, default_value = "delicious")]
    reaction: String,

    /// Run with a disconnected wallet
    #[clap(short, long)]
    disconnected: bool,

    #[command(flatten)]
    confirmations: ConfirmationConfig,
}

/// Purchase Example
#[expect(clippy::print_stdout, reason = "Example code")]
#[tokio::main]
pub async fn main() -> Result<()> {
    let args = PurchaseArgs::parse();
    let reaction = Reaction::from_label(&args.reaction)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let market = Arc::new(MarketFixture::from_set(&args.fixture)?.into_market()?);

    let wallet = if args.disconnected {
        Arc::new(StaticWallet::disconnected())
    } else {
        Arc::new(StaticWallet::connected(market.buyer()))
    };

    let workflows = Workflows::new(
        market.clone(),
        market.clone(),
        wallet,
        Arc::new(LogNotifier),
    )
    .with_confirmations(args.confirmations.policy());

    let id = ProductId::new(args.product);

    let Some(card) = ProductCard::load(market.as_ref(), id).await? else {
        bail!("no product listed under id {id}");
    };

    match workflows.purchase(&card.product).await? {
        WorkflowOutcome::Completed(tx) => println!("Purchase mined: {tx}"),
        WorkflowOutcome::ConnectRequested => {
            println!("Wallet disconnected; a connect prompt was raised instead");
            return Ok(());
        }
    }

    match workflows.react(id, reaction).await? {
        WorkflowOutcome::Completed(tx) => println!("Reaction mined: {tx}"),
        WorkflowOutcome::ConnectRequested => bail!("wallet dropped mid-session"),
    }

    let Some(refreshed) = ProductCard::load(market.as_ref(), id).await? else {
        bail!("listing vanished after purchase");
    };

    println!();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    view::write_card(&mut handle, &refreshed)?;

    Ok(())
}
