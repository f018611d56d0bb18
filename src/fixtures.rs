//! Fixtures
//!
//! YAML-backed market sets for demos and integration tests. A fixture set
//! names a buyer, the listings, and any pre-recorded reaction votes; it
//! seeds a [`MemoryMarket`] ready to drive.

use std::{fs, path::PathBuf};

use ethers::types::{Address, U256};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    chain::memory::MemoryMarket,
    prices::{Price, PriceError},
    products::{ProductId, RawProduct},
    reactions::Reaction,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid account address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid price literal
    #[error("Invalid price: {0}")]
    Price(#[from] PriceError),
}

/// Wrapper for a market set in YAML
#[derive(Debug, Deserialize)]
pub struct MarketFixture {
    /// Buyer account the market signs writes for
    pub buyer: String,

    /// Map of listing id -> product fixture
    pub products: FxHashMap<u64, ProductFixture>,

    /// Map of listing id -> reaction label -> voter addresses
    #[serde(default)]
    pub reactions: FxHashMap<u64, FxHashMap<Reaction, Vec<String>>>,
}

/// Product fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Seller address
    pub owner: String,

    /// Display name
    pub name: String,

    /// Image URL
    pub image: String,

    /// Short description
    pub description: String,

    /// Price in the payment token's smallest unit
    pub price: String,

    /// Units sold so far
    #[serde(default)]
    pub sold: u64,
}

impl MarketFixture {
    /// Load the named set from the default `./fixtures` directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_base_path("./fixtures", name)
    }

    /// Load the named set from below `base_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_base_path(
        base_path: impl Into<PathBuf>,
        name: &str,
    ) -> Result<Self, FixtureError> {
        let file_path = base_path.into().join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Seed a memory market with the set's listings and votes.
    ///
    /// # Errors
    ///
    /// Returns an error if an address or price literal is invalid.
    pub fn into_market(self) -> Result<MemoryMarket, FixtureError> {
        let buyer = parse_address(&self.buyer)?;
        let market = MemoryMarket::new(buyer);

        for (id, product) in self.products {
            market.list(ProductId::new(id), product.into_raw()?);
        }

        for (id, votes) in self.reactions {
            for (reaction, voters) in votes {
                for voter in voters {
                    market.seed_reaction(ProductId::new(id), reaction, parse_address(&voter)?);
                }
            }
        }

        Ok(market)
    }
}

impl ProductFixture {
    /// Convert to the contract's raw tuple shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner address or price literal is invalid.
    pub fn into_raw(self) -> Result<RawProduct, FixtureError> {
        let owner = parse_address(&self.owner)?;
        let price = Price::from_dec_str(&self.price)?;

        Ok(RawProduct(
            owner,
            self.name,
            self.image,
            self.description,
            price.as_wei(),
            U256::from(self.sold),
        ))
    }
}

fn parse_address(input: &str) -> Result<Address, FixtureError> {
    input
        .trim()
        .parse()
        .map_err(|_err| FixtureError::InvalidAddress(input.to_owned()))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::chain::MarketReader as _;

    const BAKERY: &str = r#"
buyer: "0x0101010101010101010101010101010101010101"
products:
  7:
    owner: "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
    name: Bread
    image: img.png
    description: Fresh
    price: "1000000000000000000"
    sold: 3
reactions:
  7:
    delicious:
      - "0x0202020202020202020202020202020202020202"
      - "0x0303030303030303030303030303030303030303"
    suspicious:
      - "0x0202020202020202020202020202020202020202"
"#;

    #[tokio::test]
    async fn a_parsed_set_seeds_listings_and_votes() -> TestResult {
        let fixture: MarketFixture = serde_norway::from_str(BAKERY)?;
        let market = fixture.into_market()?;

        assert_eq!(market.buyer(), Address::repeat_byte(0x01));

        let listing = market
            .read_product(ProductId::new(7))
            .await?
            .expect("the bakery set lists product 7");
        assert_eq!(listing.1, "Bread");
        assert_eq!(listing.4, U256::exp10(18));
        assert_eq!(listing.5, U256::from(3_u64));

        Ok(())
    }

    #[tokio::test]
    async fn votes_land_under_their_categories() -> TestResult {
        let market = serde_norway::from_str::<MarketFixture>(BAKERY)?.into_market()?;

        let delicious = market
            .reactions(ProductId::new(7), Reaction::Delicious)
            .await?;
        let suspicious = market
            .reactions(ProductId::new(7), Reaction::Suspicious)
            .await?;
        let sour = market.reactions(ProductId::new(7), Reaction::Sour).await?;

        assert_eq!(delicious.len(), 2);
        assert_eq!(suspicious, vec![Address::repeat_byte(0x02)]);
        assert!(sour.is_empty(), "unvoted categories stay empty");

        Ok(())
    }

    #[test]
    fn the_reactions_block_is_optional() -> TestResult {
        let yaml = r#"
buyer: "0x0101010101010101010101010101010101010101"
products: {}
"#;

        let fixture: MarketFixture = serde_norway::from_str(yaml)?;

        assert!(fixture.reactions.is_empty());

        Ok(())
    }

    #[test]
    fn bad_addresses_are_rejected() {
        let yaml = r#"
buyer: "not-an-address"
products: {}
"#;

        let result = serde_norway::from_str::<MarketFixture>(yaml)
            .map_err(FixtureError::from)
            .and_then(MarketFixture::into_market);

        assert!(
            matches!(result, Err(FixtureError::InvalidAddress(..))),
            "expected an address error, got {result:?}"
        );
    }

    #[test]
    fn the_bakery_set_loads_from_disk() -> TestResult {
        let fixture = MarketFixture::from_set("bakery")?;

        assert!(
            !fixture.products.is_empty(),
            "the shipped bakery set should list products"
        );

        Ok(())
    }
}
