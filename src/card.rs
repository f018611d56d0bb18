//! Product cards
//!
//! A card bundles everything a storefront shows for one listing: the
//! formatted product record, its reaction tallies and the owner's listing
//! count. [`ProductCard::load`] gathers all of it through a
//! [`MarketReader`].

use thiserror::Error;
use tracing::info;

use crate::{
    chain::{ChainError, MarketReader},
    products::{Product, ProductError, ProductId},
    reactions::{Reaction, ReactionCounts},
};

/// Errors raised while assembling a card.
#[derive(Debug, Error)]
pub enum CardError {
    /// A chain read failed.
    #[error("chain read failed")]
    Chain(#[from] ChainError),

    /// The raw tuple could not be shaped into a product record.
    #[error("invalid product record")]
    Product(#[from] ProductError),
}

/// Everything a storefront needs to show one listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductCard {
    /// The formatted product record.
    pub product: Product,

    /// Vote tallies per reaction category.
    pub reactions: ReactionCounts,

    /// Listings the product's owner has created so far.
    pub products_created: u64,
}

impl ProductCard {
    /// Load the card for listing `id`.
    ///
    /// Returns `Ok(None)` while the listing is absent upstream. Reaction
    /// tallies are the number of distinct voters the contract holds per
    /// category.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::Chain`] when any read fails and
    /// [`CardError::Product`] when the raw tuple cannot be shaped into a
    /// record.
    #[tracing::instrument(name = "card.load", skip(reader, id), fields(product.id = %id), err)]
    pub async fn load(
        reader: &dyn MarketReader,
        id: ProductId,
    ) -> Result<Option<Self>, CardError> {
        let Some(raw) = reader.read_product(id).await? else {
            return Ok(None);
        };
        let product = Product::from_raw(id, raw)?;

        let mut reactions = ReactionCounts::new();
        for reaction in Reaction::ALL {
            let voters = reader.reactions(id, reaction).await?;
            reactions.set(reaction, voters.len() as u64);
        }

        let products_created = reader.products_created(product.owner).await?;

        info!(
            product.name = %product.name,
            reactions = reactions.total(),
            "loaded product card"
        );

        Ok(Some(Self {
            product,
            reactions,
            products_created,
        }))
    }
}
