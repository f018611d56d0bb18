//! Products
//!
//! Client-side projection of marketplace listings. The contract hands back a
//! positional tuple; [`Product::from_raw`] is the only place that turns it
//! into a typed record.

use std::fmt::{Display, Formatter, Result as FmtResult};

use ethers::types::{Address, U256};
use thiserror::Error;

use crate::prices::Price;

/// Listing index in the marketplace contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(u64);

impl ProductId {
    /// Wrap a listing index.
    #[must_use]
    pub const fn new(index: u64) -> Self {
        ProductId(index)
    }

    /// The listing index.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl From<u64> for ProductId {
    fn from(index: u64) -> Self {
        ProductId(index)
    }
}

/// Raw positional tuple as decoded from the contract's `readProduct`.
///
/// Field order is fixed by the contract: owner, name, image, description,
/// price, sold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawProduct(
    /// Seller's account.
    pub Address,
    /// Display name.
    pub String,
    /// Image URL.
    pub String,
    /// Free-text description.
    pub String,
    /// Price in smallest token units.
    pub U256,
    /// Completed purchase count.
    pub U256,
);

/// Errors projecting a raw tuple into a typed record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    /// The tuple's sale counter does not fit the record's counter type.
    #[error("sold counter {0} exceeds the supported range")]
    SoldOutOfRange(U256),
}

/// A marketplace listing, projected client-side from on-chain state.
///
/// Records are immutable: a listing is re-projected wholesale whenever the
/// upstream tuple changes, never patched field by field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    /// Listing index in the marketplace contract.
    pub id: ProductId,

    /// Seller's account.
    pub owner: Address,

    /// Display name.
    pub name: String,

    /// External image resource.
    pub image: String,

    /// Free-text description.
    pub description: String,

    /// Asking price in smallest token units.
    pub price: Price,

    /// Number of completed purchases.
    pub sold: u64,
}

impl Product {
    /// Project a raw positional tuple into a typed record.
    ///
    /// The mapping is positional and total for well-formed tuples; feeding
    /// the same tuple twice yields an identical record.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::SoldOutOfRange`] when the tuple's sale
    /// counter exceeds [`u64::MAX`].
    pub fn from_raw(id: ProductId, raw: RawProduct) -> Result<Self, ProductError> {
        let RawProduct(owner, name, image, description, price, sold) = raw;

        if sold > U256::from(u64::MAX) {
            return Err(ProductError::SoldOutOfRange(sold));
        }

        Ok(Product {
            id,
            owner,
            name,
            image,
            description,
            price: Price::from_wei(price),
            sold: sold.low_u64(),
        })
    }
}
