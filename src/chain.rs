//! Chain capabilities
//!
//! The marketplace contract, payment token and transaction watcher are
//! external collaborators. Workflows talk to them through the traits here;
//! implementations decide whether calls hit a JSON-RPC provider, an
//! in-memory market, or a mock.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use ethers::types::{Address, H256};
use mockall::automock;
use thiserror::Error;

use crate::{
    prices::Price,
    products::{ProductId, RawProduct},
    reactions::Reaction,
};

pub mod memory;
pub mod rpc;

/// Hash identifying a broadcast transaction.
pub type TxHash = H256;

/// Errors surfaced by chain capabilities.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The contract reverted and supplied a reason string.
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// The wallet or provider rejected the submission.
    #[error("{0}")]
    Rejected(String),

    /// A read call failed provider-side with the given message.
    #[error("{0}")]
    Call(String),

    /// HTTP transport failure talking to the provider.
    #[error("transport error")]
    Transport(#[from] reqwest::Error),

    /// The provider returned a payload this client cannot decode.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ChainError {
    /// Contract-supplied revert reason, when one was decoded.
    #[must_use]
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            ChainError::Reverted(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Receipt for a mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    /// Hash of the mined transaction.
    pub tx_hash: TxHash,

    /// Block the transaction was included in.
    pub block_number: u64,
}

/// Watches broadcast transactions until they reach a confirmation depth.
#[automock]
#[async_trait]
pub trait TxWatcher: Send + Sync {
    /// Block until `tx` has been mined and seen `confirmations`
    /// confirmations.
    async fn wait_mined(&self, tx: TxHash, confirmations: u32) -> Result<TxReceipt, ChainError>;
}

/// Handle for a signed, broadcast transaction.
///
/// Write capabilities return one per submission; [`TxSubmission::wait`]
/// resolves once the transaction has the requested confirmation depth.
#[derive(Clone)]
pub struct TxSubmission {
    hash: TxHash,
    watcher: Arc<dyn TxWatcher>,
}

impl TxSubmission {
    /// Pair a transaction hash with the watcher that can confirm it.
    #[must_use]
    pub fn new(hash: TxHash, watcher: Arc<dyn TxWatcher>) -> Self {
        Self { hash, watcher }
    }

    /// The broadcast transaction's hash.
    #[must_use]
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Wait until the transaction has `confirmations` confirmations.
    ///
    /// # Errors
    ///
    /// Propagates the watcher's [`ChainError`], including reverts observed
    /// at mining time.
    pub async fn wait(&self, confirmations: u32) -> Result<TxReceipt, ChainError> {
        self.watcher.wait_mined(self.hash, confirmations).await
    }
}

impl Debug for TxSubmission {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TxSubmission")
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}

/// Read capability over the marketplace contract.
///
/// Implementations return the latest decoded result; refreshing on new
/// blocks is their concern, not the caller's.
#[automock]
#[async_trait]
pub trait MarketReader: Send + Sync {
    /// Latest raw tuple for a listing, or `None` while the listing is
    /// absent upstream.
    async fn read_product(&self, id: ProductId) -> Result<Option<RawProduct>, ChainError>;

    /// Addresses that reacted to `id` under `reaction`; empty when the
    /// contract holds no list yet.
    async fn reactions(
        &self,
        id: ProductId,
        reaction: Reaction,
    ) -> Result<Vec<Address>, ChainError>;

    /// Number of listings `owner` has created.
    async fn products_created(&self, owner: Address) -> Result<u64, ChainError>;
}

/// Write capability for marketplace transactions.
///
/// Submissions are signed by the connected wallet; this crate never holds
/// key material.
#[automock]
#[async_trait]
pub trait MarketWriter: Send + Sync {
    /// Sign and broadcast a purchase of `id`.
    async fn buy_product(&self, id: ProductId) -> Result<TxSubmission, ChainError>;

    /// Sign and broadcast a reaction vote on `id`.
    async fn set_reaction(
        &self,
        id: ProductId,
        reaction: Reaction,
    ) -> Result<TxSubmission, ChainError>;
}

/// Spend-approval capability on the payment token.
#[automock]
#[async_trait]
pub trait SpendApprover: Send + Sync {
    /// Authorize the marketplace contract to transfer `amount` of the
    /// payment token from the buyer.
    async fn approve_spend(&self, amount: Price) -> Result<TxSubmission, ChainError>;
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;

    #[test]
    fn revert_reason_only_for_reverts() {
        let reverted = ChainError::Reverted("sold out".to_owned());
        let rejected = ChainError::Rejected("user denied".to_owned());

        assert_eq!(reverted.revert_reason(), Some("sold out"));
        assert_eq!(rejected.revert_reason(), None);
    }

    #[tokio::test]
    async fn submission_wait_delegates_to_watcher() {
        let hash = TxHash::from_low_u64_be(9);
        let receipt = TxReceipt {
            tx_hash: hash,
            block_number: 12,
        };

        let mut watcher = MockTxWatcher::new();
        watcher
            .expect_wait_mined()
            .with(eq(hash), eq(2_u32))
            .times(1)
            .returning(move |_, _| Ok(receipt));

        let submission = TxSubmission::new(hash, Arc::new(watcher));

        let waited = submission
            .wait(2)
            .await
            .expect("wait should resolve to the watcher's receipt");

        assert_eq!(waited, receipt);
        assert_eq!(submission.hash(), hash);
    }
}
