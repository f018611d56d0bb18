//! In-memory market
//!
//! A self-contained stand-in for the marketplace and payment-token pair,
//! scoped to a single buyer. Fixtures seed it, demos and integration tests
//! drive it. Spend approvals set an allowance, purchases consume it, and
//! every submission mines immediately into its own block.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use ethers::types::{Address, U256};
use rustc_hash::FxHashMap;

use crate::{
    chain::{
        ChainError, MarketReader, MarketWriter, SpendApprover, TxHash, TxReceipt, TxSubmission,
        TxWatcher,
    },
    prices::Price,
    products::{ProductId, RawProduct},
    reactions::Reaction,
};

/// The write submissions the market accepts.
///
/// Aims a planned failure at one step of a workflow while the surrounding
/// steps still mine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarketWrite {
    /// `approve_spend` on the payment token.
    Approval,

    /// `buy_product` on the marketplace.
    Purchase,

    /// `set_reaction` on the marketplace.
    Reaction,
}

#[derive(Debug, Default)]
struct Inner {
    listings: FxHashMap<ProductId, RawProduct>,
    reactions: FxHashMap<(ProductId, Reaction), Vec<Address>>,
    allowance: U256,
    planned_failures: FxHashMap<MarketWrite, VecDeque<ChainError>>,
    next_tx: u64,
    next_block: u64,
}

/// In-memory marketplace and payment token for one buyer.
///
/// Mirrors the deployed contracts' observable behaviour: reaction lists
/// hold each voter once, a purchase reverts without an allowance covering
/// the price, and approving replaces the allowance outright.
#[derive(Debug)]
pub struct MemoryMarket {
    buyer: Address,
    inner: Mutex<Inner>,
}

impl MemoryMarket {
    /// A market for `buyer` with no listings and no allowance.
    #[must_use]
    pub fn new(buyer: Address) -> Self {
        Self {
            buyer,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// The account whose writes this market signs for.
    #[must_use]
    pub fn buyer(&self) -> Address {
        self.buyer
    }

    /// Insert or replace the listing at `id`.
    pub fn list(&self, id: ProductId, raw: RawProduct) {
        self.lock().listings.insert(id, raw);
    }

    /// Record `voter` under `reaction` without a transaction, for seeding.
    pub fn seed_reaction(&self, id: ProductId, reaction: Reaction, voter: Address) {
        let mut inner = self.lock();
        let voters = inner.reactions.entry((id, reaction)).or_default();
        if !voters.contains(&voter) {
            voters.push(voter);
        }
    }

    /// Allowance the marketplace may currently spend for the buyer.
    #[must_use]
    pub fn allowance(&self) -> Price {
        Price::from_wei(self.lock().allowance)
    }

    /// Queue `error` to fail the next `write` submission instead of mining
    /// it. Submissions of other kinds are unaffected.
    pub fn inject_failure(&self, write: MarketWrite, error: ChainError) {
        self.lock()
            .planned_failures
            .entry(write)
            .or_default()
            .push_back(error);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn planned_failure(inner: &mut Inner, write: MarketWrite) -> Option<ChainError> {
        inner.planned_failures.get_mut(&write)?.pop_front()
    }

    fn mine(inner: &mut Inner) -> TxSubmission {
        inner.next_tx += 1;
        inner.next_block += 1;
        let hash = TxHash::from_low_u64_be(inner.next_tx);
        let receipt = TxReceipt {
            tx_hash: hash,
            block_number: inner.next_block,
        };
        TxSubmission::new(hash, Arc::new(MinedWatcher { receipt }))
    }
}

/// Watcher for submissions the market mined at acceptance time.
#[derive(Clone, Copy, Debug)]
struct MinedWatcher {
    receipt: TxReceipt,
}

#[async_trait]
impl TxWatcher for MinedWatcher {
    async fn wait_mined(&self, _tx: TxHash, _confirmations: u32) -> Result<TxReceipt, ChainError> {
        Ok(self.receipt)
    }
}

#[async_trait]
impl MarketReader for MemoryMarket {
    async fn read_product(&self, id: ProductId) -> Result<Option<RawProduct>, ChainError> {
        Ok(self.lock().listings.get(&id).cloned())
    }

    async fn reactions(
        &self,
        id: ProductId,
        reaction: Reaction,
    ) -> Result<Vec<Address>, ChainError> {
        Ok(self
            .lock()
            .reactions
            .get(&(id, reaction))
            .cloned()
            .unwrap_or_default())
    }

    async fn products_created(&self, owner: Address) -> Result<u64, ChainError> {
        let created = self
            .lock()
            .listings
            .values()
            .filter(|raw| raw.0 == owner)
            .count();
        Ok(created as u64)
    }
}

#[async_trait]
impl MarketWriter for MemoryMarket {
    async fn buy_product(&self, id: ProductId) -> Result<TxSubmission, ChainError> {
        let mut inner = self.lock();
        if let Some(error) = Self::planned_failure(&mut inner, MarketWrite::Purchase) {
            return Err(error);
        }

        let price = match inner.listings.get(&id) {
            Some(listing) => listing.4,
            None => return Err(ChainError::Reverted("unknown product".to_owned())),
        };
        if inner.allowance < price {
            return Err(ChainError::Reverted("insufficient allowance".to_owned()));
        }

        inner.allowance -= price;
        if let Some(listing) = inner.listings.get_mut(&id) {
            listing.5 += U256::one();
        }

        Ok(Self::mine(&mut inner))
    }

    async fn set_reaction(
        &self,
        id: ProductId,
        reaction: Reaction,
    ) -> Result<TxSubmission, ChainError> {
        let mut inner = self.lock();
        if let Some(error) = Self::planned_failure(&mut inner, MarketWrite::Reaction) {
            return Err(error);
        }

        if !inner.listings.contains_key(&id) {
            return Err(ChainError::Reverted("unknown product".to_owned()));
        }

        let buyer = self.buyer;
        let voters = inner.reactions.entry((id, reaction)).or_default();
        if !voters.contains(&buyer) {
            voters.push(buyer);
        }

        Ok(Self::mine(&mut inner))
    }
}

#[async_trait]
impl SpendApprover for MemoryMarket {
    async fn approve_spend(&self, amount: Price) -> Result<TxSubmission, ChainError> {
        let mut inner = self.lock();
        if let Some(error) = Self::planned_failure(&mut inner, MarketWrite::Approval) {
            return Err(error);
        }

        inner.allowance = amount.as_wei();

        Ok(Self::mine(&mut inner))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn bread() -> RawProduct {
        RawProduct(
            Address::repeat_byte(0xaa),
            "Bread".to_owned(),
            "img.png".to_owned(),
            "Fresh".to_owned(),
            U256::exp10(18),
            U256::from(3_u64),
        )
    }

    fn market_with_bread() -> MemoryMarket {
        let market = MemoryMarket::new(Address::repeat_byte(0x01));
        market.list(ProductId::new(7), bread());
        market
    }

    #[tokio::test]
    async fn listings_round_trip_through_the_reader() -> TestResult {
        let market = market_with_bread();

        assert_eq!(
            market.read_product(ProductId::new(7)).await?,
            Some(bread())
        );
        assert_eq!(market.read_product(ProductId::new(8)).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn products_created_counts_one_owner_only() -> TestResult {
        let market = market_with_bread();
        let other = Address::repeat_byte(0xbb);
        market.list(
            ProductId::new(8),
            RawProduct(
                other,
                "Milk".to_owned(),
                "milk.png".to_owned(),
                "Cold".to_owned(),
                U256::exp10(17),
                U256::zero(),
            ),
        );

        assert_eq!(market.products_created(Address::repeat_byte(0xaa)).await?, 1);
        assert_eq!(market.products_created(other).await?, 1);
        assert_eq!(market.products_created(Address::repeat_byte(0xcc)).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn approval_funds_a_purchase_which_consumes_it() -> TestResult {
        let market = market_with_bread();

        let approval = market.approve_spend(Price::from_wei(U256::exp10(18))).await?;
        approval.wait(1).await?;
        assert_eq!(market.allowance(), Price::from_wei(U256::exp10(18)));

        let purchase = market.buy_product(ProductId::new(7)).await?;
        let receipt = purchase.wait(1).await?;
        assert_eq!(receipt.tx_hash, purchase.hash());
        assert_eq!(market.allowance(), Price::from_wei(U256::zero()));

        let listing = market
            .read_product(ProductId::new(7))
            .await?
            .expect("listing should survive a purchase");
        assert_eq!(listing.5, U256::from(4_u64));

        Ok(())
    }

    #[tokio::test]
    async fn purchase_without_allowance_reverts() {
        let market = market_with_bread();

        let result = market.buy_product(ProductId::new(7)).await;

        match result {
            Err(error) => assert_eq!(error.revert_reason(), Some("insufficient allowance")),
            Ok(submission) => panic!("expected a revert, got {submission:?}"),
        }
    }

    #[tokio::test]
    async fn purchase_of_an_unknown_listing_reverts() {
        let market = MemoryMarket::new(Address::repeat_byte(0x01));

        let result = market.buy_product(ProductId::new(99)).await;

        match result {
            Err(error) => assert_eq!(error.revert_reason(), Some("unknown product")),
            Ok(submission) => panic!("expected a revert, got {submission:?}"),
        }
    }

    #[tokio::test]
    async fn repeat_reactions_keep_one_voter_entry() -> TestResult {
        let market = market_with_bread();

        market
            .set_reaction(ProductId::new(7), Reaction::Delicious)
            .await?;
        market
            .set_reaction(ProductId::new(7), Reaction::Delicious)
            .await?;

        let voters = market.reactions(ProductId::new(7), Reaction::Delicious).await?;
        assert_eq!(voters, vec![market.buyer()]);

        let untouched = market.reactions(ProductId::new(7), Reaction::Sour).await?;
        assert!(untouched.is_empty(), "other categories stay empty");

        Ok(())
    }

    #[tokio::test]
    async fn injected_failures_preempt_the_targeted_submission() -> TestResult {
        let market = market_with_bread();
        market.inject_failure(
            MarketWrite::Approval,
            ChainError::Rejected("user denied signature".to_owned()),
        );

        let rejected = market.approve_spend(Price::from_wei(U256::exp10(18))).await;
        assert!(
            matches!(rejected, Err(ChainError::Rejected(..))),
            "expected the planned rejection, got {rejected:?}"
        );
        assert_eq!(market.allowance(), Price::from_wei(U256::zero()));

        market.approve_spend(Price::from_wei(U256::exp10(18))).await?;
        assert_eq!(market.allowance(), Price::from_wei(U256::exp10(18)));

        Ok(())
    }

    #[tokio::test]
    async fn injected_purchase_failures_spare_the_approval() -> TestResult {
        let market = market_with_bread();
        market.inject_failure(
            MarketWrite::Purchase,
            ChainError::Reverted("sold out".to_owned()),
        );

        // Not the targeted write, so the approval still mines.
        market.approve_spend(Price::from_wei(U256::exp10(18))).await?;
        assert_eq!(market.allowance(), Price::from_wei(U256::exp10(18)));

        let reverted = market.buy_product(ProductId::new(7)).await;
        match reverted {
            Err(error) => assert_eq!(error.revert_reason(), Some("sold out")),
            Ok(submission) => panic!("expected the planned revert, got {submission:?}"),
        }

        // The failure went with the attempt, so the retry mines.
        market.buy_product(ProductId::new(7)).await?;
        assert_eq!(market.allowance(), Price::from_wei(U256::zero()));

        Ok(())
    }

    #[tokio::test]
    async fn submissions_mine_into_consecutive_blocks() -> TestResult {
        let market = market_with_bread();

        let first = market
            .approve_spend(Price::from_wei(U256::exp10(18)))
            .await?
            .wait(1)
            .await?;
        let second = market
            .buy_product(ProductId::new(7))
            .await?
            .wait(1)
            .await?;

        assert_eq!(first.block_number, 1);
        assert_eq!(second.block_number, 2);
        assert_ne!(first.tx_hash, second.tx_hash);

        Ok(())
    }
}
