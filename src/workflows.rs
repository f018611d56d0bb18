//! Purchase and reaction workflows
//!
//! The write side of the storefront. Each workflow drives its capability
//! seams in a fixed order, reports progress through the notification sink
//! and always dismisses the in-flight indicator on the way out, whatever
//! the outcome.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use thiserror::Error;
use tracing::info;

use crate::{
    chain::{ChainError, MarketWriter, SpendApprover, TxHash},
    notify::NotificationSink,
    products::{Product, ProductId},
    reactions::Reaction,
    wallet::WalletSession,
};

/// Failure text shown when an error carries neither a revert reason nor a
/// wallet or provider message.
const FALLBACK_MESSAGE: &str = "Something went wrong. Try again.";

/// Errors raised by write workflows.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A chain interaction failed; the notification sink already received
    /// the user-facing message for it.
    #[error("chain interaction failed")]
    Chain(#[from] ChainError),
}

/// Terminal state of a write workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// The final transaction was mined; the hash identifies it.
    Completed(TxHash),

    /// No wallet was connected, so a connection prompt was issued and no
    /// write was attempted.
    ConnectRequested,
}

/// Confirmation depths the workflows wait for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Depth required for the spend approval.
    pub approval: u32,

    /// Depth required for the purchase itself.
    pub purchase: u32,

    /// Depth required for a reaction vote.
    pub reaction: u32,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            approval: 1,
            purchase: 1,
            reaction: 1,
        }
    }
}

/// Write workflows bound to their capability seams.
pub struct Workflows {
    writer: Arc<dyn MarketWriter>,
    approver: Arc<dyn SpendApprover>,
    wallet: Arc<dyn WalletSession>,
    notifier: Arc<dyn NotificationSink>,
    confirmations: ConfirmationPolicy,
}

impl Workflows {
    /// Bind workflows to their seams, waiting one confirmation per
    /// transaction.
    #[must_use]
    pub fn new(
        writer: Arc<dyn MarketWriter>,
        approver: Arc<dyn SpendApprover>,
        wallet: Arc<dyn WalletSession>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            writer,
            approver,
            wallet,
            notifier,
            confirmations: ConfirmationPolicy::default(),
        }
    }

    /// Replace the confirmation depths.
    #[must_use]
    pub fn with_confirmations(mut self, confirmations: ConfirmationPolicy) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Buy one unit of `product`.
    ///
    /// Approves the spend of the product's price, waits for the approval to
    /// confirm, then submits the purchase and waits for it. With no wallet
    /// connected the workflow requests a connection and submits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Chain`] when any approval or purchase step
    /// fails; the indicator is still cleared.
    #[tracing::instrument(
        name = "workflows.purchase",
        skip(self, product),
        fields(product.id = %product.id),
        err
    )]
    pub async fn purchase(&self, product: &Product) -> Result<WorkflowOutcome, WorkflowError> {
        self.notifier.loading("Approving ...");

        let outcome = match self.purchase_steps(product).await {
            Ok(Some(hash)) => {
                self.notifier.success("Product purchased successfully");
                info!(tx = %hash, "purchase complete");
                Ok(WorkflowOutcome::Completed(hash))
            }
            Ok(None) => Ok(WorkflowOutcome::ConnectRequested),
            Err(error) => {
                self.notifier.failure(&user_message(&error));
                Err(WorkflowError::Chain(error))
            }
        };

        self.notifier.clear_loading();
        outcome
    }

    /// React to listing `id` with one of the fixed categories.
    ///
    /// Submits a single vote transaction and waits for it to confirm. With
    /// no wallet connected the workflow requests a connection and submits
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Chain`] when the vote fails; the indicator
    /// is still cleared.
    #[tracing::instrument(
        name = "workflows.react",
        skip(self, id, reaction),
        fields(product.id = %id, reaction = %reaction),
        err
    )]
    pub async fn react(
        &self,
        id: ProductId,
        reaction: Reaction,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        self.notifier
            .loading(&format!("Reaction with {}", reaction.label().to_uppercase()));

        let outcome = match self.react_steps(id, reaction).await {
            Ok(Some(hash)) => {
                self.notifier.success("Reacted successfully");
                info!(tx = %hash, "reaction complete");
                Ok(WorkflowOutcome::Completed(hash))
            }
            Ok(None) => Ok(WorkflowOutcome::ConnectRequested),
            Err(error) => {
                self.notifier.failure(&user_message(&error));
                Err(WorkflowError::Chain(error))
            }
        };

        self.notifier.clear_loading();
        outcome
    }

    /// `Ok(None)` means no wallet was connected and a prompt was issued.
    async fn purchase_steps(&self, product: &Product) -> Result<Option<TxHash>, ChainError> {
        if self.wallet.address().is_none() {
            self.wallet.request_connection();
            return Ok(None);
        }

        self.notifier.pending("Purchasing product...");

        let approval = self.approver.approve_spend(product.price).await?;
        approval.wait(self.confirmations.approval).await?;

        self.notifier.loading("Purchasing...");

        let submission = self.writer.buy_product(product.id).await?;
        let receipt = submission.wait(self.confirmations.purchase).await?;

        Ok(Some(receipt.tx_hash))
    }

    /// `Ok(None)` means no wallet was connected and a prompt was issued.
    async fn react_steps(
        &self,
        id: ProductId,
        reaction: Reaction,
    ) -> Result<Option<TxHash>, ChainError> {
        if self.wallet.address().is_none() {
            self.wallet.request_connection();
            return Ok(None);
        }

        self.notifier.pending("Reacting...");

        let submission = self.writer.set_reaction(id, reaction).await?;

        self.notifier.loading("Mining transaction");

        let receipt = submission.wait(self.confirmations.reaction).await?;

        Ok(Some(receipt.tx_hash))
    }
}

impl Debug for Workflows {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Workflows")
            .field("confirmations", &self.confirmations)
            .finish_non_exhaustive()
    }
}

/// Pick the most specific user-facing text for a failed chain interaction:
/// a contract revert reason first, then a wallet or provider message, then
/// a generic retry prompt.
fn user_message(error: &ChainError) -> String {
    if let Some(reason) = error.revert_reason() {
        return reason.to_owned();
    }

    match error {
        ChainError::Rejected(message) | ChainError::Call(message) if !message.is_empty() => {
            message.clone()
        }
        _ => FALLBACK_MESSAGE.to_owned(),
    }
}
