//! Souk prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    card::{CardError, ProductCard},
    chain::{
        ChainError, MarketReader, MarketWriter, SpendApprover, TxHash, TxReceipt, TxSubmission,
        TxWatcher,
        memory::{MarketWrite, MemoryMarket},
        rpc::{RpcConfig, RpcReader},
    },
    config::MarketConfig,
    fixtures::{FixtureError, MarketFixture},
    notify::{LogNotifier, Notification, NotificationSink, RecordingNotifier},
    prices::{Price, PriceError},
    products::{Product, ProductError, ProductId, RawProduct},
    reactions::{Reaction, ReactionCounts, ReactionError},
    view::{render_card, write_card},
    wallet::{StaticWallet, WalletSession},
    workflows::{ConfirmationPolicy, WorkflowError, WorkflowOutcome, Workflows},
};
