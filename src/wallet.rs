//! Wallet sessions
//!
//! Workflows never hold keys or talk to a wallet directly. They ask a
//! [`WalletSession`] for the connected account and, when there is none,
//! request that the host open its connect flow.

use std::sync::atomic::{AtomicUsize, Ordering};

use ethers::types::Address;
use mockall::automock;

/// The connected account, if any, plus the ability to ask for one.
#[automock]
pub trait WalletSession: Send + Sync {
    /// Currently connected account, or `None` when no wallet is attached.
    fn address(&self) -> Option<Address>;

    /// Ask the host to open its connect-wallet flow.
    fn request_connection(&self);
}

/// Session with a fixed connection state.
///
/// Connection prompts are counted so callers can assert that a workflow
/// asked for a wallet instead of writing without one.
#[derive(Debug, Default)]
pub struct StaticWallet {
    address: Option<Address>,
    prompts: AtomicUsize,
}

impl StaticWallet {
    /// A session with `address` connected.
    #[must_use]
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
            prompts: AtomicUsize::new(0),
        }
    }

    /// A session with no wallet attached.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Number of connection prompts issued so far.
    #[must_use]
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::Relaxed)
    }
}

impl WalletSession for StaticWallet {
    fn address(&self) -> Option<Address> {
        self.address
    }

    fn request_connection(&self) {
        self.prompts.fetch_add(1, Ordering::Relaxed);
    }
}
