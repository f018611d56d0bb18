//! Souk
//!
//! Souk is a storefront engine for an on-chain marketplace: typed product
//! records, reaction tallies, and purchase workflows decoupled from any
//! particular UI or wallet.

pub mod card;
pub mod chain;
pub mod config;
pub mod fixtures;
pub mod notify;
pub mod prelude;
pub mod prices;
pub mod products;
pub mod reactions;
pub mod view;
pub mod wallet;
pub mod workflows;
