//! Storefront configuration

use clap::{Args, Parser};
use ethers::types::Address;

use crate::{chain::rpc::RpcConfig, workflows::ConfirmationPolicy};

/// Souk storefront configuration
#[derive(Debug, Parser)]
#[command(name = "souk", about = "Celo marketplace storefront", long_about = None)]
pub struct MarketConfig {
    /// Chain endpoint settings.
    #[command(flatten)]
    pub chain: ChainConfig,

    /// Confirmation depth settings.
    #[command(flatten)]
    pub confirmations: ConfirmationConfig,
}

/// Chain endpoint settings.
#[derive(Debug, Args)]
pub struct ChainConfig {
    /// JSON-RPC endpoint to read the marketplace through
    #[arg(
        long,
        env = "SOUK_RPC_ENDPOINT",
        default_value = "https://alfajores-forno.celo-testnet.org"
    )]
    pub rpc_endpoint: String,

    /// Deployed marketplace contract address
    #[arg(long, env = "SOUK_MARKETPLACE_ADDRESS")]
    pub marketplace_address: Address,

    /// Payment-token decimals used when rendering prices
    #[arg(long, env = "SOUK_TOKEN_DECIMALS", default_value = "18")]
    pub token_decimals: usize,
}

/// Confirmation depths to wait for per transaction kind.
#[derive(Debug, Args)]
pub struct ConfirmationConfig {
    /// Confirmations to wait on the spend approval
    #[arg(long, env = "SOUK_APPROVAL_CONFIRMATIONS", default_value = "1")]
    pub approval_confirmations: u32,

    /// Confirmations to wait on the purchase
    #[arg(long, env = "SOUK_PURCHASE_CONFIRMATIONS", default_value = "1")]
    pub purchase_confirmations: u32,

    /// Confirmations to wait on a reaction vote
    #[arg(long, env = "SOUK_REACTION_CONFIRMATIONS", default_value = "1")]
    pub reaction_confirmations: u32,
}

impl ConfirmationConfig {
    /// The policy the workflows should wait with.
    #[must_use]
    pub fn policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            approval: self.approval_confirmations,
            purchase: self.purchase_confirmations,
            reaction: self.reaction_confirmations,
        }
    }
}

impl MarketConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Settings for the JSON-RPC market reader.
    #[must_use]
    pub fn rpc(&self) -> RpcConfig {
        RpcConfig {
            endpoint: self.chain.rpc_endpoint.clone(),
            marketplace: self.chain.marketplace_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const MARKETPLACE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    #[test]
    fn defaults_target_alfajores_with_single_confirmations() -> TestResult {
        let config =
            MarketConfig::try_parse_from(["souk", "--marketplace-address", MARKETPLACE])?;

        assert_eq!(
            config.chain.rpc_endpoint,
            "https://alfajores-forno.celo-testnet.org"
        );
        assert_eq!(config.chain.marketplace_address, Address::repeat_byte(0xaa));
        assert_eq!(config.chain.token_decimals, 18);
        assert_eq!(config.confirmations.policy(), ConfirmationPolicy::default());

        Ok(())
    }

    #[test]
    fn flags_override_the_defaults() -> TestResult {
        let config = MarketConfig::try_parse_from([
            "souk",
            "--marketplace-address",
            MARKETPLACE,
            "--rpc-endpoint",
            "http://localhost:8545",
            "--token-decimals",
            "6",
            "--approval-confirmations",
            "3",
        ])?;

        assert_eq!(config.chain.rpc_endpoint, "http://localhost:8545");
        assert_eq!(config.chain.token_decimals, 6);
        assert_eq!(config.confirmations.policy().approval, 3);
        assert_eq!(config.confirmations.policy().purchase, 1);

        Ok(())
    }

    #[test]
    fn rpc_settings_carry_the_endpoint_and_contract() -> TestResult {
        let config =
            MarketConfig::try_parse_from(["souk", "--marketplace-address", MARKETPLACE])?;

        let rpc = config.rpc();

        assert_eq!(rpc.endpoint, config.chain.rpc_endpoint);
        assert_eq!(rpc.marketplace, Address::repeat_byte(0xaa));

        Ok(())
    }

    #[test]
    fn the_marketplace_address_is_required() {
        let result = MarketConfig::try_parse_from(["souk"]);

        assert!(result.is_err(), "expected a missing-argument error");
    }
}
