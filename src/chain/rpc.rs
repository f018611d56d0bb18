//! JSON-RPC market reader
//!
//! Read-only access to the deployed marketplace over `eth_call`. Writes
//! need a signing wallet, which lives host-side, so this client implements
//! only the read capability.

use async_trait::async_trait;
use ethers::{
    abi::{self, ParamType, Token},
    types::{Address, Bytes, U256},
    utils::id as selector,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{
    chain::{ChainError, MarketReader},
    products::{ProductId, RawProduct},
    reactions::Reaction,
};

/// Leading four bytes of `Error(string)` revert data.
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Configuration for reading the marketplace over JSON-RPC.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// JSON-RPC endpoint, e.g. `"https://alfajores-forno.celo-testnet.org"`.
    pub endpoint: String,

    /// Address of the deployed marketplace contract.
    pub marketplace: Address,
}

/// Read-only JSON-RPC client for the marketplace contract.
#[derive(Debug, Clone)]
pub struct RpcReader {
    config: RpcConfig,
    http: Client,
}

impl RpcReader {
    /// Create a new reader from the given configuration.
    #[must_use]
    pub fn new(config: RpcConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Execute `eth_call` against the marketplace with `data` as calldata.
    async fn eth_call(&self, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": format!("{:?}", self.config.marketplace),
                    "data": Bytes::from(data),
                },
                "latest",
            ],
        });

        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(ChainError::Call(format!(
                "eth_call failed with status {status}: {text}"
            )));
        }

        let parsed: RpcResponse = response.json().await?;

        match (parsed.result, parsed.error) {
            (Some(result), _) => Ok(result.to_vec()),
            (None, Some(error)) => Err(classify(error)),
            (None, None) => Err(ChainError::MalformedResponse(
                "response carried neither result nor error".to_owned(),
            )),
        }
    }
}

#[async_trait]
impl MarketReader for RpcReader {
    async fn read_product(&self, id: ProductId) -> Result<Option<RawProduct>, ChainError> {
        let data = encode_call(
            "readProduct(uint256)",
            &[Token::Uint(U256::from(id.as_u64()))],
        );
        let output = self.eth_call(data).await?;

        decode_product(&output)
    }

    async fn reactions(
        &self,
        id: ProductId,
        reaction: Reaction,
    ) -> Result<Vec<Address>, ChainError> {
        let data = encode_call(
            "getReactions(uint256,uint256)",
            &[
                Token::Uint(U256::from(id.as_u64())),
                Token::Uint(U256::from(reaction.code())),
            ],
        );
        let output = self.eth_call(data).await?;

        decode_voters(&output)
    }

    async fn products_created(&self, owner: Address) -> Result<u64, ChainError> {
        let data = encode_call("getProductCreated(address)", &[Token::Address(owner)]);
        let output = self.eth_call(data).await?;

        decode_created(&output)
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Bytes>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    message: String,
    data: Option<Bytes>,
}

/// Map a JSON-RPC error body onto the chain error taxonomy, favouring a
/// decoded revert reason over the provider's message.
fn classify(error: RpcErrorBody) -> ChainError {
    if let Some(reason) = error.data.as_deref().and_then(decode_revert_reason) {
        return ChainError::Reverted(reason);
    }

    if let Some(rest) = error.message.strip_prefix("execution reverted") {
        let reason = rest.trim_start_matches(':').trim();
        if !reason.is_empty() {
            return ChainError::Reverted(reason.to_owned());
        }
    }

    ChainError::Call(error.message)
}

/// Decode the reason carried by `Error(string)` revert data.
fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let payload = data.strip_prefix(&ERROR_STRING_SELECTOR)?;
    let tokens = abi::decode(&[ParamType::String], payload).ok()?;

    tokens.into_iter().next()?.into_string()
}

/// Calldata for `signature` with `args` ABI-encoded behind the selector.
fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(abi::encode(args));
    data
}

fn next_token(tokens: &mut impl Iterator<Item = Token>) -> Result<Token, ChainError> {
    tokens
        .next()
        .ok_or_else(|| ChainError::MalformedResponse("output ended early".to_owned()))
}

fn token_error(wanted: &str) -> ChainError {
    ChainError::MalformedResponse(format!("unexpected output token, wanted {wanted}"))
}

/// Decode a `readProduct` tuple. Empty output and the zeroed record a
/// mapping returns for an unwritten slot both count as an absent listing.
fn decode_product(output: &[u8]) -> Result<Option<RawProduct>, ChainError> {
    if output.is_empty() {
        return Ok(None);
    }

    let tokens = abi::decode(
        &[
            ParamType::Address,
            ParamType::String,
            ParamType::String,
            ParamType::String,
            ParamType::Uint(256),
            ParamType::Uint(256),
        ],
        output,
    )
    .map_err(|error| ChainError::MalformedResponse(error.to_string()))?;

    let mut tokens = tokens.into_iter();
    let owner = next_token(&mut tokens)?
        .into_address()
        .ok_or_else(|| token_error("address"))?;
    let name = next_token(&mut tokens)?
        .into_string()
        .ok_or_else(|| token_error("string"))?;
    let image = next_token(&mut tokens)?
        .into_string()
        .ok_or_else(|| token_error("string"))?;
    let description = next_token(&mut tokens)?
        .into_string()
        .ok_or_else(|| token_error("string"))?;
    let price = next_token(&mut tokens)?
        .into_uint()
        .ok_or_else(|| token_error("uint"))?;
    let sold = next_token(&mut tokens)?
        .into_uint()
        .ok_or_else(|| token_error("uint"))?;

    if owner.is_zero() {
        return Ok(None);
    }

    Ok(Some(RawProduct(owner, name, image, description, price, sold)))
}

/// Decode a `getReactions` voter list.
fn decode_voters(output: &[u8]) -> Result<Vec<Address>, ChainError> {
    if output.is_empty() {
        return Ok(Vec::new());
    }

    let tokens = abi::decode(&[ParamType::Array(Box::new(ParamType::Address))], output)
        .map_err(|error| ChainError::MalformedResponse(error.to_string()))?;

    let voters = tokens
        .into_iter()
        .next()
        .and_then(Token::into_array)
        .ok_or_else(|| token_error("address array"))?;

    voters
        .into_iter()
        .map(|token| token.into_address().ok_or_else(|| token_error("address")))
        .collect()
}

/// Decode a `getProductCreated` counter.
fn decode_created(output: &[u8]) -> Result<u64, ChainError> {
    if output.is_empty() {
        return Ok(0);
    }

    let tokens = abi::decode(&[ParamType::Uint(256)], output)
        .map_err(|error| ChainError::MalformedResponse(error.to_string()))?;

    let count = tokens
        .into_iter()
        .next()
        .and_then(Token::into_uint)
        .ok_or_else(|| token_error("uint"))?;

    if count > U256::from(u64::MAX) {
        return Err(ChainError::MalformedResponse(format!(
            "created counter {count} out of range"
        )));
    }

    Ok(count.low_u64())
}
