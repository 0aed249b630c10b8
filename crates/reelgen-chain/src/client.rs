//! Chain client collaborator
//!
//! The contract the payment layer depends on: a fresh balance read and a
//! single transfer. The HTTP implementation keeps to what can be done
//! without implementing transaction signing:
//!
//! - balances via JSON-RPC `eth_call` of ERC-20 `balanceOf`/`decimals`
//! - transfers via a signer-relay endpoint that broadcasts on our behalf
//!   and returns the confirmed receipt fields

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use reelgen_types::Amount;

/// ERC-20 `balanceOf(address)` selector
const BALANCE_OF_SELECTOR: &str = "70a08231";
/// ERC-20 `decimals()` selector
const DECIMALS_SELECTOR: &str = "313ce567";

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC request failed: {detail}")]
    Rpc { detail: String },

    #[error("RPC returned an error: {detail}")]
    RpcRejected { detail: String },

    #[error("could not decode chain response: {detail}")]
    Decode { detail: String },

    #[error("signer relay request failed: {detail}")]
    Relay { detail: String },

    #[error("transfer rejected by relay: {detail}")]
    TransferRejected { detail: String },

    #[error("invalid wallet key: {detail}")]
    InvalidKey { detail: String },
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Receipt of a confirmed on-chain transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub tx_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
}

/// The chain collaborator the payment layer talks to
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Read the current token balance of `address`. Every call is a fresh
    /// read; implementations must not cache.
    async fn read_balance(&self, address: &str) -> Result<Amount, ChainError>;

    /// Transfer `amount` to `to` and wait for confirmation. Implementations
    /// must not retry internally: the caller treats one invocation as at
    /// most one irreversible movement of funds.
    async fn transfer(&self, to: &str, amount: Amount) -> Result<TransferReceipt, ChainError>;
}

// ── HTTP implementation ──────────────────────────────────────────────────────

/// Configuration for [`HttpChainClient`]
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// ERC-20 token contract holding the balance (USDC)
    pub token_contract: String,
    /// Signer relay endpoint that broadcasts transfers
    pub relay_url: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: std::env::var("REELGEN_RPC_URL")
                .unwrap_or_else(|_| "https://sepolia.base.org".to_string()),
            // Base Sepolia USDC
            token_contract: std::env::var("REELGEN_TOKEN_CONTRACT")
                .unwrap_or_else(|_| "0x036CbD53842c5426634e7929541eC2318f3dCF7e".to_string()),
            relay_url: std::env::var("REELGEN_RELAY_URL")
                .unwrap_or_else(|_| "http://localhost:8402/transfer".to_string()),
        }
    }
}

/// JSON-RPC + relay chain client
pub struct HttpChainClient {
    config: ChainConfig,
    client: reqwest::Client,
}

impl HttpChainClient {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ChainConfig::default())
    }

    /// One JSON-RPC `eth_call` against the token contract.
    async fn eth_call(&self, data: String) -> Result<String, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": self.config.token_contract, "data": data },
                "latest"
            ]
        });

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Rpc {
                detail: e.to_string(),
            })?;

        let payload: Value = response.json().await.map_err(|e| ChainError::Decode {
            detail: e.to_string(),
        })?;

        if let Some(err) = payload.get("error") {
            return Err(ChainError::RpcRejected {
                detail: err.to_string(),
            });
        }

        payload
            .get("result")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ChainError::Decode {
                detail: "eth_call response missing result".into(),
            })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayTransferRequest<'a> {
    to: &'a str,
    /// Raw token units (micro-USDC)
    amount: i128,
    token: &'a str,
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn read_balance(&self, address: &str) -> Result<Amount, ChainError> {
        let raw_hex = self.eth_call(encode_balance_of(address)?).await?;
        let raw = parse_u256_hex(&raw_hex)?;

        let decimals_hex = self.eth_call(format!("0x{DECIMALS_SELECTOR}")).await?;
        let decimals = parse_u256_hex(&decimals_hex)? as u8;

        let balance = Amount::from_raw_units(raw, decimals).map_err(|e| ChainError::Decode {
            detail: e.to_string(),
        })?;
        tracing::debug!(%address, balance = %balance, "read token balance");
        Ok(balance)
    }

    async fn transfer(&self, to: &str, amount: Amount) -> Result<TransferReceipt, ChainError> {
        let request = RelayTransferRequest {
            to,
            amount: amount.micro,
            token: &self.config.token_contract,
        };

        tracing::info!(%to, amount = %amount, "submitting transfer to signer relay");

        let response = self
            .client
            .post(&self.config.relay_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChainError::Relay {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChainError::TransferRejected {
                detail: format!("{status}: {text}"),
            });
        }

        let receipt: TransferReceipt =
            response.json().await.map_err(|e| ChainError::Decode {
                detail: format!("relay receipt: {e}"),
            })?;

        tracing::info!(tx_hash = %receipt.tx_hash, block = receipt.block_number, "transfer confirmed");
        Ok(receipt)
    }
}

// ── ABI helpers ──────────────────────────────────────────────────────────────

/// Encode `balanceOf(address)` calldata: selector + 32-byte padded address.
fn encode_balance_of(address: &str) -> Result<String, ChainError> {
    let trimmed = address.strip_prefix("0x").unwrap_or(address);
    if trimmed.len() != 40 || hex::decode(trimmed).is_err() {
        return Err(ChainError::Decode {
            detail: format!("not a 20-byte hex address: {address}"),
        });
    }
    Ok(format!(
        "0x{BALANCE_OF_SELECTOR}{:0>64}",
        trimmed.to_lowercase()
    ))
}

/// Parse a 0x-prefixed 256-bit hex word into i128.
/// Values above i128::MAX are a decode error, not a silent truncation.
fn parse_u256_hex(word: &str) -> Result<i128, ChainError> {
    let trimmed = word.strip_prefix("0x").unwrap_or(word);
    let significant = trimmed.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }
    if significant.len() > 32 {
        return Err(ChainError::Decode {
            detail: format!("value exceeds i128 range: {word}"),
        });
    }
    // from_str_radix also rejects 32-digit words above i128::MAX
    i128::from_str_radix(significant, 16).map_err(|e| ChainError::Decode {
        detail: format!("bad hex word {word}: {e}"),
    })
}
