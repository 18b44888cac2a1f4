//! Payment provider capability
//!
//! The game never holds keys or speaks RPC itself. A wallet implementing
//! `PaymentProvider` is injected into the payment gate; errors carry the
//! wallet's EIP-1193 style numeric codes.

pub mod dev;
pub mod gate;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::settings::{GameConfig, NATIVE_DECIMALS};

pub use dev::DevWallet;
pub use gate::{GateError, GateStatus, PaymentGate, PaymentRecord};

/// User dismissed the wallet prompt
pub const USER_REJECTED_CODE: i64 = 4001;
/// Wallet does not know the requested chain
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("request rejected by user")]
    UserRejected,

    #[error("chain not recognized by the wallet")]
    UnsupportedChain,

    #[error("wallet error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl ProviderError {
    /// Classify a raw wallet error
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        match code {
            USER_REJECTED_CODE => ProviderError::UserRejected,
            UNRECOGNIZED_CHAIN_CODE => ProviderError::UnsupportedChain,
            _ => ProviderError::Rpc {
                code,
                message: message.into(),
            },
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            ProviderError::UserRejected => USER_REJECTED_CODE,
            ProviderError::UnsupportedChain => UNRECOGNIZED_CHAIN_CODE,
            ProviderError::Rpc { code, .. } => *code,
        }
    }
}

/// Native currency as reported to `add_chain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

/// Chain registration parameters (`wallet_addEthereumChain` shape)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    /// Hex chain id, e.g. `0x107d`
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
    pub native_currency: NativeCurrency,
}

impl ChainDescriptor {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            chain_id: config.chain_id_hex(),
            chain_name: config.chain_name.clone(),
            rpc_urls: vec![config.rpc_url.clone()],
            block_explorer_urls: vec![config.block_explorer.clone()],
            native_currency: NativeCurrency {
                name: config.currency.clone(),
                symbol: config.currency.clone(),
                decimals: NATIVE_DECIMALS,
            },
        }
    }
}

/// An outgoing transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    /// Value in the smallest currency unit
    pub value: u128,
    /// Hex call data (function selector)
    pub data: String,
    /// Gas limit; unset while estimating
    pub gas: Option<u64>,
}

impl TransactionRequest {
    /// JSON-RPC params object with hex quantities
    pub fn to_params(&self) -> Value {
        let mut params = json!({
            "from": self.from,
            "to": self.to,
            "value": format!("{:#x}", self.value),
            "data": self.data,
        });
        if let Some(gas) = self.gas {
            params["gas"] = Value::String(format!("{:#x}", gas));
        }
        params
    }
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Ask the user to expose their accounts
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Fails with `UnsupportedChain` when the wallet has never seen the chain
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderError>;

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ProviderError>;

    /// Submit and return the transaction hash
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ProviderError::from_code(4001, "x"), ProviderError::UserRejected);
        assert_eq!(ProviderError::from_code(4902, "x"), ProviderError::UnsupportedChain);
        let other = ProviderError::from_code(-32000, "insufficient funds");
        assert_eq!(other.code(), -32000);
        assert_eq!(other.to_string(), "wallet error -32000: insufficient funds");
    }

    #[test]
    fn test_tx_params_hex() {
        let tx = TransactionRequest {
            from: "0xfrom".into(),
            to: "0xto".into(),
            value: 1_000_000_000_000_000,
            data: "0x149c4bca".into(),
            gas: Some(120_000),
        };
        let params = tx.to_params();
        assert_eq!(params["value"], "0x38d7ea4c68000");
        assert_eq!(params["gas"], "0x1d4c0");
        assert_eq!(params["data"], "0x149c4bca");
    }

    #[test]
    fn test_chain_descriptor_shape() {
        let chain = ChainDescriptor::from_config(&GameConfig::default());
        let json = serde_json::to_value(&chain).unwrap();
        assert_eq!(json["chainId"], "0x107d");
        assert_eq!(json["rpcUrls"][0], "https://genlayer-testnet.rpc.caldera.xyz/http");
        assert_eq!(json["nativeCurrency"]["decimals"], 18);
    }
}
