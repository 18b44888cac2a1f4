//! Payment gate state machine
//!
//! `Disconnected -> Connected -> Paid`. Only `Paid` unlocks starting a
//! session, and it stays `Paid` across replays. Failures never move the gate
//! forward; they leave it where it was and produce a user-facing message.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ChainDescriptor, PaymentProvider, ProviderError, TransactionRequest};
use crate::persistence::{KeyValueStore, payment_key};
use crate::platform::Clock;
use crate::settings::{ConfigError, GameConfig};

/// Shown when a wallet error has no message of its own
const PAYMENT_HINT: &str = "Please check: 1) You have enough funds for gas + entry fee, \
     2) You are on the right network, 3) The contract is deployed correctly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GateStatus {
    #[default]
    Disconnected,
    Connected,
    Paid,
}

/// Proof of a submitted entry-fee transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(skip)]
    pub account: String,
    pub tx_hash: String,
    /// Unix timestamp (ms) of the payment
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
    /// Fee in whole currency units ("0.001")
    pub amount: String,
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Please install MetaMask or another Web3 wallet to play!")]
    ProviderAbsent,

    #[error("Please connect your wallet first!")]
    NotConnected,

    #[error("Entry fee already paid.")]
    AlreadyPaid,

    #[error("Wallet returned no accounts.")]
    NoAccounts,

    #[error("Failed to connect wallet. Please try again.")]
    Connect(#[source] ProviderError),

    #[error("Transaction rejected by user.")]
    UserRejected,

    #[error("Payment failed. {detail}")]
    Payment { code: i64, detail: String },

    #[error("Invalid payment configuration: {0}")]
    Config(#[from] ConfigError),
}

impl GateError {
    fn from_send(err: ProviderError) -> Self {
        match err {
            ProviderError::UserRejected => GateError::UserRejected,
            ProviderError::Rpc { code, message } if !message.is_empty() => GateError::Payment {
                code,
                detail: message,
            },
            other => GateError::Payment {
                code: other.code(),
                detail: PAYMENT_HINT.to_string(),
            },
        }
    }
}

pub struct PaymentGate {
    provider: Option<Arc<dyn PaymentProvider>>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: GameConfig,
    status: GateStatus,
    account: Option<String>,
    payment: Option<PaymentRecord>,
}

impl PaymentGate {
    pub fn new(
        provider: Option<Arc<dyn PaymentProvider>>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: GameConfig,
    ) -> Self {
        Self {
            provider,
            store,
            clock,
            config,
            status: GateStatus::Disconnected,
            account: None,
            payment: None,
        }
    }

    pub fn status(&self) -> GateStatus {
        self.status
    }

    pub fn is_paid(&self) -> bool {
        self.status == GateStatus::Paid
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn payment(&self) -> Option<&PaymentRecord> {
        self.payment.as_ref()
    }

    fn provider(&self) -> Result<Arc<dyn PaymentProvider>, GateError> {
        self.provider.clone().ok_or(GateError::ProviderAbsent)
    }

    /// Request accounts and make sure the wallet is on the game's chain
    pub async fn connect(&mut self) -> Result<String, GateError> {
        let provider = self.provider()?;

        let accounts = provider
            .request_accounts()
            .await
            .map_err(GateError::Connect)?;
        let account = accounts.into_iter().next().ok_or(GateError::NoAccounts)?;

        self.ensure_chain(provider.as_ref())
            .await
            .map_err(GateError::Connect)?;

        let same_account = self.account.as_deref() == Some(account.as_str());
        if !(same_account && self.status == GateStatus::Paid) {
            self.status = GateStatus::Connected;
            self.payment = None;
        }
        log::info!(
            "Wallet connected: {} on {}",
            crate::shorten_address(&account),
            self.config.chain_name
        );
        self.account = Some(account.clone());
        Ok(account)
    }

    async fn ensure_chain(&self, provider: &dyn PaymentProvider) -> Result<(), ProviderError> {
        let target = self.config.chain_id;
        let current = provider.chain_id().await?;
        if current == target {
            return Ok(());
        }

        log::info!("Switching wallet from chain {:#x} to {:#x}", current, target);
        match provider.switch_chain(target).await {
            Ok(()) => Ok(()),
            Err(ProviderError::UnsupportedChain) => {
                log::info!("Registering chain {}", self.config.chain_name);
                provider
                    .add_chain(&ChainDescriptor::from_config(&self.config))
                    .await?;
                provider.switch_chain(target).await
            }
            Err(e) => Err(e),
        }
    }

    /// Pay the entry fee. On success the gate is `Paid` and the record is
    /// persisted best-effort.
    pub async fn pay(&mut self) -> Result<PaymentRecord, GateError> {
        let provider = self.provider()?;
        let account = match (self.status, self.account.as_ref()) {
            (GateStatus::Paid, _) => return Err(GateError::AlreadyPaid),
            (GateStatus::Connected, Some(account)) => account.clone(),
            _ => return Err(GateError::NotConnected),
        };

        let mut tx = TransactionRequest {
            from: account.clone(),
            to: self.config.contract_address.clone(),
            value: self.config.entry_fee_wei()?,
            data: self.config.function_selector.clone(),
            gas: None,
        };

        let estimate = match provider.estimate_gas(&tx).await {
            Ok(estimate) => estimate,
            Err(e) => {
                log::warn!(
                    "Gas estimation failed ({}), using fallback {}",
                    e,
                    self.config.fallback_gas
                );
                self.config.fallback_gas
            }
        };
        tx.gas = Some(self.config.gas_limit(estimate));
        log::debug!("Sending transaction: {}", tx.to_params());

        let tx_hash = provider
            .send_transaction(&tx)
            .await
            .map_err(GateError::from_send)?;

        let record = PaymentRecord {
            account: account.clone(),
            tx_hash,
            timestamp_ms: self.clock.now_millis(),
            amount: self.config.entry_fee.clone(),
        };
        self.status = GateStatus::Paid;
        self.payment = Some(record.clone());
        log::info!("Entry fee paid: {}", record.tx_hash);

        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(e) = self.store.set(&payment_key(&account), &json, false).await {
                    log::warn!("Storage save failed, but payment succeeded: {}", e);
                }
            }
            Err(e) => log::warn!("Failed to encode payment record: {}", e),
        }

        Ok(record)
    }
}
