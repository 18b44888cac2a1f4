//! In-process development wallet
//!
//! Auto-approves every request unless configured otherwise. Backs the
//! headless demo and the payment tests; it never touches a real chain.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{ChainDescriptor, PaymentProvider, ProviderError, TransactionRequest};

/// Gas the dev wallet reports for every call
pub const DEV_GAS_ESTIMATE: u64 = 21_000;

#[derive(Debug)]
struct DevState {
    chain_id: u64,
    known_chains: Vec<u64>,
    sent: Vec<TransactionRequest>,
    added: Vec<ChainDescriptor>,
    rng: Pcg32,
}

#[derive(Debug)]
pub struct DevWallet {
    accounts: Vec<String>,
    refuse_switch: bool,
    estimate_gas: bool,
    send_error: Option<ProviderError>,
    state: Mutex<DevState>,
}

impl DevWallet {
    /// Wallet holding `account`, currently on `chain_id`
    pub fn new(account: &str, chain_id: u64) -> Self {
        Self {
            accounts: vec![account.to_string()],
            refuse_switch: false,
            estimate_gas: true,
            send_error: None,
            state: Mutex::new(DevState {
                chain_id,
                known_chains: vec![chain_id],
                sent: Vec::new(),
                added: Vec::new(),
                rng: Pcg32::seed_from_u64(chain_id),
            }),
        }
    }

    pub fn with_known_chain(self, chain_id: u64) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.known_chains.push(chain_id);
        }
        self
    }

    pub fn with_no_accounts(mut self) -> Self {
        self.accounts.clear();
        self
    }

    /// User dismisses every chain switch prompt
    pub fn refusing_chain_switch(mut self) -> Self {
        self.refuse_switch = true;
        self
    }

    pub fn without_gas_estimates(mut self) -> Self {
        self.estimate_gas = false;
        self
    }

    /// User dismisses every transaction prompt
    pub fn rejecting_transactions(mut self) -> Self {
        self.send_error = Some(ProviderError::UserRejected);
        self
    }

    /// Transactions fail with a raw wallet error
    pub fn failing_transactions(mut self, code: i64, message: &str) -> Self {
        self.send_error = Some(ProviderError::from_code(code, message));
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, DevState>, ProviderError> {
        self.state.lock().map_err(|_| ProviderError::Rpc {
            code: -32603,
            message: "dev wallet state poisoned".into(),
        })
    }

    pub fn current_chain(&self) -> u64 {
        self.state.lock().map(|s| s.chain_id).unwrap_or_default()
    }

    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state.lock().map(|s| s.sent.clone()).unwrap_or_default()
    }

    pub fn added_chains(&self) -> Vec<ChainDescriptor> {
        self.state.lock().map(|s| s.added.clone()).unwrap_or_default()
    }
}

fn parse_hex_chain(chain_id: &str) -> Option<u64> {
    u64::from_str_radix(chain_id.trim_start_matches("0x"), 16).ok()
}

#[async_trait]
impl PaymentProvider for DevWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(self.lock()?.chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        if self.refuse_switch {
            return Err(ProviderError::UserRejected);
        }
        let mut state = self.lock()?;
        if !state.known_chains.contains(&chain_id) {
            return Err(ProviderError::UnsupportedChain);
        }
        state.chain_id = chain_id;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderError> {
        let id = parse_hex_chain(&chain.chain_id).ok_or_else(|| ProviderError::Rpc {
            code: -32602,
            message: format!("invalid chain id {}", chain.chain_id),
        })?;
        let mut state = self.lock()?;
        if !state.known_chains.contains(&id) {
            state.known_chains.push(id);
        }
        state.added.push(chain.clone());
        Ok(())
    }

    async fn estimate_gas(&self, _tx: &TransactionRequest) -> Result<u64, ProviderError> {
        if self.estimate_gas {
            Ok(DEV_GAS_ESTIMATE)
        } else {
            Err(ProviderError::Rpc {
                code: -32000,
                message: "execution reverted".into(),
            })
        }
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, ProviderError> {
        if let Some(err) = &self.send_error {
            return Err(err.clone());
        }
        let mut state = self.lock()?;
        let hash: String = (0..32)
            .map(|_| format!("{:02x}", state.rng.random::<u8>()))
            .collect();
        state.sent.push(tx.clone());
        Ok(format!("0x{hash}"))
    }
}
