//! Game and chain configuration
//!
//! Loaded from an optional JSON file; any field left out keeps its default.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::TICK_INTERVAL_MS;

/// Decimals of the chain's native currency
pub const NATIVE_DECIMALS: u32 = 18;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Chain ===
    /// Required chain id (decimal)
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_url: String,
    pub block_explorer: String,
    /// Native currency symbol
    pub currency: String,

    // === Entry fee ===
    /// Fee in whole currency units, as a decimal string ("0.001")
    pub entry_fee: String,
    /// Recipient contract
    pub contract_address: String,
    /// 4-byte selector of the pay-to-play function
    pub function_selector: String,
    /// Gas limit used when estimation fails
    pub fallback_gas: u64,
    /// Safety margin added on top of the gas estimate (percent)
    pub gas_margin_percent: u64,

    // === Simulation ===
    pub tick_interval_ms: u64,
    /// RNG seed; random when unset
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            chain_id: 4221,
            chain_name: "GenLayer Asimov Testnet".to_string(),
            rpc_url: "https://genlayer-testnet.rpc.caldera.xyz/http".to_string(),
            block_explorer: "https://genlayer-testnet.explorer.caldera.xyz".to_string(),
            currency: "GEN".to_string(),

            entry_fee: "0.001".to_string(),
            contract_address: "0x78B212F2081468aFEE03F6c7f0b32f8E1aA12aFC".to_string(),
            function_selector: "0x149c4bca".to_string(),
            fallback_gas: 100_000,
            gas_margin_percent: 20,

            tick_interval_ms: TICK_INTERVAL_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load from a JSON file, or defaults when no path is given or the file is missing
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            log::info!("Using default config");
            return Ok(Self::default());
        };
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        // Fail early on a bad fee rather than at payment time
        config.entry_fee_wei()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }

    /// Chain id as the `0x`-prefixed hex string wallets expect
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Entry fee in the smallest currency unit
    pub fn entry_fee_wei(&self) -> Result<u128, ConfigError> {
        parse_units(&self.entry_fee, NATIVE_DECIMALS)
    }

    /// Gas limit with the safety margin applied (rounded down)
    pub fn gas_limit(&self, estimate: u64) -> u64 {
        let limit = u128::from(estimate) * u128::from(100 + self.gas_margin_percent) / 100;
        u64::try_from(limit).unwrap_or(u64::MAX)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Parse a decimal amount ("0.001") into integer units with `decimals` places
pub fn parse_units(amount: &str, decimals: u32) -> Result<u128, ConfigError> {
    let invalid = || ConfigError::InvalidAmount(amount.to_string());
    let amount = amount.trim();
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > decimals as usize {
        return Err(invalid());
    }

    let scale = 10u128.checked_pow(decimals).ok_or_else(invalid)?;
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac_units: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        padded.parse().map_err(|_| invalid())?
    };

    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fee_in_wei() {
        let config = GameConfig::default();
        assert_eq!(config.entry_fee_wei().unwrap(), 1_000_000_000_000_000);
        assert_eq!(config.chain_id_hex(), "0x107d");
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1", 18).unwrap(), 10u128.pow(18));
        assert_eq!(parse_units("2.5", 3).unwrap(), 2_500);
        assert_eq!(parse_units(".5", 1).unwrap(), 5);
        assert!(parse_units("", 18).is_err());
        assert!(parse_units("1.2.3", 18).is_err());
        assert!(parse_units("-1", 18).is_err());
        assert!(parse_units("0.0001", 3).is_err());
    }

    #[test]
    fn test_gas_limit_margin() {
        let config = GameConfig::default();
        assert_eq!(config.gas_limit(100_000), 120_000);
        assert_eq!(config.gas_limit(21_001), 25_201);
        assert_eq!(config.gas_limit(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("racer.json");
        fs::write(&path, r#"{ "entry_fee": "0.5", "seed": 7 }"#).unwrap();

        let config = GameConfig::load(Some(&path)).unwrap();
        assert_eq!(config.entry_fee_wei().unwrap(), 5 * 10u128.pow(17));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.chain_id, 4221);
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_bad_fee_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("racer.json");
        fs::write(&path, r#"{ "entry_fee": "lots" }"#).unwrap();
        assert!(matches!(
            GameConfig::load(Some(&path)),
            Err(ConfigError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("racer.json");
        let mut config = GameConfig::default();
        config.seed = Some(99);
        config.save(&path).unwrap();
        assert_eq!(GameConfig::load(Some(&path)).unwrap(), config);
        assert_eq!(GameConfig::load(None).unwrap(), GameConfig::default());
    }
}
