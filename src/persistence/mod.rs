//! Key-value persistence capability
//!
//! The game never talks to a storage backend directly; it is handed a
//! `KeyValueStore` and treats every failure as non-fatal.
//!
//! Two namespaces exist per key space: private values, and `indexed` values
//! that are enumerable through `list(prefix, true)` (used for the shared
//! leaderboard).

pub mod file;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Best score, stored as a decimal integer string
pub const BEST_SCORE_KEY: &str = "racing-best-score";
/// Prefix for per-account payment records
pub const PAYMENT_PREFIX: &str = "payment:";
/// Prefix for per-account leaderboard entries (indexed)
pub const RACER_PREFIX: &str = "racer:";

pub fn payment_key(account: &str) -> String {
    format!("{PAYMENT_PREFIX}{account}")
}

pub fn racer_key(account: &str) -> String {
    format!("{RACER_PREFIX}{account}")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value from either namespace
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value; `indexed` values are enumerable via `list`
    async fn set(&self, key: &str, value: &str, indexed: bool) -> Result<(), StoreError>;

    /// Keys starting with `prefix`. With `indexed` only indexed keys are returned.
    async fn list(&self, prefix: &str, indexed: bool) -> Result<Vec<String>, StoreError>;
}
