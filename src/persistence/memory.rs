//! In-memory key-value store
//!
//! Used by tests and the headless demo. Keys can be marked as failing to
//! exercise the best-effort persistence paths.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{KeyValueStore, StoreError};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    indexed: bool,
}

#[derive(Debug, Default)]
struct Inner {
    values: BTreeMap<String, StoredValue>,
    /// Key prefixes whose reads and writes fail
    failing: Vec<String>,
    fail_list: bool,
}

impl Inner {
    fn check(&self, key: &str) -> Result<(), StoreError> {
        if self.failing.iter().any(|p| key.starts_with(p.as_str())) {
            return Err(StoreError::Unavailable(format!("injected failure for {key}")));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    /// Make every read and write of keys starting with `prefix` fail
    pub fn fail_keys(&self, prefix: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.push(prefix.to_string());
        }
    }

    /// Make `list` fail
    pub fn fail_listing(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_list = true;
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.lock()?;
        inner.check(key)?;
        Ok(inner.values.get(key).map(|v| v.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, indexed: bool) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.check(key)?;
        inner.values.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                indexed,
            },
        );
        Ok(())
    }

    async fn list(&self, prefix: &str, indexed: bool) -> Result<Vec<String>, StoreError> {
        let inner = self.lock()?;
        if inner.fail_list {
            return Err(StoreError::Unavailable("injected list failure".into()));
        }
        Ok(inner
            .values
            .iter()
            .filter(|(k, v)| k.starts_with(prefix) && (!indexed || v.indexed))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);
        store.set("a", "1", false).await.unwrap();
        store.set("a", "2", false).await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_list_respects_index_flag() {
        let store = MemoryStore::new();
        store.set("racer:0x1", "{}", true).await.unwrap();
        store.set("racer:0x2", "{}", false).await.unwrap();
        store.set("payment:0x1", "{}", false).await.unwrap();

        assert_eq!(store.list("racer:", true).await.unwrap(), vec!["racer:0x1"]);
        assert_eq!(store.list("racer:", false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryStore::new();
        store.fail_keys("payment:");
        assert!(store.set("payment:0x1", "{}", false).await.is_err());
        assert!(store.set("racer:0x1", "{}", true).await.is_ok());

        store.fail_listing();
        assert!(store.list("racer:", true).await.is_err());
    }
}
