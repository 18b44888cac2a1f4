//! JSON file backed key-value store
//!
//! Features:
//! - Single JSON document holding the private and indexed namespaces
//! - Write-through with tmp file + rename so a crash never leaves a torn file
//! - Corrupt files are reported, not silently discarded

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{KeyValueStore, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    private: BTreeMap<String, String>,
    #[serde(default)]
    indexed: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: Mutex<Document>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let doc = if path.exists() {
            let json = fs::read_to_string(&path)?;
            let doc: Document = serde_json::from_str(&json)?;
            log::info!(
                "Opened store {} ({} keys)",
                path.display(),
                doc.private.len() + doc.indexed.len()
            );
            doc
        } else {
            log::info!("No store at {}, starting fresh", path.display());
            Document::default()
        };
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Document>, StoreError> {
        self.doc
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".into()))
    }

    fn flush(&self, doc: &Document) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(doc)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let doc = self.lock()?;
        Ok(doc
            .indexed
            .get(key)
            .or_else(|| doc.private.get(key))
            .cloned())
    }

    async fn set(&self, key: &str, value: &str, indexed: bool) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let doc = &mut *guard;
        let (target, other) = if indexed {
            (&mut doc.indexed, &mut doc.private)
        } else {
            (&mut doc.private, &mut doc.indexed)
        };
        other.remove(key);
        target.insert(key.to_string(), value.to_string());
        self.flush(doc)
    }

    async fn list(&self, prefix: &str, indexed: bool) -> Result<Vec<String>, StoreError> {
        let doc = self.lock()?;
        let mut keys: Vec<String> = doc
            .indexed
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        if !indexed {
            keys.extend(doc.private.keys().filter(|k| k.starts_with(prefix)).cloned());
            keys.sort();
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("racing-best-score", "150", false).await.unwrap();
        store.set("racer:0xabc", "{\"score\":1}", true).await.unwrap();
        drop(store);

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            store.get("racing-best-score").await.unwrap().as_deref(),
            Some("150")
        );
        assert_eq!(store.list("racer:", true).await.unwrap(), vec!["racer:0xabc"]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_reindexing_moves_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("s.json")).unwrap();
        store.set("racer:0x1", "a", false).await.unwrap();
        assert!(store.list("racer:", true).await.unwrap().is_empty());
        store.set("racer:0x1", "b", true).await.unwrap();
        assert_eq!(store.list("racer:", false).await.unwrap(), vec!["racer:0x1"]);
        assert_eq!(store.get("racer:0x1").await.unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Json(_))
        ));
    }
}
