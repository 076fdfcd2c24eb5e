//! In-memory key/value backend.
//!
//! Used for ephemeral sessions and tests. Size accounting counts key and
//! value bytes, the way browser local storage counts both against its quota.

use async_trait::async_trait;
use folio_core::{Error, KeyValueStore, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Map-backed key/value store with an optional byte quota.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total bytes of all keys and values.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Build a store pre-populated with `entries`, bypassing the quota.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            quota_bytes: None,
        }
    }

    /// Bytes currently used by all entries.
    pub fn used_bytes(&self) -> usize {
        self.lock().iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a consistent map: every write is a single insert.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock();
        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = used + key.len() + value.len();
            if needed > quota {
                return Err(Error::QuotaExceeded {
                    key: key.to_string(),
                    bytes: needed,
                    quota,
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_with_entries_and_keys() {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);
        let mut keys = store.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(store.used_bytes(), 4);
    }

    #[tokio::test]
    async fn test_quota_exceeded_leaves_value_unchanged() {
        let store = MemoryStore::new().with_quota(8);
        store.set("k", "1234").await.unwrap();

        let err = store.set("k", "123456789").await.unwrap_err();
        match err {
            Error::QuotaExceeded { key, bytes, quota } => {
                assert_eq!(key, "k");
                assert_eq!(bytes, 10);
                assert_eq!(quota, 8);
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("1234"));
    }
}
