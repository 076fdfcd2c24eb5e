//! Local cache store for the project collection.
//!
//! The whole collection lives in one JSON array under the primary key and a
//! mirror under the backup key. Every save rewrites the entire blob; there
//! are no incremental writes. Alongside the primary blob the store keeps a
//! ledger of the ids it last persisted, which recovery uses to tell records
//! written here apart from stray entries.

use folio_core::defaults::{BACKUP_KEY, LEDGER_KEY, MAX_INLINE_IMAGE_LEN, PRIMARY_KEY};
use folio_core::{KeyValueStore, Project, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How faithfully [`LocalCacheStore::persist`] stored the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fidelity {
    /// Stored exactly as given.
    Full,
    /// Stored after embedded image payloads were stripped to fit the quota.
    ImagesStripped,
}

/// Whole-collection cache over a [`KeyValueStore`].
#[derive(Clone)]
pub struct LocalCacheStore {
    store: Arc<dyn KeyValueStore>,
    primary_key: String,
    backup_key: String,
    ledger_key: String,
}

impl LocalCacheStore {
    /// Cache using the default primary, backup and ledger keys.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_keys(store, PRIMARY_KEY, BACKUP_KEY, LEDGER_KEY)
    }

    pub fn with_keys(
        store: Arc<dyn KeyValueStore>,
        primary_key: impl Into<String>,
        backup_key: impl Into<String>,
        ledger_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            primary_key: primary_key.into(),
            backup_key: backup_key.into(),
            ledger_key: ledger_key.into(),
        }
    }

    /// The underlying key/value backend.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn backup_key(&self) -> &str {
        &self.backup_key
    }

    pub fn ledger_key(&self) -> &str {
        &self.ledger_key
    }

    /// Replace the primary blob with `projects`.
    pub async fn save(&self, projects: &[Project]) -> Result<()> {
        self.save_to(&self.primary_key, projects).await
    }

    /// Read the primary blob. Absent or malformed blobs read as empty.
    pub async fn load(&self) -> Vec<Project> {
        self.load_from(&self.primary_key).await
    }

    /// Replace the backup blob with `projects`.
    pub async fn save_backup(&self, projects: &[Project]) -> Result<()> {
        self.save_to(&self.backup_key, projects).await
    }

    /// Read the backup blob. Absent or malformed blobs read as empty.
    pub async fn load_backup(&self) -> Vec<Project> {
        self.load_from(&self.backup_key).await
    }

    /// Ids of the collection last written by [`persist`](Self::persist).
    pub async fn load_ledger(&self) -> HashSet<String> {
        match self.store.get(&self.ledger_key).await {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw)
                .map(|ids| ids.into_iter().collect())
                .unwrap_or_else(|e| {
                    warn!(store_key = %self.ledger_key, error = %e, "Malformed id ledger ignored");
                    HashSet::new()
                }),
            Ok(None) => HashSet::new(),
            Err(e) => {
                warn!(store_key = %self.ledger_key, error = %e, "Failed to read id ledger");
                HashSet::new()
            }
        }
    }

    /// Save `projects` to the primary key, then mirror to the backup key and
    /// record their ids in the ledger.
    ///
    /// When the primary write hits the storage quota, retries once with
    /// embedded images stripped. If that also fails the quota error is
    /// returned and nothing was written. Backup and ledger failures are
    /// logged only.
    pub async fn persist(&self, projects: &[Project]) -> Result<Fidelity> {
        let (fidelity, stored) = match self.save(projects).await {
            Ok(()) => (Fidelity::Full, None),
            Err(e) if e.is_quota() => {
                warn!(
                    store_key = %self.primary_key,
                    error = %e,
                    result_count = projects.len(),
                    "Storage quota exceeded, retrying without embedded images"
                );
                let reduced: Vec<Project> = projects
                    .iter()
                    .map(|p| p.without_embedded_images(MAX_INLINE_IMAGE_LEN))
                    .collect();
                if let Err(e) = self.save(&reduced).await {
                    error!(store_key = %self.primary_key, error = %e, "Reduced save failed");
                    return Err(e);
                }
                (Fidelity::ImagesStripped, Some(reduced))
            }
            Err(e) => return Err(e),
        };
        let stored = stored.as_deref().unwrap_or(projects);

        if let Err(e) = self.save_backup(stored).await {
            warn!(store_key = %self.backup_key, error = %e, "Backup save failed");
        }
        self.save_ledger(stored).await;

        info!(
            result_count = stored.len(),
            fidelity = ?fidelity,
            "Persisted project collection"
        );
        Ok(fidelity)
    }

    async fn save_to(&self, key: &str, projects: &[Project]) -> Result<()> {
        let blob = serde_json::to_string(projects)?;
        debug!(store_key = %key, bytes = blob.len(), result_count = projects.len(), "Saving collection");
        self.store.set(key, &blob).await
    }

    async fn load_from(&self, key: &str) -> Vec<Project> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(store_key = %key, error = %e, "Failed to read collection");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Project>>(&raw) {
            Ok(projects) => projects,
            Err(e) => {
                warn!(store_key = %key, error = %e, "Malformed collection ignored");
                Vec::new()
            }
        }
    }

    async fn save_ledger(&self, projects: &[Project]) {
        let ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
        let result = match serde_json::to_string(&ids) {
            Ok(blob) => self.store.set(&self.ledger_key, &blob).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!(store_key = %self.ledger_key, error = %e, "Id ledger save failed");
        }
    }
}
