//! Filesystem key/value backend.
//!
//! Each key is stored as `{base_path}/{key}.json`. Writes go to a temp file
//! that is renamed into place, so a failed write leaves the previous value
//! intact.

use async_trait::async_trait;
use folio_core::{Error, KeyValueStore, Result};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const VALUE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// Directory-backed key/value store with an optional byte quota.
pub struct FilesystemStore {
    base_path: PathBuf,
    quota_bytes: Option<usize>,
}

impl FilesystemStore {
    /// Create a store rooted at `base_path`. The directory is created on
    /// first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            quota_bytes: None,
        }
    }

    /// Limit the total bytes of all stored values.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    fn value_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self
            .base_path
            .join(format!("{}.{}", key, VALUE_EXTENSION)))
    }

    /// Total bytes stored under every key except `skip`.
    async fn used_bytes_excluding(&self, skip: &str) -> Result<usize> {
        let mut total = 0usize;
        for key in self.keys().await? {
            if key == skip {
                continue;
            }
            let meta = fs::metadata(self.value_path(&key)?).await?;
            total += meta.len() as usize;
        }
        Ok(total)
    }
}

fn validate_key(key: &str) -> Result<()> {
    let ok = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid storage key: {:?}", key)))
    }
}

#[async_trait]
impl KeyValueStore for FilesystemStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.value_path(key)?;

        if let Some(quota) = self.quota_bytes {
            let used = self.used_bytes_excluding(key).await?;
            if used + value.len() > quota {
                return Err(Error::QuotaExceeded {
                    key: key.to_string(),
                    bytes: used + value.len(),
                    quota,
                });
            }
        }

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            warn!(base_path = %self.base_path.display(), error = %e, "fs_store: create_dir_all failed");
            e
        })?;

        let temp_path = path.with_extension(TEMP_EXTENSION);
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "fs_store: File::create failed");
            e
        })?;
        if let Err(e) = file.write_all(value.as_bytes()).await {
            warn!(error = %e, "fs_store: write_all failed");
            drop(file);
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %path.display(), error = %e, "fs_store: rename failed");
            e
        })?;

        debug!(store_key = %key, bytes = value.len(), "fs_store: wrote value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}
