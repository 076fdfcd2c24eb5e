//! Storage ports for folio.
//!
//! These traits define the interfaces the remote table adapter and the local
//! key/value backends implement. The coordinator only ever sees them through
//! these traits, so tests swap in in-memory implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Project, ProjectPatch};

// =============================================================================
// REMOTE STORE
// =============================================================================

/// A hosted table holding the project catalog.
///
/// Implementations report three distinguishable outcomes: a configured store
/// with no rows returns `Ok(vec![])` from [`list`](Self::list), an
/// unconfigured store returns [`Error::NotConfigured`](crate::Error::NotConfigured),
/// and any failed request returns
/// [`Error::RemoteUnavailable`](crate::Error::RemoteUnavailable).
#[async_trait]
pub trait RemoteProjectStore: Send + Sync {
    /// All rows, newest `created_at` first.
    async fn list(&self) -> Result<Vec<Project>>;

    /// Fetch one row by id.
    async fn get_by_id(&self, id: &str) -> Result<Option<Project>>;

    /// Insert a row and return it as stored remotely.
    ///
    /// An empty `project.id` lets the remote assign the id. The remote may
    /// also rewrite timestamps.
    async fn insert(&self, project: &Project) -> Result<Project>;

    /// Apply a partial update and return the updated row.
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) when no row matched.
    async fn update(
        &self,
        id: &str,
        patch: &ProjectPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Project>;

    /// Delete a row. Deleting a missing id succeeds.
    async fn delete(&self, id: &str) -> Result<()>;
}

// =============================================================================
// LOCAL KEY/VALUE STORE
// =============================================================================

/// String key/value storage with whole-value writes, modelled on browser
/// local storage.
///
/// `set` either stores the full value or fails without changing the key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`.
    ///
    /// Fails with [`Error::QuotaExceeded`](crate::Error::QuotaExceeded) when
    /// the store's size limit would be exceeded.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Every key currently stored, in no particular order.
    async fn keys(&self) -> Result<Vec<String>>;
}
