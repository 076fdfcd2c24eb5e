//! In-memory remote store for deterministic testing.
//!
//! Behaves like the hosted table (assigns ids on insert, orders listings
//! newest first, reports `NotFound` for updates of unknown rows) and can be
//! told to fail any operation to exercise offline fallbacks.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use folio_remote::mock::{MockRemoteStore, RemoteOp};
//! use folio_core::RemoteProjectStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let remote = MockRemoteStore::new().fail_on(RemoteOp::List);
//!     assert!(remote.list().await.is_err());
//!     assert_eq!(remote.call_count(RemoteOp::List), 1);
//! }
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use folio_core::{Error, Project, ProjectPatch, RemoteProjectStore, Result};

/// Remote operations, for failure injection and call assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    List,
    Get,
    Insert,
    Update,
    Delete,
}

impl RemoteOp {
    pub const ALL: [RemoteOp; 5] = [
        RemoteOp::List,
        RemoteOp::Get,
        RemoteOp::Insert,
        RemoteOp::Update,
        RemoteOp::Delete,
    ];
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub op: RemoteOp,
    pub project_id: Option<String>,
}

#[derive(Debug, Default)]
struct MockState {
    rows: Vec<Project>,
    failing: HashSet<RemoteOp>,
    calls: Vec<MockCall>,
    next_id: u64,
}

/// Mock remote project store.
#[derive(Clone, Default)]
pub struct MockRemoteStore {
    state: Arc<Mutex<MockState>>,
}

impl MockRemoteStore {
    /// Create an empty, reachable remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table with existing rows.
    pub fn with_rows(self, rows: Vec<Project>) -> Self {
        self.state.lock().unwrap().rows = rows;
        self
    }

    /// Make `op` fail with `RemoteUnavailable`.
    pub fn fail_on(self, op: RemoteOp) -> Self {
        self.set_failing(op, true);
        self
    }

    /// A remote on which every operation fails.
    pub fn offline() -> Self {
        let remote = Self::new();
        remote.set_offline(true);
        remote
    }

    /// Toggle failure for a single operation.
    pub fn set_failing(&self, op: RemoteOp, failing: bool) {
        let mut state = self.state.lock().unwrap();
        if failing {
            state.failing.insert(op);
        } else {
            state.failing.remove(&op);
        }
    }

    /// Toggle failure for every operation.
    pub fn set_offline(&self, offline: bool) {
        for op in RemoteOp::ALL {
            self.set_failing(op, offline);
        }
    }

    /// Snapshot of the stored rows.
    pub fn rows(&self) -> Vec<Project> {
        self.state.lock().unwrap().rows.clone()
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls made for `op`.
    pub fn call_count(&self, op: RemoteOp) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .count()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear()
    }

    fn enter(&self, op: RemoteOp, project_id: Option<&str>) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall {
            op,
            project_id: project_id.map(str::to_string),
        });
        if state.failing.contains(&op) {
            return Err(Error::RemoteUnavailable(format!("mock remote {:?} failed", op)));
        }
        Ok(state)
    }
}

#[async_trait]
impl RemoteProjectStore for MockRemoteStore {
    async fn list(&self) -> Result<Vec<Project>> {
        let state = self.enter(RemoteOp::List, None)?;
        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>> {
        let state = self.enter(RemoteOp::Get, Some(id))?;
        Ok(state.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, project: &Project) -> Result<Project> {
        let mut state = self.enter(RemoteOp::Insert, Some(&project.id))?;
        let mut row = project.clone();
        if row.id.is_empty() {
            state.next_id += 1;
            row.id = state.next_id.to_string();
        } else if state.rows.iter().any(|p| p.id == row.id) {
            return Err(Error::RemoteUnavailable(format!(
                "duplicate key value violates unique constraint: id={}",
                row.id
            )));
        }
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: &str,
        patch: &ProjectPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Project> {
        let mut state = self.enter(RemoteOp::Update, Some(id))?;
        let row = state
            .rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("remote project {}", id)))?;
        *row = patch.apply(row);
        row.updated_at = updated_at;
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut state = self.enter(RemoteOp::Delete, Some(id))?;
        state.rows.retain(|p| p.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use folio_core::NewProject;

    fn project(id: &str, title: &str, created: DateTime<Utc>) -> Project {
        NewProject::titled(title).into_project(id.into(), created, None)
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let remote = MockRemoteStore::new();
        let a = remote.insert(&project("", "A", Utc::now())).await.unwrap();
        let b = remote.insert(&project("", "B", Utc::now())).await.unwrap();
        assert_eq!(a.id, "1");
        assert_eq!(b.id, "2");
        assert_eq!(remote.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let remote = MockRemoteStore::new().with_rows(vec![project("x", "X", Utc::now())]);
        let err = remote.insert(&project("x", "Y", Utc::now())).await.unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let now = Utc::now();
        let remote = MockRemoteStore::new().with_rows(vec![
            project("old", "Old", now - Duration::days(2)),
            project("new", "New", now),
        ]);
        let ids: Vec<_> = remote.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let remote = MockRemoteStore::new();
        let err = remote
            .update("missing", &ProjectPatch::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_applies_patch_and_stamp() {
        let created = Utc::now() - Duration::hours(1);
        let remote = MockRemoteStore::new().with_rows(vec![project("1", "A", created)]);
        let at = Utc::now();
        let patch = ProjectPatch {
            featured: Some(true),
            ..Default::default()
        };
        let updated = remote.update("1", &patch, at).await.unwrap();
        assert!(updated.featured);
        assert_eq!(updated.updated_at, at);
        assert_eq!(updated.created_at, created);
    }

    #[tokio::test]
    async fn test_failure_injection_and_call_log() {
        let remote = MockRemoteStore::offline();
        assert!(remote.list().await.is_err());
        assert!(remote.delete("1").await.is_err());
        assert_eq!(remote.call_count(RemoteOp::List), 1);
        assert_eq!(remote.get_calls()[1].project_id.as_deref(), Some("1"));

        remote.set_offline(false);
        assert!(remote.list().await.unwrap().is_empty());
        remote.clear_calls();
        assert!(remote.get_calls().is_empty());
    }
}
