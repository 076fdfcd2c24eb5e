//! Unified sync coordinator.
//!
//! Presents one project collection built from the remote table and the
//! local cache. Reads prefer the remote but never let an empty or failing
//! remote hide local content; writes go to the remote when it answers and
//! always land locally. Remote failures are logged and absorbed.
//!
//! Concurrent writers are not coordinated: each write rewrites the whole
//! local collection, last writer wins.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use folio_core::{
    local_project_id, Error, EventBus, NewProject, Project, ProjectAction, ProjectPatch,
    RemoteProjectStore, Result,
};
use folio_store::{LocalCacheStore, RecoveryConfig, RecoveryReport, RecoveryScan};

/// Where a unified read got its records from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    /// Remote rows, with local-only records appended.
    Merged,
    /// Local recovery only: remote unconfigured, failing, or empty.
    Local,
}

impl ReadSource {
    fn as_str(self) -> &'static str {
        match self {
            ReadSource::Merged => "merged",
            ReadSource::Local => "local",
        }
    }
}

/// Coordinates the remote store, the local cache and the event bus.
pub struct ProjectCoordinator {
    remote: Option<Arc<dyn RemoteProjectStore>>,
    cache: LocalCacheStore,
    bus: Arc<EventBus>,
    recovery: RecoveryScan,
    owner: Option<String>,
}

impl ProjectCoordinator {
    /// Create a coordinator. `remote: None` runs on local storage alone.
    pub fn new(
        remote: Option<Arc<dyn RemoteProjectStore>>,
        cache: LocalCacheStore,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            remote,
            cache,
            bus,
            recovery: RecoveryScan::default(),
            owner: None,
        }
    }

    /// Use a non-default recovery configuration.
    pub fn with_recovery(mut self, config: RecoveryConfig) -> Self {
        self.recovery = RecoveryScan::new(config);
        self
    }

    /// Owner id stamped on created projects.
    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub fn cache(&self) -> &LocalCacheStore {
        &self.cache
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Run the local recovery scan on its own.
    pub async fn recover(&self) -> RecoveryReport {
        self.recovery.scan(&self.cache).await
    }

    // ─── Reads ─────────────────────────────────────────────────────────────

    /// The unified collection. Never empty.
    pub async fn get_all_projects(&self) -> Vec<Project> {
        self.read_unified().await.0
    }

    pub async fn get_project_by_id(&self, id: &str) -> Option<Project> {
        self.get_all_projects()
            .await
            .into_iter()
            .find(|p| p.id == id)
    }

    pub async fn get_project_by_slug(&self, slug: &str) -> Option<Project> {
        self.get_all_projects()
            .await
            .into_iter()
            .find(|p| p.effective_slug() == slug)
    }

    pub async fn get_featured_projects(&self) -> Vec<Project> {
        self.get_all_projects()
            .await
            .into_iter()
            .filter(|p| p.featured)
            .collect()
    }

    /// The unified collection and where it came from.
    pub async fn read_unified(&self) -> (Vec<Project>, ReadSource) {
        let start = Instant::now();
        let recovered = self.recover().await.projects;

        let Some(remote) = &self.remote else {
            debug!(subsystem = "sync", op = "get_all", "Remote not configured, using local");
            return self.finish_read(recovered, ReadSource::Local, start);
        };

        let rows = match remote.list().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    subsystem = "sync",
                    component = "coordinator",
                    op = "get_all",
                    error = %e,
                    "Remote list failed, using local"
                );
                return self.finish_read(recovered, ReadSource::Local, start);
            }
        };

        if rows.is_empty() {
            debug!(subsystem = "sync", op = "get_all", "Remote empty, using local");
            return self.finish_read(recovered, ReadSource::Local, start);
        }

        let merged = merge_remote_first(rows, recovered);
        if let Err(e) = self.cache.persist(&merged).await {
            warn!(
                subsystem = "sync",
                op = "get_all",
                error = %e,
                "Failed to cache merged collection"
            );
        }
        self.finish_read(merged, ReadSource::Merged, start)
    }

    fn finish_read(
        &self,
        projects: Vec<Project>,
        source: ReadSource,
        start: Instant,
    ) -> (Vec<Project>, ReadSource) {
        debug!(
            subsystem = "sync",
            component = "coordinator",
            op = "get_all",
            source = source.as_str(),
            result_count = projects.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Unified read complete"
        );
        (projects, source)
    }

    // ─── Writes ────────────────────────────────────────────────────────────

    /// Create a project.
    ///
    /// Inserted remotely when possible; otherwise stored locally under a
    /// generated id (or the caller's id). Fails on an invalid title, on a
    /// caller id that already exists, or when the collection no longer fits
    /// in local storage.
    pub async fn create_project(&self, request: NewProject) -> Result<Project> {
        request.validate()?;

        let caller_id = request.id.clone().filter(|id| !id.trim().is_empty());
        let mut collection = self.get_all_projects().await;
        if let Some(id) = &caller_id {
            if collection.iter().any(|p| &p.id == id) {
                return Err(Error::InvalidInput(format!("project id already exists: {id}")));
            }
        }

        let now = Utc::now();
        let draft = request.into_project(
            caller_id.clone().unwrap_or_default(),
            now,
            self.owner.clone(),
        );

        let project = match self.insert_remote(&draft).await {
            Some(created) => created,
            None => Project {
                id: caller_id.unwrap_or_else(local_project_id),
                ..draft
            },
        };

        match collection.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => collection.push(project.clone()),
        }
        self.save(&collection, "create").await?;

        self.publish(ProjectAction::Created, &project);
        info!(
            subsystem = "sync",
            op = "create",
            project_id = %project.id,
            "Project created"
        );
        Ok(project)
    }

    async fn insert_remote(&self, draft: &Project) -> Option<Project> {
        let remote = self.remote.as_ref()?;
        match remote.insert(draft).await {
            Ok(created) => Some(created),
            Err(e) => {
                warn!(
                    subsystem = "sync",
                    component = "coordinator",
                    op = "create",
                    error = %e,
                    "Remote insert failed, storing locally"
                );
                None
            }
        }
    }

    /// Apply `patch` to the project with `id`.
    ///
    /// `Ok(None)` when no such project exists; nothing is written then.
    pub async fn update_project(&self, id: &str, patch: ProjectPatch) -> Result<Option<Project>> {
        patch.validate()?;

        let mut collection = self.get_all_projects().await;
        let Some(slot) = collection.iter_mut().find(|p| p.id == id) else {
            debug!(subsystem = "sync", op = "update", project_id = %id, "Project not found");
            return Ok(None);
        };

        let mut updated = patch.apply(slot);
        updated.updated_at = Utc::now().max(slot.updated_at);

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.update(id, &patch, updated.updated_at).await {
                warn!(
                    subsystem = "sync",
                    op = "update",
                    project_id = %id,
                    error = %e,
                    "Remote update failed, keeping local change"
                );
            }
        }

        *slot = updated.clone();
        self.save(&collection, "update").await?;

        self.publish(ProjectAction::Updated, &updated);
        info!(subsystem = "sync", op = "update", project_id = %id, "Project updated");
        Ok(Some(updated))
    }

    /// Delete the project with `id`.
    ///
    /// Returns `Ok(true)` when the project was found in the unified
    /// collection and removed locally, even if the remote delete failed.
    pub async fn delete_project(&self, id: &str) -> Result<bool> {
        let mut collection = self.get_all_projects().await;
        let Some(index) = collection.iter().position(|p| p.id == id) else {
            debug!(subsystem = "sync", op = "delete", project_id = %id, "Project not found");
            return Ok(false);
        };

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.delete(id).await {
                warn!(
                    subsystem = "sync",
                    op = "delete",
                    project_id = %id,
                    error = %e,
                    "Remote delete failed, deleting locally"
                );
            }
        }

        let removed = collection.remove(index);
        self.save(&collection, "delete").await?;

        self.publish(ProjectAction::Deleted, &removed);
        info!(subsystem = "sync", op = "delete", project_id = %id, "Project deleted");
        Ok(true)
    }

    /// Persist the collection. Quota exhaustion is returned to the caller;
    /// any other storage failure is logged.
    async fn save(&self, collection: &[Project], op: &'static str) -> Result<()> {
        match self.cache.persist(collection).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_quota() => {
                error!(subsystem = "sync", op, error = %e, "Local storage full");
                Err(e)
            }
            Err(e) => {
                error!(subsystem = "sync", op, error = %e, "Local persist failed");
                Ok(())
            }
        }
    }

    fn publish(&self, action: ProjectAction, project: &Project) {
        self.bus.publish(
            action,
            project.id.clone(),
            project.image_url.clone().unwrap_or_default(),
        );
    }
}

/// Remote rows first, then recovered records whose id the remote lacks.
fn merge_remote_first(rows: Vec<Project>, recovered: Vec<Project>) -> Vec<Project> {
    let mut merged = rows;
    for project in recovered {
        if !merged.iter().any(|p| p.id == project.id) {
            merged.push(project);
        }
    }
    merged
}
