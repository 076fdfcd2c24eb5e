//! PostgREST-backed remote project store.
//!
//! Talks to a Supabase-style `/rest/v1/{table}` endpoint. Every failure
//! (transport, timeout, non-2xx status, unparseable body) surfaces as
//! [`Error::RemoteUnavailable`], except an update that matches no row,
//! which is [`Error::NotFound`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::{debug, info, warn};

use folio_core::{Error, Project, ProjectPatch, RemoteProjectStore, Result};

use crate::config::RemoteConfig;
use crate::rows::{update_body, InsertRow, ProjectRow};

/// Remote project store over the PostgREST HTTP interface.
pub struct PostgrestStore {
    client: Client,
    config: RemoteConfig,
}

impl PostgrestStore {
    /// Create a store with the given configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "remote",
            component = "postgrest",
            remote_table = %config.table,
            "Initializing remote store: url={}",
            config.base_url
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables. `Ok(None)` when no remote is
    /// configured.
    pub fn from_env() -> Result<Option<Self>> {
        RemoteConfig::from_env().map(Self::new).transpose()
    }

    /// Get the current configuration.
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, self.config.table_url())
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Accept", "application/json")
    }

    async fn send(&self, op: &str, req: RequestBuilder) -> Result<Response> {
        let start = Instant::now();
        let response = req
            .send()
            .await
            .map_err(|e| Error::RemoteUnavailable(format!("{} request failed: {}", op, e)))?;

        let status = response.status();
        debug!(
            subsystem = "remote",
            component = "postgrest",
            op,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Remote responded"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteUnavailable(format!(
                "{} returned {}: {}",
                op,
                status,
                body.trim()
            )));
        }
        Ok(response)
    }

    async fn rows(&self, op: &str, response: Response) -> Result<Vec<Project>> {
        let rows: Vec<ProjectRow> = response
            .json()
            .await
            .map_err(|e| Error::RemoteUnavailable(format!("{} returned invalid body: {}", op, e)))?;

        let now = Utc::now();
        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            match row.into_project(now) {
                Ok(project) => projects.push(project),
                Err(e) => warn!(
                    subsystem = "remote",
                    component = "postgrest",
                    op,
                    error = %e,
                    "Skipping malformed remote row"
                ),
            }
        }
        Ok(projects)
    }
}

#[async_trait]
impl RemoteProjectStore for PostgrestStore {
    async fn list(&self) -> Result<Vec<Project>> {
        let req = self
            .request(Method::GET)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let response = self.send("list", req).await?;
        let projects = self.rows("list", response).await?;
        debug!(
            subsystem = "remote",
            op = "list",
            result_count = projects.len(),
            "Listed remote projects"
        );
        Ok(projects)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>> {
        let filter = format!("eq.{}", id);
        let req = self
            .request(Method::GET)
            .query(&[("select", "*"), ("id", filter.as_str())]);
        let response = self.send("get_by_id", req).await?;
        Ok(self.rows("get_by_id", response).await?.into_iter().next())
    }

    async fn insert(&self, project: &Project) -> Result<Project> {
        let req = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&InsertRow::from(project));
        let response = self.send("insert", req).await?;
        let created = self
            .rows("insert", response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::RemoteUnavailable("insert returned no rows".to_string()))?;
        info!(
            subsystem = "remote",
            op = "insert",
            project_id = %created.id,
            "Inserted remote project"
        );
        Ok(created)
    }

    async fn update(
        &self,
        id: &str,
        patch: &ProjectPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Project> {
        let filter = format!("eq.{}", id);
        let req = self
            .request(Method::PATCH)
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&update_body(patch, updated_at)?);
        let response = self.send("update", req).await?;
        self.rows("update", response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("remote project {}", id)))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let filter = format!("eq.{}", id);
        let req = self
            .request(Method::DELETE)
            .query(&[("id", filter.as_str())]);
        self.send("delete", req).await?;
        info!(subsystem = "remote", op = "delete", project_id = %id, "Deleted remote project");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = PostgrestStore::new(RemoteConfig::new("not-a-url", "k"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_new_accepts_valid_config() {
        let store = PostgrestStore::new(RemoteConfig::new("https://x.supabase.co", "k")).unwrap();
        assert_eq!(store.config().table, "projects");
    }
}
