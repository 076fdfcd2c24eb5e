//! Data recovery scan for the local project catalog.
//!
//! Local storage has accumulated several historical schemas plus stray
//! test and debug entries. Recovery keeps a single corrupted or stale key
//! from erasing real content:
//!
//! 1. Read candidate keys in a fixed order: primary, backup, the enumerated
//!    legacy keys, and (opt-in) any other key whose name looks
//!    project-related. Legacy and pattern keys are read only until the
//!    cache has written its id ledger, or when primary and backup are empty.
//! 2. From every blob that is a JSON array, keep titled records that are
//!    trusted: title on the known-good list, or id in the cache's ledger.
//!    Records without an id get `{key}:{slug}`, stable across scans.
//! 3. Merge by id, first seen wins.
//! 4. Fall back to the seed dataset when nothing survives.
//! 5. Persist the result to the primary and backup keys.
//!
//! Running the scan twice over unchanged storage yields the same records.

use folio_core::defaults::{
    KNOWN_GOOD_TITLES, LEGACY_KEYS, MAX_INLINE_IMAGE_LEN, PATTERN_KEY_MARKERS,
};
use folio_core::{slugify, Project};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use tracing::{debug, error, info, trace, warn};

use crate::cache::{Fidelity, LocalCacheStore};
use crate::seed::seed_projects;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which keys to scan and which records to trust.
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Titles accepted from any key. Compared after trimming, case-sensitive.
    /// Empty means every titled record is accepted.
    pub known_titles: Vec<String>,
    /// Legacy keys scanned after the primary and backup keys, in order.
    pub legacy_keys: Vec<String>,
    /// Also scan other keys containing a project-related marker.
    pub scan_pattern_keys: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            known_titles: KNOWN_GOOD_TITLES.iter().map(|s| s.to_string()).collect(),
            legacy_keys: LEGACY_KEYS.iter().map(|s| s.to_string()).collect(),
            scan_pattern_keys: false,
        }
    }
}

impl RecoveryConfig {
    /// Accept every titled record regardless of title.
    pub fn accept_all_titles(mut self) -> Self {
        self.known_titles.clear();
        self
    }

    pub fn with_pattern_scan(mut self, enabled: bool) -> Self {
        self.scan_pattern_keys = enabled;
        self
    }
}

/// What one scanned key contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverySource {
    pub key: String,
    /// Titled records found in the blob.
    pub candidates: usize,
    /// Records newly added to the result from this key.
    pub kept: usize,
}

/// Outcome of a recovery scan.
#[derive(Debug, Clone)]
pub struct RecoveryReport {
    /// Recovered collection; never empty.
    pub projects: Vec<Project>,
    /// Keys that held a project array, in scan order.
    pub sources: Vec<RecoverySource>,
    /// True when nothing survived and the seed dataset was used.
    pub seeded: bool,
    /// False when writing the result back to local storage failed.
    pub persisted: bool,
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Rebuilds the catalog from every known local key.
#[derive(Debug, Clone, Default)]
pub struct RecoveryScan {
    config: RecoveryConfig,
}

impl RecoveryScan {
    pub fn new(config: RecoveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Run the scan against `cache` and persist its result.
    pub async fn scan(&self, cache: &LocalCacheStore) -> RecoveryReport {
        let ledger = cache.load_ledger().await;
        let mut merged = Merged::default();

        for key in [cache.primary_key(), cache.backup_key()] {
            self.scan_key(cache, key, &ledger, &mut merged).await;
        }

        // Legacy keys are consumed by the first consolidation. After that
        // they are only consulted when the current keys hold nothing.
        if ledger.is_empty() || merged.projects.is_empty() {
            for key in self.fallback_keys(cache).await {
                self.scan_key(cache, &key, &ledger, &mut merged).await;
            }
        } else {
            debug!("Ledger present, skipping legacy keys");
        }

        let Merged {
            mut projects,
            sources,
            ..
        } = merged;

        let seeded = projects.is_empty();
        if seeded {
            info!("No recoverable projects found, using seed dataset");
            projects = seed_projects();
        }

        let persisted = match cache.persist(&projects).await {
            Ok(Fidelity::Full) => true,
            Ok(Fidelity::ImagesStripped) => {
                // Report what storage now holds.
                projects = projects
                    .iter()
                    .map(|p| p.without_embedded_images(MAX_INLINE_IMAGE_LEN))
                    .collect();
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to persist recovered collection");
                false
            }
        };

        info!(
            result_count = projects.len(),
            sources = sources.len(),
            seeded,
            "Recovery scan complete"
        );

        RecoveryReport {
            projects,
            sources,
            seeded,
            persisted,
        }
    }

    async fn scan_key(
        &self,
        cache: &LocalCacheStore,
        key: &str,
        ledger: &HashSet<String>,
        merged: &mut Merged,
    ) {
        if merged.scanned.contains(key) {
            return;
        }
        merged.scanned.insert(key.to_string());

        let raw = match cache.store().get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!(store_key = %key, error = %e, "Recovery could not read key");
                return;
            }
        };
        let Some(items) = parse_array(key, &raw) else {
            return;
        };

        let mut source = RecoverySource {
            key: key.to_string(),
            candidates: 0,
            kept: 0,
        };
        for mut item in items {
            let Some(title) = item.get("title").and_then(JsonValue::as_str) else {
                continue;
            };
            let title = title.to_string();
            source.candidates += 1;

            let id = match item.get("id").and_then(id_string) {
                Some(id) => id,
                None => {
                    let id = format!("{key}:{}", slugify(&title));
                    item["id"] = JsonValue::String(id.clone());
                    id
                }
            };
            if !self.is_trusted(&title, Some(&id), ledger) {
                trace!(store_key = %key, title = %title, "Dropping untrusted record");
                continue;
            }
            match serde_json::from_value::<Project>(item) {
                Ok(project) if merged.seen.insert(project.id.clone()) => {
                    trace!(store_key = %key, project_id = %project.id, "Recovered record");
                    source.kept += 1;
                    merged.projects.push(project);
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(store_key = %key, title = %title, error = %e, "Skipping unreadable record");
                }
            }
        }
        merged.sources.push(source);
    }

    fn is_trusted(&self, title: &str, id: Option<&str>, ledger: &HashSet<String>) -> bool {
        if self.config.known_titles.is_empty() {
            return true;
        }
        let title = title.trim();
        self.config.known_titles.iter().any(|t| t == title)
            || id.is_some_and(|id| ledger.contains(id))
    }

    /// Legacy keys in order, then pattern-matched keys (sorted).
    async fn fallback_keys(&self, cache: &LocalCacheStore) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for key in &self.config.legacy_keys {
            push_unique(&mut keys, key);
        }

        if self.config.scan_pattern_keys {
            match cache.store().keys().await {
                Ok(mut all) => {
                    all.sort();
                    for key in all {
                        let lowered = key.to_lowercase();
                        let marked = PATTERN_KEY_MARKERS.iter().any(|m| lowered.contains(m));
                        if marked && key != cache.ledger_key() {
                            push_unique(&mut keys, &key);
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Recovery could not enumerate keys"),
            }
        }

        debug!(keys = ?keys, "Recovery fallback keys");
        keys
    }
}

/// Accumulator for one scan.
#[derive(Default)]
struct Merged {
    projects: Vec<Project>,
    seen: HashSet<String>,
    sources: Vec<RecoverySource>,
    scanned: HashSet<String>,
}

fn push_unique(keys: &mut Vec<String>, key: &str) {
    if !keys.iter().any(|k| k == key) {
        keys.push(key.to_string());
    }
}

fn parse_array(key: &str, raw: &str) -> Option<Vec<JsonValue>> {
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(JsonValue::Array(items)) => Some(items),
        Ok(_) => {
            debug!(store_key = %key, "Key does not hold an array");
            None
        }
        Err(e) => {
            warn!(store_key = %key, error = %e, "Key holds malformed JSON");
            None
        }
    }
}

fn id_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use folio_core::defaults::{BACKUP_KEY, PRIMARY_KEY};
    use folio_core::KeyValueStore;
    use serde_json::json;
    use std::sync::Arc;

    fn cache_with(entries: Vec<(&str, String)>) -> (Arc<MemoryStore>, LocalCacheStore) {
        let store = Arc::new(MemoryStore::with_entries(entries));
        (store.clone(), LocalCacheStore::new(store))
    }

    fn titles(report: &RecoveryReport) -> Vec<&str> {
        report.projects.iter().map(|p| p.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_filters_untrusted_titles() {
        let blob = json!([
            {"id": "1", "title": "WOOD-ID"},
            {"id": "2", "title": "Untitled Test"}
        ]);
        let (_, cache) = cache_with(vec![(PRIMARY_KEY, blob.to_string())]);

        let report = RecoveryScan::default().scan(&cache).await;

        assert_eq!(titles(&report), vec!["WOOD-ID"]);
        assert!(!report.seeded);
        assert_eq!(
            report.sources,
            vec![RecoverySource {
                key: PRIMARY_KEY.to_string(),
                candidates: 2,
                kept: 1
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_storage_seeds() {
        let (_, cache) = cache_with(vec![]);
        let report = RecoveryScan::default().scan(&cache).await;
        assert!(report.seeded);
        assert_eq!(report.projects, seed_projects());
        assert!(report.persisted);
        assert_eq!(cache.load().await, seed_projects());
    }

    #[tokio::test]
    async fn test_first_seen_wins_across_keys() {
        let primary = json!([{"id": "1", "title": "WOOD-ID", "description": "primary"}]);
        let legacy = json!([
            {"id": "1", "title": "WOOD-ID", "description": "legacy"},
            {"id": 9, "title": "Land Registry Ledger"}
        ]);
        let (_, cache) = cache_with(vec![
            (PRIMARY_KEY, primary.to_string()),
            ("portfolioProjects", legacy.to_string()),
        ]);

        let report = RecoveryScan::default().scan(&cache).await;

        assert_eq!(report.projects.len(), 2);
        assert_eq!(report.projects[0].description.as_deref(), Some("primary"));
        assert_eq!(report.projects[1].id, "9");
    }

    #[tokio::test]
    async fn test_backup_used_when_primary_corrupt() {
        let backup = json!([{"id": "5", "title": "Coastal Flood Forecasting"}]);
        let (_, cache) = cache_with(vec![
            (PRIMARY_KEY, "{{corrupt".to_string()),
            (BACKUP_KEY, backup.to_string()),
        ]);

        let report = RecoveryScan::default().scan(&cache).await;

        assert_eq!(titles(&report), vec!["Coastal Flood Forecasting"]);
        assert_eq!(cache.load().await.len(), 1);
    }

    #[tokio::test]
    async fn test_ledger_trusts_records_written_by_cache() {
        let (_, cache) = cache_with(vec![]);
        let mine = folio_core::NewProject::titled("My New Project").into_project(
            "local-1".into(),
            chrono::Utc::now(),
            None,
        );
        cache.persist(&[mine]).await.unwrap();

        let report = RecoveryScan::default().scan(&cache).await;

        assert_eq!(titles(&report), vec!["My New Project"]);
    }

    #[tokio::test]
    async fn test_stray_primary_entry_not_in_ledger_is_dropped() {
        let (store, cache) = cache_with(vec![]);
        cache.persist(&seed_projects()[..1]).await.unwrap();
        // A debug script appends a record to the primary blob directly.
        let mut raw: Vec<JsonValue> =
            serde_json::from_str(&store.get(PRIMARY_KEY).await.unwrap().unwrap()).unwrap();
        raw.push(json!({"id": "dbg", "title": "Debug Entry"}));
        store
            .set(PRIMARY_KEY, &serde_json::to_string(&raw).unwrap())
            .await
            .unwrap();

        let report = RecoveryScan::default().scan(&cache).await;

        assert_eq!(titles(&report), vec!["WOOD-ID"]);
    }

    #[tokio::test]
    async fn test_scan_is_idempotent() {
        let blob = json!([
            {"id": "1", "title": "WOOD-ID"},
            {"id": "2", "title": "Untitled Test"}
        ]);
        let legacy = json!([{"id": "3", "title": "Field Survey Companion"}]);
        let (_, cache) = cache_with(vec![
            (PRIMARY_KEY, blob.to_string()),
            ("projects", legacy.to_string()),
        ]);
        let scan = RecoveryScan::default();

        let first = scan.scan(&cache).await;
        let second = scan.scan(&cache).await;

        assert_eq!(first.projects, second.projects);
        assert_eq!(first.seeded, second.seeded);
    }

    #[tokio::test]
    async fn test_legacy_keys_not_rescanned_after_consolidation() {
        let legacy = json!([
            {"id": "1", "title": "WOOD-ID"},
            {"id": "2", "title": "Land Registry Ledger"}
        ]);
        let (_, cache) = cache_with(vec![("portfolio_data", legacy.to_string())]);
        let scan = RecoveryScan::default();

        let first = scan.scan(&cache).await;
        assert_eq!(first.projects.len(), 2);

        // Record "1" is deleted through the cache; the legacy blob still has it.
        let remaining: Vec<Project> = first.projects.into_iter().filter(|p| p.id != "1").collect();
        cache.persist(&remaining).await.unwrap();

        let second = scan.scan(&cache).await;
        assert_eq!(titles(&second), vec!["Land Registry Ledger"]);
        assert!(second.sources.iter().all(|s| s.key != "portfolio_data"));
    }

    #[tokio::test]
    async fn test_pattern_scan_is_opt_in() {
        let stray = json!([{"id": "7", "title": "Timber Supply Tracker"}]);
        let entries = vec![("my_portfolio_items", stray.to_string())];

        let (_, cache) = cache_with(entries.clone());
        let report = RecoveryScan::default().scan(&cache).await;
        assert!(report.seeded);

        let (_, cache) = cache_with(entries);
        let config = RecoveryConfig::default().with_pattern_scan(true);
        let report = RecoveryScan::new(config).scan(&cache).await;
        assert_eq!(titles(&report), vec!["Timber Supply Tracker"]);
    }

    #[tokio::test]
    async fn test_accept_all_titles() {
        let blob = json!([{"id": "2", "title": "Untitled Test"}]);
        let (_, cache) = cache_with(vec![(PRIMARY_KEY, blob.to_string())]);
        let config = RecoveryConfig::default().accept_all_titles();

        let report = RecoveryScan::new(config).scan(&cache).await;

        assert_eq!(titles(&report), vec!["Untitled Test"]);
    }

    #[tokio::test]
    async fn test_non_array_and_untitled_items_ignored() {
        let (_, cache) = cache_with(vec![
            (PRIMARY_KEY, json!({"id": "1", "title": "WOOD-ID"}).to_string()),
            ("projects", json!([{"id": "x"}, 42, "WOOD-ID"]).to_string()),
        ]);

        let report = RecoveryScan::default().scan(&cache).await;

        assert!(report.seeded);
        assert_eq!(report.sources.len(), 1);
        assert_eq!(report.sources[0].candidates, 0);
    }

    #[tokio::test]
    async fn test_null_list_fields_do_not_drop_record() {
        let blob = json!([{
            "id": "1",
            "title": "Portfolio Website",
            "tags": null,
            "technologies": null,
            "status": null
        }]);
        let (_, cache) = cache_with(vec![(PRIMARY_KEY, blob.to_string())]);

        let report = RecoveryScan::default().scan(&cache).await;

        assert!(!report.seeded);
        assert_eq!(titles(&report), vec!["Portfolio Website"]);
        assert!(report.projects[0].tags.is_empty());
        assert_eq!(report.projects[0].status, "published");
        assert_eq!(cache.load().await, report.projects);
    }

    #[tokio::test]
    async fn test_record_without_id_gets_stable_id() {
        let legacy = json!([{"title": "Portfolio Website", "description": "real content"}]);
        let (_, cache) = cache_with(vec![("projects", legacy.to_string())]);
        let scan = RecoveryScan::default();

        let first = scan.scan(&cache).await;
        assert!(!first.seeded);
        assert_eq!(first.projects[0].id, "projects:portfolio-website");
        assert_eq!(first.projects[0].description.as_deref(), Some("real content"));

        let second = scan.scan(&cache).await;
        assert_eq!(first.projects, second.projects);
    }

    #[tokio::test]
    async fn test_scan_is_idempotent_when_images_are_stripped() {
        let heavy = json!([{
            "id": "1",
            "title": "WOOD-ID",
            "image_url": format!("data:image/jpeg;base64,{}", "Q".repeat(10_000))
        }]);
        let store = Arc::new(
            MemoryStore::with_entries(vec![(PRIMARY_KEY, heavy.to_string())]).with_quota(9000),
        );
        let cache = LocalCacheStore::new(store);
        let scan = RecoveryScan::default();

        let first = scan.scan(&cache).await;
        let second = scan.scan(&cache).await;

        assert!(first.projects[0].image_url.is_none());
        assert_eq!(first.projects, second.projects);
        assert_eq!(cache.load().await, first.projects);
    }

    #[tokio::test]
    async fn test_quota_failure_still_returns_projects() {
        let store = Arc::new(MemoryStore::new().with_quota(10));
        let cache = LocalCacheStore::new(store);

        let report = RecoveryScan::default().scan(&cache).await;

        assert!(report.seeded);
        assert!(!report.persisted);
        assert!(!report.projects.is_empty());
    }
}
