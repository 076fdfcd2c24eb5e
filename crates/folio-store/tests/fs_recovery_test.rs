//! Recovery and cache behaviour over the filesystem backend.

use std::sync::Arc;

use folio_core::defaults::{BACKUP_KEY, LEDGER_KEY, PRIMARY_KEY};
use folio_core::{KeyValueStore, NewProject};
use folio_store::{seed_projects, Fidelity, FilesystemStore, LocalCacheStore, RecoveryScan};
use serde_json::json;
use tempfile::TempDir;

fn write_blob(dir: &TempDir, key: &str, value: serde_json::Value) {
    std::fs::write(dir.path().join(format!("{key}.json")), value.to_string()).unwrap();
}

#[tokio::test]
async fn test_recovery_consolidates_legacy_files() {
    let dir = TempDir::new().unwrap();
    write_blob(
        &dir,
        "portfolioProjects",
        json!([
            {"id": 1, "title": "WOOD-ID", "images": ["https://cdn.example.com/w.png"]},
            {"id": 2, "title": "Untitled Test"}
        ]),
    );
    write_blob(
        &dir,
        "admin_projects",
        json!([{"id": "3", "title": "Timber Supply Tracker", "project_url": "https://t.example.com"}]),
    );

    let store = Arc::new(FilesystemStore::new(dir.path()));
    let cache = LocalCacheStore::new(store.clone());
    let report = RecoveryScan::default().scan(&cache).await;

    let titles: Vec<_> = report.projects.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["WOOD-ID", "Timber Supply Tracker"]);
    assert!(report.persisted);
    assert_eq!(report.projects[0].id, "1");
    assert_eq!(
        report.projects[1].live_url.as_deref(),
        Some("https://t.example.com")
    );

    let keys = store.keys().await.unwrap();
    for key in [PRIMARY_KEY, BACKUP_KEY, LEDGER_KEY] {
        assert!(keys.iter().any(|k| k == key), "missing {key}");
    }
    assert_eq!(cache.load().await, report.projects);
    assert_eq!(cache.load_backup().await, report.projects);
}

#[tokio::test]
async fn test_corrupt_primary_file_falls_back_to_backup() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FilesystemStore::new(dir.path()));
    let cache = LocalCacheStore::new(store);
    cache.persist(&seed_projects()).await.unwrap();

    std::fs::write(dir.path().join(format!("{PRIMARY_KEY}.json")), "[{\"id\": ").unwrap();

    assert!(cache.load().await.is_empty());
    let report = RecoveryScan::default().scan(&cache).await;
    assert_eq!(report.projects, seed_projects());
    assert!(!report.seeded);
    assert_eq!(cache.load().await, seed_projects());
}

#[tokio::test]
async fn test_quota_triggers_stripped_persist() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FilesystemStore::new(dir.path()).with_quota(16 * 1024));
    let cache = LocalCacheStore::new(store);

    let heavy = NewProject {
        image_url: Some(format!("data:image/jpeg;base64,{}", "Q".repeat(20_000))),
        project_images: vec![
            "https://cdn.example.com/keep.png".into(),
            format!("data:image/png;base64,{}", "R".repeat(4_000)),
        ],
        ..NewProject::titled("WOOD-ID")
    }
    .into_project("heavy".into(), chrono::Utc::now(), None);

    let fidelity = cache.persist(&[heavy]).await.unwrap();

    assert_eq!(fidelity, Fidelity::ImagesStripped);
    let stored = cache.load().await;
    assert!(stored[0].image_url.is_none());
    assert_eq!(stored[0].project_images, vec!["https://cdn.example.com/keep.png"]);
}
