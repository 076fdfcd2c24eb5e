//! # folio-store
//!
//! Local persistence for the folio project catalog.
//!
//! This crate provides:
//! - Key/value backends: a filesystem directory of JSON blobs and an
//!   in-memory map, both with an optional byte quota
//! - The local cache store (primary blob, mirrored backup, id ledger)
//! - The data recovery scan that rebuilds the catalog from every known key
//! - The deterministic seed dataset used when nothing can be recovered
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use folio_store::{FilesystemStore, LocalCacheStore, RecoveryConfig, RecoveryScan};
//!
//! # async fn run() -> folio_core::Result<()> {
//! let cache = LocalCacheStore::new(Arc::new(FilesystemStore::new(".folio")));
//! let report = RecoveryScan::new(RecoveryConfig::default()).scan(&cache).await;
//! println!("recovered {} projects", report.projects.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod fs_store;
pub mod memory;
pub mod recovery;
pub mod seed;

pub use cache::{Fidelity, LocalCacheStore};
pub use fs_store::FilesystemStore;
pub use memory::MemoryStore;
pub use recovery::{RecoveryConfig, RecoveryReport, RecoveryScan, RecoverySource};
pub use seed::seed_projects;

// Re-export core types
pub use folio_core::*;
