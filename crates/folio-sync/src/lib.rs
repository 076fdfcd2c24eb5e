//! # folio-sync
//!
//! Unified sync coordinator for the folio project catalog.
//!
//! [`ProjectCoordinator`] merges the hosted remote table with the local
//! cache, absorbs remote failures, and publishes a notification for every
//! successful create, update and delete.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use folio_core::{EventBus, NewProject};
//! use folio_store::{LocalCacheStore, MemoryStore};
//! use folio_sync::ProjectCoordinator;
//!
//! # async fn run() -> folio_core::Result<()> {
//! let cache = LocalCacheStore::new(Arc::new(MemoryStore::new()));
//! let coordinator = ProjectCoordinator::new(None, cache, Arc::new(EventBus::default()));
//!
//! let created = coordinator.create_project(NewProject::titled("My New Project")).await?;
//! assert_eq!(created.slug, "my-new-project");
//! # Ok(())
//! # }
//! ```

pub mod coordinator;

pub use coordinator::{ProjectCoordinator, ReadSource};
