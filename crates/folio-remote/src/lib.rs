//! # folio-remote
//!
//! Remote store adapter for the folio project catalog.
//!
//! This crate provides:
//! - A PostgREST table client (Supabase-style REST endpoint)
//! - The remote row shape and its normalization into [`folio_core::Project`]
//! - Environment-based configuration
//! - An in-memory mock remote with switchable failures (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use folio_remote::PostgrestStore;
//! use folio_core::RemoteProjectStore;
//!
//! #[tokio::main]
//! async fn main() -> folio_core::Result<()> {
//!     if let Some(remote) = PostgrestStore::from_env()? {
//!         let projects = remote.list().await?;
//!         println!("{} remote projects", projects.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod postgrest;
pub mod rows;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::RemoteConfig;
pub use postgrest::PostgrestStore;
pub use rows::ProjectRow;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockRemoteStore, RemoteOp};
