//! # folio-core
//!
//! Core types, traits, and abstractions for the folio project catalog.
//!
//! This crate provides the project data model, the storage ports that the
//! remote and local backends implement, the error taxonomy shared by every
//! crate, and the in-process update notification bus.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod slug;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{EventBus, EventEnvelope, ProjectAction, ProjectEvent};
pub use models::*;
pub use slug::slugify;
pub use traits::*;
pub use uuid_utils::{extract_timestamp, local_project_id, new_v7};
