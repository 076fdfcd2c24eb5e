//! Structured logging schema and field name constants for folio.
//!
//! All crates use these constants for consistent structured logging fields.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Local persistence exhausted, caller sees a failure |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, completed writes |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-record iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "store", "recovery", "remote", "sync", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "cache", "postgrest", "coordinator", "fs_store"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "get_all", "create", "update", "delete", "persist"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Project id being operated on.
pub const PROJECT_ID: &str = "project_id";

/// Local storage key being read or written.
pub const STORE_KEY: &str = "store_key";

/// Remote table name.
pub const REMOTE_TABLE: &str = "remote_table";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned or written.
pub const RESULT_COUNT: &str = "result_count";

/// Serialized blob size in bytes.
pub const BYTES: &str = "bytes";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Where the returned collection came from ("remote", "merged", "local").
pub const SOURCE: &str = "source";

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
