//! Centralized default constants for folio.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates and the CLI reference these constants instead of defining their own
//! magic strings and numbers.

// =============================================================================
// LOCAL STORAGE KEYS
// =============================================================================

/// Primary key holding the full serialized project collection.
pub const PRIMARY_KEY: &str = "portfolio_projects";

/// Mirror of the primary blob, used as a second-chance source.
pub const BACKUP_KEY: &str = "portfolio_projects_backup";

/// Ids of the collection last persisted through the cache store.
///
/// Recovery trusts records whose id appears here even when their title is
/// not on the known-good list.
pub const LEDGER_KEY: &str = "portfolio_projects_ids";

/// Historical keys that earlier versions of the site wrote project arrays to.
///
/// Scanned in this order after the primary and backup keys. Never written
/// except through recovery consolidation into the primary key.
pub const LEGACY_KEYS: &[&str] = &[
    "projects",
    "portfolio-projects",
    "portfolioProjects",
    "admin_projects",
    "projects_backup",
    "portfolio_data",
];

/// Substrings that mark a key as project-related for the opt-in pattern scan.
pub const PATTERN_KEY_MARKERS: &[&str] = &["project", "portfolio"];

// =============================================================================
// RECOVERY
// =============================================================================

/// Titles of real catalog entries that survive recovery from untrusted blobs.
///
/// Stray debug and test entries accumulated in old keys are dropped unless
/// their title is listed here or their id is in the ledger.
pub const KNOWN_GOOD_TITLES: &[&str] = &[
    "WOOD-ID",
    "Land Registry Ledger",
    "Coastal Flood Forecasting",
    "Field Survey Companion",
    "Timber Supply Tracker",
    "Portfolio Website",
];

// =============================================================================
// LOCAL STORE
// =============================================================================

/// Default byte quota for the local store (browser local storage is ~5 MiB).
pub const STORE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Default data directory for the filesystem store.
pub const DATA_DIR: &str = ".folio";

/// Image references longer than this are dropped by the reduced-fidelity save.
pub const MAX_INLINE_IMAGE_LEN: usize = 2048;

// =============================================================================
// REMOTE
// =============================================================================

/// Default remote table name.
pub const REMOTE_TABLE: &str = "projects";

/// Timeout for remote table requests in seconds.
pub const REMOTE_TIMEOUT_SECS: u64 = 15;

/// Environment variable for the remote base URL.
pub const ENV_REMOTE_URL: &str = "FOLIO_REMOTE_URL";

/// Fallback environment variable for the remote base URL.
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";

/// Environment variable for the remote API key.
pub const ENV_REMOTE_KEY: &str = "FOLIO_REMOTE_KEY";

/// Fallback environment variable for the remote API key.
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_ANON_KEY";

/// Environment variable for the remote table name.
pub const ENV_REMOTE_TABLE: &str = "FOLIO_REMOTE_TABLE";

/// Environment variable for the remote request timeout.
pub const ENV_REMOTE_TIMEOUT_SECS: &str = "FOLIO_REMOTE_TIMEOUT_SECS";

// =============================================================================
// SESSION
// =============================================================================

/// Environment variable for the local data directory.
pub const ENV_DATA_DIR: &str = "FOLIO_DATA_DIR";

/// Environment variable for the local store quota.
pub const ENV_STORE_QUOTA_BYTES: &str = "FOLIO_STORE_QUOTA_BYTES";

/// Environment variable for the authenticated owner id.
pub const ENV_OWNER_ID: &str = "FOLIO_OWNER_ID";

/// Environment variable enabling the substring key scan during recovery.
pub const ENV_SCAN_PATTERN_KEYS: &str = "FOLIO_SCAN_PATTERN_KEYS";

/// Default event bus broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 64;

/// Default project status for new records.
pub const PROJECT_STATUS: &str = "published";
