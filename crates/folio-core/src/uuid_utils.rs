//! UUID v7 utilities for time-ordered identifiers.
//!
//! Locally created projects get a UUIDv7 id: it embeds the creation time in
//! its first 48 bits, so ids sort by creation and never collide with the
//! integer ids the remote table hands out.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Generate a timestamp-based id for a project created without the remote.
pub fn local_project_id() -> String {
    new_v7().to_string()
}

/// Extract the embedded timestamp from a UUIDv7.
///
/// Returns `None` for other UUID versions.
pub fn extract_timestamp(uuid: &Uuid) -> Option<DateTime<Utc>> {
    if uuid.get_version_num() != 7 {
        return None;
    }
    let bytes = uuid.as_bytes();
    let millis = (u64::from(bytes[0]) << 40)
        | (u64::from(bytes[1]) << 32)
        | (u64::from(bytes[2]) << 24)
        | (u64::from(bytes[3]) << 16)
        | (u64::from(bytes[4]) << 8)
        | u64::from(bytes[5]);
    Utc.timestamp_millis_opt(millis as i64).single()
}
