//! Session settings resolved from environment variables and CLI flags.
//!
//! Flags win over the environment; the environment wins over the defaults
//! in `folio_core::defaults`.

use std::path::PathBuf;

use folio_core::defaults::{
    DATA_DIR, ENV_DATA_DIR, ENV_OWNER_ID, ENV_SCAN_PATTERN_KEYS, ENV_STORE_QUOTA_BYTES,
    STORE_QUOTA_BYTES,
};
use folio_core::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub quota_bytes: usize,
    pub owner: Option<String>,
    pub scan_pattern_keys: bool,
    pub offline: bool,
}

impl Settings {
    pub fn from_env(data_dir: Option<PathBuf>, offline: bool) -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), data_dir, offline)
    }

    pub fn from_lookup<F>(lookup: F, data_dir: Option<PathBuf>, offline: bool) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let quota_bytes = match lookup(ENV_STORE_QUOTA_BYTES) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a byte count, got: {}", ENV_STORE_QUOTA_BYTES, raw))
            })?,
            None => STORE_QUOTA_BYTES,
        };

        Ok(Self {
            data_dir: data_dir
                .or_else(|| lookup(ENV_DATA_DIR).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DATA_DIR)),
            quota_bytes,
            owner: lookup(ENV_OWNER_ID).filter(|v| !v.trim().is_empty()),
            scan_pattern_keys: lookup(ENV_SCAN_PATTERN_KEYS)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            offline,
        })
    }
}
