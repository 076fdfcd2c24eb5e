//! Remote table configuration.
//!
//! Loaded from environment variables. A missing URL or key means the remote
//! is not configured, which is a normal state: the catalog then runs on
//! local storage alone.
//!
//! | Variable | Fallback | Default |
//! |----------|----------|---------|
//! | `FOLIO_REMOTE_URL` | `SUPABASE_URL` | (none) |
//! | `FOLIO_REMOTE_KEY` | `SUPABASE_ANON_KEY` | (none) |
//! | `FOLIO_REMOTE_TABLE` | | `projects` |
//! | `FOLIO_REMOTE_TIMEOUT_SECS` | | `15` |

use folio_core::defaults::{
    ENV_REMOTE_KEY, ENV_REMOTE_TABLE, ENV_REMOTE_TIMEOUT_SECS, ENV_REMOTE_URL, ENV_SUPABASE_KEY,
    ENV_SUPABASE_URL, REMOTE_TABLE, REMOTE_TIMEOUT_SECS,
};
use folio_core::{Error, Result};
use tracing::debug;

/// Connection settings for the hosted project table.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub base_url: String,
    /// API key sent as `apikey` and bearer token.
    pub api_key: String,
    /// Table holding project rows.
    pub table: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            table: REMOTE_TABLE.to_string(),
            timeout_seconds: REMOTE_TIMEOUT_SECS,
        }
    }

    /// Read configuration from the environment. `None` when the URL or key
    /// is missing or blank.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url = non_blank(ENV_REMOTE_URL).or_else(|| non_blank(ENV_SUPABASE_URL));
        let api_key = non_blank(ENV_REMOTE_KEY).or_else(|| non_blank(ENV_SUPABASE_KEY));
        let (Some(base_url), Some(api_key)) = (base_url, api_key) else {
            debug!("Remote store not configured");
            return None;
        };

        Some(Self {
            base_url,
            api_key,
            table: non_blank(ENV_REMOTE_TABLE).unwrap_or_else(|| REMOTE_TABLE.to_string()),
            timeout_seconds: lookup(ENV_REMOTE_TIMEOUT_SECS)
                .and_then(|v| v.parse().ok())
                .unwrap_or(REMOTE_TIMEOUT_SECS),
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "remote base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if self.table.is_empty() {
            return Err(Error::Config("remote table cannot be empty".to_string()));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::Config("remote timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// REST endpoint for the configured table.
    pub fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }
}
