//! Wire format for cached URL entries.

use crate::domain::entities::UrlEntry;
use crate::utils::utc_time::{utc_z, utc_z_opt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON snapshot of a [`UrlEntry`] as stored in the cache.
///
/// The field names and the UTC-with-`Z` timestamp convention are a fixed
/// schema shared with other readers of the cache; renaming a field here is a
/// wire format change, not a refactor. Decoding is strict: a payload with a
/// missing field or a non-`Z` timestamp fails to parse, and the reader falls
/// back to the durable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedUrlEntry {
    pub short_url: String,
    pub long_url: String,
    pub times_visited: i64,
    #[serde(with = "utc_z")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "utc_z_opt")]
    pub last_visited: Option<DateTime<Utc>>,
    #[serde(with = "utc_z_opt")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedUrlEntry {
    /// Snapshots a durable entry into its cache representation.
    pub fn from_entry(entry: &UrlEntry) -> Self {
        Self {
            short_url: entry.alias.clone(),
            long_url: entry.target_url.clone(),
            times_visited: entry.visit_count,
            created_at: entry.created_at,
            last_visited: entry.last_visited_at,
            expires_at: entry.expires_at,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
