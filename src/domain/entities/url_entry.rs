//! Url entry entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL entry with usage metadata.
///
/// Represents the durable mapping between an alias and a target URL.
/// `owner_id` is `None` for entries created anonymously.
#[derive(Debug, Clone)]
pub struct UrlEntry {
    pub id: i64,
    pub alias: String,
    pub target_url: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub last_visited_at: Option<DateTime<Utc>>,
    pub visit_count: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UrlEntry {
    /// Creates a new UrlEntry instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        alias: String,
        target_url: String,
        owner_id: Option<i64>,
        created_at: DateTime<Utc>,
        last_visited_at: Option<DateTime<Utc>>,
        visit_count: i64,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            alias,
            target_url,
            owner_id,
            created_at,
            last_visited_at,
            visit_count,
            expires_at,
        }
    }

    /// Returns true if the entry has passed its expiry time.
    ///
    /// Entries without an explicit expiry never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e < now)
    }

    /// Returns true if the entry has passed its expiry time as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Moment of the entry's most recent activity: the last visit, or the
    /// creation time if it was never visited.
    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_visited_at.unwrap_or(self.created_at)
    }

    /// Applies one visit: bumps the counter and advances `last_visited_at`.
    ///
    /// The timestamp never moves backwards, so visits applied out of order
    /// (a queue drained late) cannot regress it.
    pub fn record_visit(&mut self, at: DateTime<Utc>) {
        self.visit_count += 1;
        self.last_visited_at = Some(match self.last_visited_at {
            Some(prev) if prev > at => prev,
            _ => at,
        });
    }
}

/// Input data for creating a new entry.
#[derive(Debug, Clone)]
pub struct NewUrlEntry {
    pub alias: String,
    pub target_url: String,
    pub owner_id: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Tombstone written when an entry is removed from the active table.
///
/// Carries everything the entry held at deletion time so history queries
/// and audits keep working after the alias is gone.
#[derive(Debug, Clone)]
pub struct ArchivedUrlEntry {
    pub id: i64,
    pub alias: String,
    pub target_url: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub last_visited_at: Option<DateTime<Utc>>,
    pub visit_count: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub deleted_at: DateTime<Utc>,
}

impl ArchivedUrlEntry {
    /// Builds a tombstone from a just-removed entry.
    pub fn from_entry(entry: UrlEntry, deleted_at: DateTime<Utc>) -> Self {
        Self {
            id: entry.id,
            alias: entry.alias,
            target_url: entry.target_url,
            owner_id: entry.owner_id,
            created_at: entry.created_at,
            last_visited_at: entry.last_visited_at,
            visit_count: entry.visit_count,
            expires_at: entry.expires_at,
            deleted_at,
        }
    }
}
