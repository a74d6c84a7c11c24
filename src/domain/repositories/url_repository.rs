//! Repository trait for durable short URL storage.

use crate::domain::entities::{ArchivedUrlEntry, NewUrlEntry, UrlEntry};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the durable store of short URL entries.
///
/// This is the system of record: every read that misses the cache and every
/// lifecycle operation (create, update, delete, sweep) goes through it.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Persists a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the alias is already taken.
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn save(&self, new_entry: NewUrlEntry) -> Result<UrlEntry, AppError>;

    /// Finds an entry by its alias.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(UrlEntry))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn find_by_alias(&self, alias: &str) -> Result<Option<UrlEntry>, AppError>;

    /// Finds an entry by its target URL.
    ///
    /// Used to check whether a URL has already been shortened.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn find_by_target(&self, target_url: &str) -> Result<Option<UrlEntry>, AppError>;

    /// Writes back the mutable fields of an existing entry, keyed by alias.
    ///
    /// `id`, `alias`, `created_at` and `owner_id` are immutable and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the entry disappeared between read
    /// and write (deleted concurrently).
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn update(&self, entry: &UrlEntry) -> Result<UrlEntry, AppError>;

    /// Removes an entry from the active table.
    ///
    /// Returns the removed entry so the caller can archive it, or `Ok(None)`
    /// if the alias was already gone. Removing an absent alias is not an
    /// error; deletion is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn delete(&self, alias: &str) -> Result<Option<UrlEntry>, AppError>;

    /// Appends a tombstone to the archive.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn archive(&self, archived: ArchivedUrlEntry) -> Result<(), AppError>;

    /// Finds the most recent tombstone for an alias, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn find_archived(&self, alias: &str) -> Result<Option<ArchivedUrlEntry>, AppError>;

    /// Lists every active entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn list_all(&self) -> Result<Vec<UrlEntry>, AppError>;

    /// Lists every archived tombstone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn list_archived(&self) -> Result<Vec<ArchivedUrlEntry>, AppError>;

    /// Lists active entries whose explicit expiry lies before `before`.
    ///
    /// Entries without an expiry are never returned.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn list_expired(&self, before: DateTime<Utc>) -> Result<Vec<UrlEntry>, AppError>;

    /// Lists active entries whose last activity lies before `before`.
    ///
    /// Last activity is the most recent visit, falling back to the creation
    /// time for entries that were never visited.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] when storage cannot be reached.
    async fn list_unused_since(&self, before: DateTime<Utc>) -> Result<Vec<UrlEntry>, AppError>;
}
