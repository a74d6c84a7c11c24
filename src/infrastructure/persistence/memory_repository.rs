//! In-memory implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::domain::entities::{ArchivedUrlEntry, NewUrlEntry, UrlEntry};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use serde_json::json;

#[derive(Default)]
struct Tables {
    active: HashMap<String, UrlEntry>,
    archive: Vec<ArchivedUrlEntry>,
}

/// In-memory repository for single-node runs and integration tests.
///
/// Keeps the active table and the archive behind one lock so a
/// delete-then-archive pair observed through `list_*` never shows the entry
/// in both tables at once. Survives nothing; swap in a database-backed
/// implementation of [`UrlRepository`] for durable deployments.
#[derive(Default)]
pub struct InMemoryUrlRepository {
    tables: RwLock<Tables>,
    next_id: AtomicI64,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Inserts a fully-formed entry, assigning a fresh id.
    ///
    /// Unlike [`UrlRepository::save`] this keeps the given timestamps and
    /// counters, which is what fixtures and data imports need.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the alias is already taken.
    pub async fn insert(&self, mut entry: UrlEntry) -> Result<UrlEntry, AppError> {
        let mut tables = self.tables.write().await;
        if tables.active.contains_key(&entry.alias) {
            return Err(AppError::conflict(
                "Alias already exists",
                json!({ "alias": entry.alias }),
            ));
        }
        entry.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tables.active.insert(entry.alias.clone(), entry.clone());
        Ok(entry)
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn save(&self, new_entry: NewUrlEntry) -> Result<UrlEntry, AppError> {
        let mut tables = self.tables.write().await;
        if tables.active.contains_key(&new_entry.alias) {
            return Err(AppError::conflict(
                "Alias already exists",
                json!({ "alias": new_entry.alias }),
            ));
        }

        let entry = UrlEntry::new(
            self.next_id.fetch_add(1, Ordering::Relaxed),
            new_entry.alias.clone(),
            new_entry.target_url,
            new_entry.owner_id,
            Utc::now(),
            None,
            0,
            new_entry.expires_at,
        );
        tables.active.insert(new_entry.alias, entry.clone());
        Ok(entry)
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<UrlEntry>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.active.get(alias).cloned())
    }

    async fn find_by_target(&self, target_url: &str) -> Result<Option<UrlEntry>, AppError> {
        let tables = self.tables.read().await;
        // Oldest entry wins when the same URL was shortened more than once.
        Ok(tables
            .active
            .values()
            .filter(|e| e.target_url == target_url)
            .min_by_key(|e| e.id)
            .cloned())
    }

    async fn update(&self, entry: &UrlEntry) -> Result<UrlEntry, AppError> {
        let mut tables = self.tables.write().await;
        let current = tables.active.get_mut(&entry.alias).ok_or_else(|| {
            AppError::not_found("Short URL not found", json!({ "alias": entry.alias }))
        })?;

        current.target_url = entry.target_url.clone();
        current.visit_count = entry.visit_count;
        current.last_visited_at = entry.last_visited_at;
        current.expires_at = entry.expires_at;
        Ok(current.clone())
    }

    async fn delete(&self, alias: &str) -> Result<Option<UrlEntry>, AppError> {
        let mut tables = self.tables.write().await;
        Ok(tables.active.remove(alias))
    }

    async fn archive(&self, archived: ArchivedUrlEntry) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.archive.push(archived);
        Ok(())
    }

    async fn find_archived(&self, alias: &str) -> Result<Option<ArchivedUrlEntry>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .archive
            .iter()
            .rev()
            .find(|a| a.alias == alias)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<UrlEntry>, AppError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<UrlEntry> = tables.active.values().cloned().collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }

    async fn list_archived(&self) -> Result<Vec<ArchivedUrlEntry>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.archive.clone())
    }

    async fn list_expired(&self, before: DateTime<Utc>) -> Result<Vec<UrlEntry>, AppError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<UrlEntry> = tables
            .active
            .values()
            .filter(|e| e.expires_at.is_some_and(|t| t < before))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }

    async fn list_unused_since(&self, before: DateTime<Utc>) -> Result<Vec<UrlEntry>, AppError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<UrlEntry> = tables
            .active
            .values()
            .filter(|e| e.last_activity_at() < before)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }
}
