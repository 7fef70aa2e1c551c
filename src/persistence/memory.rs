//! In-memory diary store.
//!
//! [`MemoryStore`] keeps every entry in a single `HashMap` behind a
//! [`tokio::sync::RwLock`]. Readers run concurrently; writers are
//! serialized. Nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{DateRange, DiaryStore, EntryFilter, sort_newest_first};
use crate::domain::{DiaryEntry, EntryDocument, EntryId, NewEntry, UserId};
use crate::error::DiaryError;

/// Diary store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<EntryId, DiaryEntry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries across all users.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn collect<F>(&self, user: &UserId, keep: F) -> Vec<DiaryEntry>
    where
        F: Fn(&DiaryEntry) -> bool + Send,
    {
        let map = self.entries.read().await;
        let mut found: Vec<DiaryEntry> = map
            .values()
            .filter(|e| &e.user_id == user && keep(e))
            .cloned()
            .collect();
        sort_newest_first(&mut found);
        found
    }
}

/// Runs the pre-commit document check on an entry about to be written.
fn check_before_commit(entry: &DiaryEntry) -> Result<(), DiaryError> {
    EntryDocument::from(entry.clone())
        .validate()
        .map_err(DiaryError::Validation)
}

#[async_trait]
impl DiaryStore for MemoryStore {
    async fn insert(&self, entry: NewEntry) -> Result<DiaryEntry, DiaryError> {
        let entry = entry.into_entry(EntryId::new(), Utc::now());
        check_before_commit(&entry)?;
        let mut map = self.entries.write().await;
        if map.contains_key(&entry.id) {
            return Err(DiaryError::Internal(format!(
                "entry {} already exists",
                entry.id
            )));
        }
        map.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn get(&self, user: &UserId, id: EntryId) -> Result<DiaryEntry, DiaryError> {
        let map = self.entries.read().await;
        map.get(&id)
            .filter(|e| &e.user_id == user)
            .cloned()
            .ok_or(DiaryError::EntryNotFound(id))
    }

    async fn update(&self, mut entry: DiaryEntry) -> Result<DiaryEntry, DiaryError> {
        let mut map = self.entries.write().await;
        let Some(stored) = map.get_mut(&entry.id).filter(|e| e.user_id == entry.user_id) else {
            return Err(DiaryError::EntryNotFound(entry.id));
        };
        if stored.kind() != entry.kind() {
            return Err(DiaryError::EntryTypeMismatch {
                id: entry.id,
                actual: stored.kind(),
                requested: entry.kind(),
            });
        }
        entry.created_at = stored.created_at;
        entry.updated_at = Utc::now();
        check_before_commit(&entry)?;
        *stored = entry.clone();
        Ok(entry)
    }

    async fn delete(&self, user: &UserId, id: EntryId) -> Result<(), DiaryError> {
        let mut map = self.entries.write().await;
        match map.get(&id) {
            Some(e) if &e.user_id == user => {
                map.remove(&id);
                Ok(())
            }
            _ => Err(DiaryError::EntryNotFound(id)),
        }
    }

    async fn find(&self, user: &UserId, filter: EntryFilter) -> Result<Vec<DiaryEntry>, DiaryError> {
        Ok(self.collect(user, |e| filter.matches(e)).await)
    }

    async fn find_by_food(
        &self,
        user: &UserId,
        food_id: &str,
    ) -> Result<Vec<DiaryEntry>, DiaryError> {
        Ok(self
            .collect(user, |e| {
                e.payload.as_meal().is_some_and(|m| m.contains_food(food_id))
            })
            .await)
    }

    async fn most_intense_symptoms(
        &self,
        user: &UserId,
        range: DateRange,
        limit: usize,
    ) -> Result<Vec<DiaryEntry>, DiaryError> {
        let mut found = self
            .collect(user, |e| {
                e.payload.as_symptom().is_some() && range.contains(e.date)
            })
            .await;
        // Stable sort keeps the newest-first order among equal intensities.
        found.sort_by_key(|e| {
            std::cmp::Reverse(e.payload.as_symptom().map_or(0, |s| s.intensity))
        });
        found.truncate(limit);
        Ok(found)
    }
}
