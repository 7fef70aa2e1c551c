//! Persistence layer: where diary entries live.
//!
//! [`DiaryStore`] is the boundary to the database. Two implementations
//! exist: [`MemoryStore`] keeps everything in a locked `HashMap` and backs
//! development runs and tests, [`PostgresStore`] uses `sqlx::PgPool`
//! against the `diary_entries` table created by `migrations/`.
//!
//! Every operation is scoped to the owning user. An entry that belongs to
//! somebody else is indistinguishable from one that does not exist.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DiaryEntry, EntryId, EntryKind, NewEntry, UserId};
use crate::error::DiaryError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Inclusive date window; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Earliest `date` included.
    pub start: Option<DateTime<Utc>>,
    /// Latest `date` included.
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// A window closed on both sides.
    #[must_use]
    pub const fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Returns `true` if `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| instant >= s) && self.end.is_none_or(|e| instant <= e)
    }
}

/// Filter applied by [`DiaryStore::find`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Restrict to entries whose `date` falls in this window.
    pub range: DateRange,
    /// Restrict to one kind of entry.
    pub kind: Option<EntryKind>,
}

impl EntryFilter {
    /// Returns `true` if `entry` passes this filter.
    #[must_use]
    pub fn matches(&self, entry: &DiaryEntry) -> bool {
        self.range.contains(entry.date) && self.kind.is_none_or(|k| entry.kind() == k)
    }
}

/// Storage boundary for diary entries.
///
/// Results of [`find`](DiaryStore::find) and
/// [`find_by_food`](DiaryStore::find_by_food) are ordered by `date`
/// descending, then `createdAt` descending.
#[async_trait]
pub trait DiaryStore: Send + Sync + std::fmt::Debug {
    /// Validates and stores a new entry, assigning its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::Validation`] if the document fails the
    /// pre-commit check, or [`DiaryError::PersistenceError`] on storage
    /// failure.
    async fn insert(&self, entry: NewEntry) -> Result<DiaryEntry, DiaryError>;

    /// Fetches one entry owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::EntryNotFound`] if the entry does not exist
    /// for this user.
    async fn get(&self, user: &UserId, id: EntryId) -> Result<DiaryEntry, DiaryError>;

    /// Replaces an entry's payload and date, bumping `updatedAt`.
    ///
    /// `id`, `user_id`, `created_at` and the entry kind are never changed.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::EntryNotFound`] if the entry does not exist
    /// for its user, [`DiaryError::EntryTypeMismatch`] if the payload kind
    /// differs from the stored one, or [`DiaryError::Validation`] if the
    /// document fails the pre-commit check.
    async fn update(&self, entry: DiaryEntry) -> Result<DiaryEntry, DiaryError>;

    /// Hard-deletes an entry owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::EntryNotFound`] if nothing was deleted.
    async fn delete(&self, user: &UserId, id: EntryId) -> Result<(), DiaryError>;

    /// Lists entries owned by `user` that pass `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::PersistenceError`] on storage failure.
    async fn find(&self, user: &UserId, filter: EntryFilter) -> Result<Vec<DiaryEntry>, DiaryError>;

    /// Lists meal entries owned by `user` containing the given catalog food.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::PersistenceError`] on storage failure.
    async fn find_by_food(&self, user: &UserId, food_id: &str)
    -> Result<Vec<DiaryEntry>, DiaryError>;

    /// Symptom entries inside `range`, highest intensity first (ties broken
    /// by most recent `date`), at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::PersistenceError`] on storage failure.
    async fn most_intense_symptoms(
        &self,
        user: &UserId,
        range: DateRange,
        limit: usize,
    ) -> Result<Vec<DiaryEntry>, DiaryError>;
}

/// Orders entries newest first: `date` descending, then `createdAt`
/// descending.
pub(crate) fn sort_newest_first(entries: &mut [DiaryEntry]) {
    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn open_ranges_contain_everything_on_their_open_side() {
        let Some(t) = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).single() else {
            panic!("valid timestamp");
        };
        assert!(DateRange::default().contains(t));
        assert!(
            DateRange {
                start: Some(t),
                end: None
            }
            .contains(t)
        );
        assert!(
            !DateRange {
                start: None,
                end: Some(t - chrono::Duration::seconds(1))
            }
            .contains(t)
        );
        assert!(DateRange::between(t, t).contains(t));
    }
}
