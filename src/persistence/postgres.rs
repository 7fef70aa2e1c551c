//! PostgreSQL implementation of the diary store.
//!
//! One row per entry in `diary_entries`. The meal and symptom payloads are
//! JSONB columns holding the same documents the API returns, so the food
//! and intensity indexes declared in `migrations/` can reach inside them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::{DateRange, DiaryStore, EntryFilter};
use crate::domain::{
    DiaryEntry, EntryDocument, EntryId, EntryKind, Meal, NewEntry, Symptom, UserId,
};
use crate::error::DiaryError;

/// Column list shared by every `SELECT`, matching [`EntryRow`].
const COLUMNS: &str = "id, user_id, entry_type, date, meal, symptom, created_at, updated_at";

/// Raw `diary_entries` row.
type EntryRow = (
    Uuid,
    String,
    String,
    DateTime<Utc>,
    Option<Json<Meal>>,
    Option<Json<Symptom>>,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// PostgreSQL-backed diary store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the embedded migrations in `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns a [`DiaryError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), DiaryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DiaryError::PersistenceError(e.to_string()))
    }

    async fn fetch(&self, user: &UserId, id: EntryId) -> Result<Option<DiaryEntry>, DiaryError> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {COLUMNS} FROM diary_entries WHERE id = $1 AND user_id = $2"
        ))
        .bind(*id.as_uuid())
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_entry).transpose()
    }
}

/// Converts a raw row into a typed entry, re-running the document check.
fn row_to_entry(row: EntryRow) -> Result<DiaryEntry, DiaryError> {
    let (id, user_id, entry_type, date, meal, symptom, created_at, updated_at) = row;
    let user_id = UserId::parse(&user_id)
        .ok_or_else(|| DiaryError::PersistenceError(format!("entry {id} has no owner")))?;
    let kind = EntryKind::parse(&entry_type).ok_or_else(|| {
        DiaryError::PersistenceError(format!("entry {id} has unknown type {entry_type:?}"))
    })?;
    DiaryEntry::try_from(EntryDocument {
        id: EntryId::from_uuid(id),
        user_id,
        kind,
        date,
        meal: meal.map(|Json(m)| m),
        symptom: symptom.map(|Json(s)| s),
        created_at,
        updated_at,
    })
}

fn rows_to_entries(rows: Vec<EntryRow>) -> Result<Vec<DiaryEntry>, DiaryError> {
    rows.into_iter().map(row_to_entry).collect()
}

/// Flattens an entry and runs the pre-commit document check.
fn checked_document(entry: DiaryEntry) -> Result<EntryDocument, DiaryError> {
    let document = EntryDocument::from(entry);
    document.validate().map_err(DiaryError::Validation)?;
    Ok(document)
}

#[async_trait]
impl DiaryStore for PostgresStore {
    async fn insert(&self, entry: NewEntry) -> Result<DiaryEntry, DiaryError> {
        let entry = entry.into_entry(EntryId::new(), Utc::now());
        let document = checked_document(entry.clone())?;

        sqlx::query(
            "INSERT INTO diary_entries \
             (id, user_id, entry_type, date, meal, symptom, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(*document.id.as_uuid())
        .bind(document.user_id.as_str())
        .bind(document.kind.as_str())
        .bind(document.date)
        .bind(document.meal.map(Json))
        .bind(document.symptom.map(Json))
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn get(&self, user: &UserId, id: EntryId) -> Result<DiaryEntry, DiaryError> {
        self.fetch(user, id)
            .await?
            .ok_or(DiaryError::EntryNotFound(id))
    }

    async fn update(&self, entry: DiaryEntry) -> Result<DiaryEntry, DiaryError> {
        let stored = self
            .fetch(&entry.user_id, entry.id)
            .await?
            .ok_or(DiaryError::EntryNotFound(entry.id))?;
        if stored.kind() != entry.kind() {
            return Err(DiaryError::EntryTypeMismatch {
                id: entry.id,
                actual: stored.kind(),
                requested: entry.kind(),
            });
        }

        let mut document = checked_document(entry)?;
        document.created_at = stored.created_at;
        document.updated_at = Utc::now();

        let result = sqlx::query(
            "UPDATE diary_entries SET date = $3, meal = $4, symptom = $5, updated_at = $6 \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(*document.id.as_uuid())
        .bind(document.user_id.as_str())
        .bind(document.date)
        .bind(document.meal.clone().map(Json))
        .bind(document.symptom.clone().map(Json))
        .bind(document.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DiaryError::EntryNotFound(document.id));
        }
        DiaryEntry::try_from(document)
    }

    async fn delete(&self, user: &UserId, id: EntryId) -> Result<(), DiaryError> {
        let result = sqlx::query("DELETE FROM diary_entries WHERE id = $1 AND user_id = $2")
            .bind(*id.as_uuid())
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DiaryError::EntryNotFound(id));
        }
        Ok(())
    }

    async fn find(&self, user: &UserId, filter: EntryFilter) -> Result<Vec<DiaryEntry>, DiaryError> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {COLUMNS} FROM diary_entries \
             WHERE user_id = $1 \
               AND ($2::timestamptz IS NULL OR date >= $2) \
               AND ($3::timestamptz IS NULL OR date <= $3) \
               AND ($4::text IS NULL OR entry_type = $4) \
             ORDER BY date DESC, created_at DESC"
        ))
        .bind(user.as_str())
        .bind(filter.range.start)
        .bind(filter.range.end)
        .bind(filter.kind.map(EntryKind::as_str))
        .fetch_all(&self.pool)
        .await?;

        rows_to_entries(rows)
    }

    async fn find_by_food(
        &self,
        user: &UserId,
        food_id: &str,
    ) -> Result<Vec<DiaryEntry>, DiaryError> {
        let probe = serde_json::json!([{ "foodId": food_id }]);
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {COLUMNS} FROM diary_entries \
             WHERE user_id = $1 AND entry_type = 'meal' AND meal -> 'foods' @> $2 \
             ORDER BY date DESC, created_at DESC"
        ))
        .bind(user.as_str())
        .bind(probe)
        .fetch_all(&self.pool)
        .await?;

        rows_to_entries(rows)
    }

    async fn most_intense_symptoms(
        &self,
        user: &UserId,
        range: DateRange,
        limit: usize,
    ) -> Result<Vec<DiaryEntry>, DiaryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {COLUMNS} FROM diary_entries \
             WHERE user_id = $1 AND entry_type = 'symptom' \
               AND ($2::timestamptz IS NULL OR date >= $2) \
               AND ($3::timestamptz IS NULL OR date <= $3) \
             ORDER BY (symptom ->> 'intensity')::int DESC, date DESC, created_at DESC \
             LIMIT $4"
        ))
        .bind(user.as_str())
        .bind(range.start)
        .bind(range.end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows_to_entries(rows)
    }
}
