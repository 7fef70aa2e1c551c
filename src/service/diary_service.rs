//! Diary service: maps validated requests onto stored entries.

use std::sync::Arc;

use chrono::{Days, NaiveDate};

use super::requests::{CreateMeal, CreateSymptom, EntryUpdate, ListQuery};
use super::summaries::{
    DaySummary, MAX_OVERVIEW_DAYS, MOST_INTENSE_LIMIT, MonthSummary, SymptomOverview, count_by_day,
};
use crate::domain::{DiaryEntry, EntryId, EntryKind, EntryPayload, NewEntry, UserId};
use crate::error::DiaryError;
use crate::persistence::{DateRange, DiaryStore, EntryFilter};
use crate::util::LocalCalendar;
use crate::util::date::days_in_month;

/// Orchestration layer for all diary operations.
///
/// Stateless coordinator: owns a handle to the [`DiaryStore`] and the
/// [`LocalCalendar`] that turns local days into stored instants. Every
/// operation is scoped to the calling user.
#[derive(Debug, Clone)]
pub struct DiaryService {
    store: Arc<dyn DiaryStore>,
    calendar: LocalCalendar,
}

impl DiaryService {
    /// Creates a new `DiaryService`.
    #[must_use]
    pub fn new(store: Arc<dyn DiaryStore>, calendar: LocalCalendar) -> Self {
        Self { store, calendar }
    }

    /// Returns the calendar used for day and month boundaries.
    #[must_use]
    pub const fn calendar(&self) -> LocalCalendar {
        self.calendar
    }

    /// Logs a meal on the requested local day.
    ///
    /// # Errors
    ///
    /// Returns a [`DiaryError`] if the store rejects the entry.
    pub async fn create_meal(
        &self,
        user: &UserId,
        request: CreateMeal,
    ) -> Result<DiaryEntry, DiaryError> {
        let entry = self
            .store
            .insert(NewEntry {
                user_id: user.clone(),
                date: self.calendar.start_of_day(request.date),
                payload: EntryPayload::Meal(request.meal),
            })
            .await?;
        tracing::info!(entry_id = %entry.id, %user, date = %request.date, "meal logged");
        Ok(entry)
    }

    /// Logs a symptom on the requested local day.
    ///
    /// # Errors
    ///
    /// Returns a [`DiaryError`] if the store rejects the entry.
    pub async fn create_symptom(
        &self,
        user: &UserId,
        request: CreateSymptom,
    ) -> Result<DiaryEntry, DiaryError> {
        let entry = self
            .store
            .insert(NewEntry {
                user_id: user.clone(),
                date: self.calendar.start_of_day(request.date),
                payload: EntryPayload::Symptom(request.symptom),
            })
            .await?;
        tracing::info!(entry_id = %entry.id, %user, date = %request.date, "symptom logged");
        Ok(entry)
    }

    /// Fetches one entry.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::EntryNotFound`] if the user has no such entry.
    pub async fn get_entry(&self, user: &UserId, id: EntryId) -> Result<DiaryEntry, DiaryError> {
        tracing::debug!(entry_id = %id, %user, "fetching entry");
        self.store.get(user, id).await
    }

    /// Applies a partial update to an entry's payload.
    ///
    /// The entry keeps its kind: a meal update on a symptom entry (or the
    /// reverse) is refused. An update with no fields only bumps
    /// `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::EntryNotFound`] if the user has no such entry,
    /// [`DiaryError::EntryTypeMismatch`] if the update targets the other
    /// payload, or [`DiaryError::Validation`] if the merged entry breaks a
    /// field constraint.
    pub async fn update_entry(
        &self,
        user: &UserId,
        id: EntryId,
        update: EntryUpdate,
    ) -> Result<DiaryEntry, DiaryError> {
        let mut entry = self.store.get(user, id).await?;
        let actual = entry.kind();
        let mismatch = |requested| DiaryError::EntryTypeMismatch {
            id,
            actual,
            requested,
        };

        match &mut entry.payload {
            EntryPayload::Meal(meal) => {
                if update.symptom.is_some() {
                    return Err(mismatch(EntryKind::Symptom));
                }
                if let Some(patch) = update.meal {
                    patch.apply(meal);
                }
            }
            EntryPayload::Symptom(symptom) => {
                if update.meal.is_some() {
                    return Err(mismatch(EntryKind::Meal));
                }
                if let Some(patch) = update.symptom {
                    patch.apply(symptom);
                }
            }
        }

        let entry = self.store.update(entry).await?;
        tracing::info!(entry_id = %id, %user, kind = %actual, "entry updated");
        Ok(entry)
    }

    /// Hard-deletes an entry.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::EntryNotFound`] if the user has no such entry.
    pub async fn delete_entry(&self, user: &UserId, id: EntryId) -> Result<(), DiaryError> {
        self.store.delete(user, id).await?;
        tracing::info!(entry_id = %id, %user, "entry deleted");
        Ok(())
    }

    /// Lists entries for a single day or an inclusive range of days.
    ///
    /// # Errors
    ///
    /// Returns a [`DiaryError`] on storage failure.
    pub async fn list_entries(
        &self,
        user: &UserId,
        query: ListQuery,
    ) -> Result<Vec<DiaryEntry>, DiaryError> {
        let range = match query.date {
            Some(date) => {
                let (start, end) = self.calendar.day_bounds(date);
                DateRange::between(start, end)
            }
            None => DateRange {
                start: query.start_date.map(|d| self.calendar.start_of_day(d)),
                end: query.end_date.map(|d| self.calendar.end_of_day(d)),
            },
        };
        let entries = self
            .store
            .find(
                user,
                EntryFilter {
                    range,
                    kind: query.kind,
                },
            )
            .await?;
        tracing::debug!(%user, count = entries.len(), "entries listed");
        Ok(entries)
    }

    /// Entries and nutrition totals for one local day.
    ///
    /// # Errors
    ///
    /// Returns a [`DiaryError`] on storage failure.
    pub async fn day_summary(
        &self,
        user: &UserId,
        date: NaiveDate,
    ) -> Result<DaySummary, DiaryError> {
        let (start, end) = self.calendar.day_bounds(date);
        let entries = self
            .store
            .find(
                user,
                EntryFilter {
                    range: DateRange::between(start, end),
                    kind: None,
                },
            )
            .await?;
        tracing::debug!(%user, %date, count = entries.len(), "day summary");
        Ok(DaySummary::build(date, entries))
    }

    /// Entries and per-day counts for one month.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::Validation`] on `month` if it is outside 1–12,
    /// or a [`DiaryError`] on storage failure.
    pub async fn month_summary(
        &self,
        user: &UserId,
        year: i32,
        month: u32,
    ) -> Result<MonthSummary, DiaryError> {
        let invalid = || DiaryError::field("month", "must be between 1 and 12");
        let (start, end) = self.calendar.month_bounds(year, month).ok_or_else(invalid)?;
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let last = days_in_month(year, month)
            .and_then(|n| NaiveDate::from_ymd_opt(year, month, n))
            .ok_or_else(invalid)?;

        let entries = self
            .store
            .find(
                user,
                EntryFilter {
                    range: DateRange::between(start, end),
                    kind: None,
                },
            )
            .await?;
        tracing::debug!(%user, year, month, count = entries.len(), "month summary");
        let days = count_by_day(self.calendar, first, last, &entries);
        Ok(MonthSummary {
            year,
            month,
            entries,
            days,
        })
    }

    /// Meal entries containing the given catalog food.
    ///
    /// # Errors
    ///
    /// Returns a [`DiaryError`] on storage failure.
    pub async fn entries_with_food(
        &self,
        user: &UserId,
        food_id: &str,
    ) -> Result<Vec<DiaryEntry>, DiaryError> {
        let entries = self.store.find_by_food(user, food_id).await?;
        tracing::debug!(%user, food_id, count = entries.len(), "entries with food");
        Ok(entries)
    }

    /// Symptom statistics over the last `days` local days, today included.
    ///
    /// # Errors
    ///
    /// Returns [`DiaryError::Validation`] on `days` unless it is between 1
    /// and [`MAX_OVERVIEW_DAYS`], or a [`DiaryError`] on storage failure.
    pub async fn symptom_overview(
        &self,
        user: &UserId,
        days: u32,
    ) -> Result<SymptomOverview, DiaryError> {
        let out_of_range = || {
            DiaryError::field(
                "days",
                format!("must be a number between 1 and {MAX_OVERVIEW_DAYS}"),
            )
        };
        if !(1..=MAX_OVERVIEW_DAYS).contains(&days) {
            return Err(out_of_range());
        }
        let last = self.calendar.today();
        let first = last
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or_else(out_of_range)?;
        let range = DateRange::between(
            self.calendar.start_of_day(first),
            self.calendar.end_of_day(last),
        );

        let entries = self
            .store
            .find(
                user,
                EntryFilter {
                    range,
                    kind: None,
                },
            )
            .await?;
        let mut overview = SymptomOverview::build(self.calendar, days, first, last, &entries);
        overview.most_intense = self
            .store
            .most_intense_symptoms(user, range, MOST_INTENSE_LIMIT)
            .await?;
        tracing::debug!(%user, days, total = overview.total_symptoms, "symptom overview");
        Ok(overview)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::meal::tests::{lunch, rice};
    use crate::domain::symptom::tests::bloating;
    use crate::domain::{Food, MealType};
    use crate::persistence::MemoryStore;
    use crate::service::requests::{MealPatch, SymptomPatch};
    use chrono::Duration;
    use chrono_tz::America::Sao_Paulo;

    fn service() -> DiaryService {
        DiaryService::new(Arc::new(MemoryStore::new()), LocalCalendar::new(Sao_Paulo))
    }

    fn user() -> UserId {
        let Some(user) = UserId::parse("ana") else {
            panic!("valid user id");
        };
        user
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            panic!("valid date");
        };
        date
    }

    async fn log_meal(svc: &DiaryService, day: NaiveDate) -> DiaryEntry {
        let Ok(entry) = svc
            .create_meal(
                &user(),
                CreateMeal {
                    date: day,
                    meal: lunch(),
                },
            )
            .await
        else {
            panic!("create_meal failed");
        };
        entry
    }

    async fn log_symptom(svc: &DiaryService, day: NaiveDate, intensity: u8) -> DiaryEntry {
        let Ok(entry) = svc
            .create_symptom(
                &user(),
                CreateSymptom {
                    date: day,
                    symptom: bloating(intensity),
                },
            )
            .await
        else {
            panic!("create_symptom failed");
        };
        entry
    }

    #[tokio::test]
    async fn created_entries_are_stamped_at_local_midnight() {
        let svc = service();
        let entry = log_meal(&svc, date(2024, 5, 20)).await;
        assert_eq!(entry.date.to_rfc3339(), "2024-05-20T03:00:00+00:00");
        assert_eq!(svc.calendar().format_date(entry.date), "2024-05-20");
    }

    #[tokio::test]
    async fn update_merges_partial_meal() {
        let svc = service();
        let entry = log_meal(&svc, date(2024, 5, 20)).await;
        let update = EntryUpdate {
            meal: Some(MealPatch {
                meal_type: Some(MealType::Dinner),
                ..MealPatch::default()
            }),
            symptom: None,
        };
        let Ok(updated) = svc.update_entry(&user(), entry.id, update).await else {
            panic!("update failed");
        };
        let Some(meal) = updated.payload.as_meal() else {
            panic!("still a meal");
        };
        assert_eq!(meal.meal_type, MealType::Dinner);
        assert_eq!(meal.time, "12:30");
        assert_eq!(updated.created_at, entry.created_at);
    }

    #[tokio::test]
    async fn update_cannot_switch_kind() {
        let svc = service();
        let entry = log_meal(&svc, date(2024, 5, 20)).await;
        let update = EntryUpdate {
            meal: None,
            symptom: Some(SymptomPatch::default()),
        };
        let result = svc.update_entry(&user(), entry.id, update).await;
        assert!(matches!(
            result,
            Err(DiaryError::EntryTypeMismatch {
                actual: EntryKind::Meal,
                requested: EntryKind::Symptom,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn merged_update_is_validated_before_commit() {
        let svc = service();
        let entry = log_meal(&svc, date(2024, 5, 20)).await;
        let update = EntryUpdate {
            meal: Some(MealPatch {
                foods: Some(Vec::<Food>::new()),
                ..MealPatch::default()
            }),
            symptom: None,
        };
        let result = svc.update_entry(&user(), entry.id, update).await;
        let Err(DiaryError::Validation(violations)) = result else {
            panic!("expected a validation failure");
        };
        assert_eq!(
            violations.first().map(|v| v.field.as_str()),
            Some("meal.foods")
        );
        let Ok(stored) = svc.get_entry(&user(), entry.id).await else {
            panic!("entry should survive");
        };
        assert_eq!(stored.payload.as_meal().map(|m| m.foods.len()), Some(1));
    }

    #[tokio::test]
    async fn list_by_day_range_and_kind() {
        let svc = service();
        log_meal(&svc, date(2024, 5, 19)).await;
        log_meal(&svc, date(2024, 5, 20)).await;
        log_symptom(&svc, date(2024, 5, 20), 3).await;
        log_symptom(&svc, date(2024, 5, 22), 2).await;

        let one_day = ListQuery {
            date: Some(date(2024, 5, 20)),
            ..ListQuery::default()
        };
        let Ok(entries) = svc.list_entries(&user(), one_day).await else {
            panic!("list failed");
        };
        assert_eq!(entries.len(), 2);

        let range = ListQuery {
            start_date: Some(date(2024, 5, 20)),
            end_date: Some(date(2024, 5, 22)),
            kind: Some(EntryKind::Symptom),
            ..ListQuery::default()
        };
        let Ok(entries) = svc.list_entries(&user(), range).await else {
            panic!("list failed");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries.first().map(|e| svc.calendar().format_date(e.date)),
            Some("2024-05-22".to_string())
        );

        let Ok(everything) = svc.list_entries(&user(), ListQuery::default()).await else {
            panic!("list failed");
        };
        assert_eq!(everything.len(), 4);
    }

    #[tokio::test]
    async fn day_summary_sums_nutrition() {
        let svc = service();
        let mut meal = lunch();
        meal.foods = vec![rice(Some(crate::domain::Nutrition {
            calories: 300.0,
            protein: 6.0,
            ..crate::domain::Nutrition::default()
        }))];
        let created = svc
            .create_meal(
                &user(),
                CreateMeal {
                    date: date(2024, 5, 20),
                    meal,
                },
            )
            .await;
        assert!(created.is_ok());
        log_symptom(&svc, date(2024, 5, 20), 4).await;
        log_meal(&svc, date(2024, 5, 21)).await;

        let Ok(summary) = svc.day_summary(&user(), date(2024, 5, 20)).await else {
            panic!("summary failed");
        };
        assert_eq!(summary.meal_count, 1);
        assert_eq!(summary.symptom_count, 1);
        assert!((summary.nutrition_totals.calories - 300.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn month_summary_has_a_row_per_day() {
        let svc = service();
        log_meal(&svc, date(2024, 2, 1)).await;
        log_symptom(&svc, date(2024, 2, 29), 2).await;
        log_meal(&svc, date(2024, 3, 1)).await;

        let Ok(summary) = svc.month_summary(&user(), 2024, 2).await else {
            panic!("summary failed");
        };
        assert_eq!(summary.days.len(), 29);
        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.days.last().map(|d| d.symptoms), Some(1));

        assert!(matches!(
            svc.month_summary(&user(), 2024, 13).await,
            Err(DiaryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn overview_covers_trailing_window() {
        let svc = service();
        let today = svc.calendar().today();
        log_symptom(&svc, today, 2).await;
        log_symptom(&svc, today, 5).await;
        log_symptom(&svc, today - Duration::days(10), 4).await;

        let mut bad = lunch();
        if let Some(food) = bad.foods.first_mut() {
            food.marked_as_bad = true;
        }
        let created = svc
            .create_meal(
                &user(),
                CreateMeal {
                    date: today,
                    meal: bad,
                },
            )
            .await;
        assert!(created.is_ok());

        let Ok(overview) = svc.symptom_overview(&user(), 7).await else {
            panic!("overview failed");
        };
        assert_eq!(overview.total_symptoms, 2);
        assert!((overview.average_intensity - 3.5).abs() < f64::EPSILON);
        assert_eq!(overview.by_day.len(), 7);
        assert_eq!(overview.bad_foods.len(), 1);
        assert_eq!(
            overview
                .most_intense
                .first()
                .and_then(|e| e.payload.as_symptom())
                .map(|s| s.intensity),
            Some(5)
        );

        assert!(svc.symptom_overview(&user(), 0).await.is_err());
    }

    #[tokio::test]
    async fn overview_rejects_windows_beyond_a_year() {
        let svc = service();
        for days in [MAX_OVERVIEW_DAYS + 1, u32::MAX] {
            let Err(DiaryError::Validation(violations)) = svc.symptom_overview(&user(), days).await
            else {
                panic!("window of {days} days accepted");
            };
            assert_eq!(violations.first().map(|f| f.field.as_str()), Some("days"));
        }
        assert!(svc.symptom_overview(&user(), MAX_OVERVIEW_DAYS).await.is_ok());
    }

    #[tokio::test]
    async fn food_lookup_and_delete() {
        let svc = service();
        let entry = log_meal(&svc, date(2024, 5, 20)).await;
        let Ok(found) = svc.entries_with_food(&user(), "food-rice").await else {
            panic!("lookup failed");
        };
        assert_eq!(found.len(), 1);

        assert!(svc.delete_entry(&user(), entry.id).await.is_ok());
        assert!(matches!(
            svc.get_entry(&user(), entry.id).await,
            Err(DiaryError::EntryNotFound(_))
        ));
    }
}
