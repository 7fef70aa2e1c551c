//! Read models computed by [`DiaryService`](super::DiaryService).

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DiaryEntry, EntryDocument, EntryKind, Nutrition, SymptomType};
use crate::util::LocalCalendar;
use crate::util::date::DATE_FORMAT;

/// Number of entries shown in [`SymptomOverview::most_intense`].
pub const MOST_INTENSE_LIMIT: usize = 5;

/// Longest symptom overview window, in days.
pub const MAX_OVERVIEW_DAYS: u32 = 365;

/// Everything logged on one local day.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    /// The day, `YYYY-MM-DD`.
    pub date: String,
    /// Entries of the day, newest first.
    #[schema(value_type = Vec<EntryDocument>)]
    pub entries: Vec<DiaryEntry>,
    /// Sum of every meal's nutrition snapshots.
    pub nutrition_totals: Nutrition,
    /// Number of meal entries.
    pub meal_count: usize,
    /// Number of symptom entries.
    pub symptom_count: usize,
}

impl DaySummary {
    pub(crate) fn build(date: NaiveDate, entries: Vec<DiaryEntry>) -> Self {
        let mut nutrition_totals = Nutrition::default();
        let mut meal_count = 0;
        let mut symptom_count = 0;
        for entry in &entries {
            match entry.kind() {
                EntryKind::Meal => meal_count += 1,
                EntryKind::Symptom => symptom_count += 1,
            }
            if let Some(meal) = entry.payload.as_meal() {
                nutrition_totals += &meal.nutrition_total();
            }
        }
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            entries,
            nutrition_totals,
            meal_count,
            symptom_count,
        }
    }
}

/// Meal and symptom counts for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayCount {
    /// The day, `YYYY-MM-DD`.
    pub date: String,
    /// Meal entries logged that day.
    pub meals: usize,
    /// Symptom entries logged that day.
    pub symptoms: usize,
}

/// Everything logged in one month.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    /// Calendar year.
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    /// Entries of the month, newest first.
    #[schema(value_type = Vec<EntryDocument>)]
    pub entries: Vec<DiaryEntry>,
    /// One row per day of the month, in calendar order.
    pub days: Vec<DayCount>,
}

/// Per-day counts for every day from `first` to `last`, inclusive.
pub(crate) fn count_by_day(
    calendar: LocalCalendar,
    first: NaiveDate,
    last: NaiveDate,
    entries: &[DiaryEntry],
) -> Vec<DayCount> {
    let mut counts: BTreeMap<NaiveDate, (usize, usize)> = first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|d| (d, (0, 0)))
        .collect();
    for entry in entries {
        if let Some(slot) = counts.get_mut(&calendar.local_date(entry.date)) {
            match entry.kind() {
                EntryKind::Meal => slot.0 += 1,
                EntryKind::Symptom => slot.1 += 1,
            }
        }
    }
    counts
        .into_iter()
        .map(|(date, (meals, symptoms))| DayCount {
            date: date.format(DATE_FORMAT).to_string(),
            meals,
            symptoms,
        })
        .collect()
}

/// Aggregates for one symptom kind.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SymptomTypeStats {
    /// Symptom kind.
    #[serde(rename = "type")]
    pub symptom_type: SymptomType,
    /// Occurrences in the window.
    pub count: usize,
    /// Mean intensity, rounded to two decimals.
    pub average_intensity: f64,
    /// Highest intensity seen.
    pub max_intensity: u8,
}

/// Symptom count for one day of the overview window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySymptomCount {
    /// The day, `YYYY-MM-DD`.
    pub date: String,
    /// Symptom entries logged that day.
    pub count: usize,
}

/// A food the user marked as bad, with how often it was eaten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadFood {
    /// Catalog id.
    pub food_id: String,
    /// Name as most recently logged.
    pub food_name: String,
    /// Times it was eaten and marked as bad inside the window.
    pub occurrences: usize,
}

/// Symptom statistics over a trailing window of days.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SymptomOverview {
    /// Window length in days, today included.
    pub days: u32,
    /// First day of the window, `YYYY-MM-DD`.
    pub start_date: String,
    /// Last day of the window (today), `YYYY-MM-DD`.
    pub end_date: String,
    /// Symptom entries in the window.
    pub total_symptoms: usize,
    /// Mean intensity over all symptoms, rounded to two decimals; `0` when
    /// there are none.
    pub average_intensity: f64,
    /// Per-kind breakdown, most frequent first.
    pub by_type: Vec<SymptomTypeStats>,
    /// One row per day of the window, in calendar order.
    pub by_day: Vec<DaySymptomCount>,
    /// Foods marked as bad inside the window, most frequent first.
    pub bad_foods: Vec<BadFood>,
    /// Most intense symptom entries of the window.
    #[schema(value_type = Vec<EntryDocument>)]
    pub most_intense: Vec<DiaryEntry>,
}

impl SymptomOverview {
    /// Aggregates `entries` (already limited to the window) into an
    /// overview. `most_intense` is filled in by the caller.
    pub(crate) fn build(
        calendar: LocalCalendar,
        days: u32,
        first: NaiveDate,
        last: NaiveDate,
        entries: &[DiaryEntry],
    ) -> Self {
        let symptoms: Vec<_> = entries
            .iter()
            .filter_map(|e| e.payload.as_symptom())
            .collect();
        let total_symptoms = symptoms.len();
        let intensity_sum: u32 = symptoms.iter().map(|s| u32::from(s.intensity)).sum();

        let mut per_kind: BTreeMap<SymptomType, (usize, u32, u8)> = BTreeMap::new();
        for symptom in &symptoms {
            let slot = per_kind.entry(symptom.symptom_type).or_insert((0, 0, 0));
            slot.0 += 1;
            slot.1 += u32::from(symptom.intensity);
            slot.2 = slot.2.max(symptom.intensity);
        }
        let mut by_type: Vec<SymptomTypeStats> = per_kind
            .into_iter()
            .map(|(symptom_type, (count, sum, max))| SymptomTypeStats {
                symptom_type,
                count,
                average_intensity: mean(sum, count),
                max_intensity: max,
            })
            .collect();
        // BTreeMap order breaks ties by kind; the stable sort keeps it.
        by_type.sort_by(|a, b| b.count.cmp(&a.count));

        let by_day = count_by_day(calendar, first, last, entries)
            .into_iter()
            .map(|day| DaySymptomCount {
                date: day.date,
                count: day.symptoms,
            })
            .collect();

        Self {
            days,
            start_date: first.format(DATE_FORMAT).to_string(),
            end_date: last.format(DATE_FORMAT).to_string(),
            total_symptoms,
            average_intensity: mean(intensity_sum, total_symptoms),
            by_type,
            by_day,
            bad_foods: bad_foods(entries),
            most_intense: Vec::new(),
        }
    }
}

/// Foods marked as bad across the meal entries, most frequent first.
///
/// `entries` must be ordered newest first so the recorded name is the
/// latest one.
fn bad_foods(entries: &[DiaryEntry]) -> Vec<BadFood> {
    let mut seen: HashMap<&str, BadFood> = HashMap::new();
    let marked = entries
        .iter()
        .filter_map(|e| e.payload.as_meal())
        .flat_map(|m| m.foods.iter())
        .filter(|f| f.marked_as_bad);
    for food in marked {
        seen.entry(food.food_id.as_str())
            .or_insert_with(|| BadFood {
                food_id: food.food_id.clone(),
                food_name: food.food_name.clone(),
                occurrences: 0,
            })
            .occurrences += 1;
    }
    let mut foods: Vec<BadFood> = seen.into_values().collect();
    foods.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.food_name.cmp(&b.food_name))
            .then_with(|| a.food_id.cmp(&b.food_id))
    });
    foods
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: u32, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let raw = f64::from(sum) / count as f64;
    (raw * 100.0).round() / 100.0
}
