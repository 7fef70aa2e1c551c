//! Service layer: business logic orchestration.
//!
//! [`DiaryService`] turns validated requests into store calls and
//! computes the day, month and symptom read models on top of them.

pub mod diary_service;
pub mod requests;
pub mod summaries;

pub use diary_service::DiaryService;
pub use requests::{CreateMeal, CreateSymptom, EntryUpdate, ListQuery, MealPatch, SymptomPatch};
pub use summaries::{
    BadFood, MAX_OVERVIEW_DAYS, DayCount, DaySummary, DaySymptomCount, MonthSummary, SymptomOverview,
    SymptomTypeStats,
};
