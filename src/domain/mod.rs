//! Domain layer: the diary entry model and its identifiers.
//!
//! [`DiaryEntry`] is the typed aggregate used everywhere inside the
//! service. [`EntryDocument`] is its flat wire/storage shape and owns the
//! pre-commit validation that guards every write.

pub mod diary_entry;
pub mod entry_document;
pub mod entry_id;
pub mod meal;
pub mod symptom;
pub mod user_id;

pub use diary_entry::{DiaryEntry, EntryKind, EntryPayload, NewEntry};
pub use entry_document::EntryDocument;
pub use entry_id::EntryId;
pub use meal::{Food, Meal, MealType, Nutrition};
pub use symptom::{Symptom, SymptomType};
pub use user_id::UserId;
