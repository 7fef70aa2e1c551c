//! Field-addressed validation failures.
//!
//! Request parsing and the pre-commit document check both report problems
//! as a list of [`FieldViolation`]s instead of stopping at the first one.
//! [`Violations`] is the small accumulator they share.

use serde::Serialize;
use utoipa::ToSchema;

use crate::util::date::is_valid_time_format;

/// Longest free-text note accepted on meals and symptoms.
pub const MAX_NOTES_LEN: usize = 500;

/// Message used for every clock-time field.
pub const TIME_FORMAT_MESSAGE: &str = "must be a time in HH:MM format";

/// Message used for every calendar-date field.
pub const DATE_FORMAT_MESSAGE: &str = "must be a valid date in YYYY-MM-DD format";

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    /// Dotted path to the offending field (e.g. `meal.foods[0].foodName`).
    pub field: String,
    /// Human-readable description of the constraint.
    pub message: String,
}

impl FieldViolation {
    /// Creates a violation for `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Accumulates violations while a payload is walked.
#[derive(Debug, Default)]
pub struct Violations {
    items: Vec<FieldViolation>,
}

impl Violations {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.items.push(FieldViolation::new(field, message));
    }

    /// Appends violations gathered elsewhere.
    pub fn extend(&mut self, other: impl IntoIterator<Item = FieldViolation>) {
        self.items.extend(other);
    }

    /// Number of violations recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `Ok(value)` when empty, otherwise every recorded violation.
    ///
    /// # Errors
    ///
    /// Returns the collected violations if at least one was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, Vec<FieldViolation>> {
        if self.items.is_empty() {
            Ok(value)
        } else {
            Err(self.items)
        }
    }

    /// Consumes the accumulator, returning the recorded violations.
    #[must_use]
    pub fn into_vec(self) -> Vec<FieldViolation> {
        self.items
    }
}

/// Joins a parent path and a child key (`meal` + `time` → `meal.time`).
#[must_use]
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

/// Records a violation unless `time` matches `HH:MM`.
pub fn check_time(violations: &mut Violations, field: String, time: &str) {
    if !is_valid_time_format(time) {
        violations.push(field, TIME_FORMAT_MESSAGE);
    }
}

/// Records a violation if `notes` exceeds [`MAX_NOTES_LEN`] characters.
pub fn check_notes(violations: &mut Violations, field: String, notes: Option<&str>) {
    if notes.is_some_and(|n| n.chars().count() > MAX_NOTES_LEN) {
        violations.push(field, format!("must be at most {MAX_NOTES_LEN} characters"));
    }
}
