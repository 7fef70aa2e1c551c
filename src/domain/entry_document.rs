//! Flat document shape of a diary entry and its pre-commit check.
//!
//! This is the shape exchanged with clients and stored by the database:
//! a `type` flag next to two optional payload fields. Only the payload
//! named by `type` is required. A stray second payload is tolerated and
//! dropped when the document becomes a [`DiaryEntry`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::diary_entry::{DiaryEntry, EntryKind, EntryPayload};
use super::meal::Meal;
use super::symptom::Symptom;
use super::{EntryId, UserId};
use crate::error::DiaryError;
use crate::validation::{FieldViolation, Violations};

/// Diary entry as stored and as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryDocument {
    /// Store-assigned identifier.
    pub id: EntryId,
    /// Owning user.
    pub user_id: UserId,
    /// Which payload is meaningful.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Local start of the day the event belongs to.
    pub date: DateTime<Utc>,
    /// Meal details; required when `type` is `meal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal: Option<Meal>,
    /// Symptom details; required when `type` is `symptom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom: Option<Symptom>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl EntryDocument {
    /// Confirms the payload named by `type` is present.
    ///
    /// # Errors
    ///
    /// Returns a violation on `meal` or `symptom` when the required payload
    /// is missing.
    pub fn check_payload(&self) -> Result<(), FieldViolation> {
        match self.kind {
            EntryKind::Meal if self.meal.is_none() => Err(FieldViolation::new(
                "meal",
                "meal details are required when type is meal",
            )),
            EntryKind::Symptom if self.symptom.is_none() => Err(FieldViolation::new(
                "symptom",
                "symptom details are required when type is symptom",
            )),
            _ => Ok(()),
        }
    }

    /// Full pre-commit gate: payload presence plus every field constraint
    /// of whichever payloads are present.
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    pub fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Violations::new();
        if let Err(missing) = self.check_payload() {
            violations.extend([missing]);
        }
        if let Some(meal) = &self.meal {
            meal.collect_violations("meal", &mut violations);
        }
        if let Some(symptom) = &self.symptom {
            symptom.collect_violations("symptom", &mut violations);
        }
        violations.finish(())
    }
}

impl From<DiaryEntry> for EntryDocument {
    fn from(entry: DiaryEntry) -> Self {
        let kind = entry.kind();
        let (meal, symptom) = match entry.payload {
            EntryPayload::Meal(meal) => (Some(meal), None),
            EntryPayload::Symptom(symptom) => (None, Some(symptom)),
        };
        Self {
            id: entry.id,
            user_id: entry.user_id,
            kind,
            date: entry.date,
            meal,
            symptom,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

impl TryFrom<EntryDocument> for DiaryEntry {
    type Error = DiaryError;

    fn try_from(document: EntryDocument) -> Result<Self, Self::Error> {
        document.validate().map_err(DiaryError::Validation)?;
        let payload = match (document.kind, document.meal, document.symptom) {
            (EntryKind::Meal, Some(meal), _) => EntryPayload::Meal(meal),
            (EntryKind::Symptom, _, Some(symptom)) => EntryPayload::Symptom(symptom),
            _ => {
                return Err(DiaryError::Internal(
                    "validated document lost its payload".to_string(),
                ));
            }
        };
        Ok(Self {
            id: document.id,
            user_id: document.user_id,
            date: document.date,
            payload,
            created_at: document.created_at,
            updated_at: document.updated_at,
        })
    }
}
