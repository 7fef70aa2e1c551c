//! The diary entry aggregate.
//!
//! An entry is either a meal or a symptom. The choice is carried by
//! [`EntryPayload`], so an entry can never claim to be a meal without
//! holding one. On the wire and in storage the same record is flattened
//! into an [`EntryDocument`] with a `type` flag and two optional payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::entry_document::EntryDocument;
use super::meal::Meal;
use super::symptom::Symptom;
use super::{EntryId, UserId};

/// Discriminant of a diary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A logged meal.
    Meal,
    /// A logged symptom.
    Symptom,
}

impl EntryKind {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Meal => "meal",
            Self::Symptom => "symptom",
        }
    }

    /// Looks up a kind by wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "meal" => Some(Self::Meal),
            "symptom" => Some(Self::Symptom),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an entry records.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryPayload {
    /// Meal details.
    Meal(Meal),
    /// Symptom details.
    Symptom(Symptom),
}

impl EntryPayload {
    /// Discriminant of this payload.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::Meal(_) => EntryKind::Meal,
            Self::Symptom(_) => EntryKind::Symptom,
        }
    }

    /// Meal details, if this is a meal.
    #[must_use]
    pub const fn as_meal(&self) -> Option<&Meal> {
        match self {
            Self::Meal(meal) => Some(meal),
            Self::Symptom(_) => None,
        }
    }

    /// Symptom details, if this is a symptom.
    #[must_use]
    pub const fn as_symptom(&self) -> Option<&Symptom> {
        match self {
            Self::Symptom(symptom) => Some(symptom),
            Self::Meal(_) => None,
        }
    }
}

/// A persisted diary entry.
///
/// Serializes through [`EntryDocument`], so clients and the store see the
/// flat `type` / `meal` / `symptom` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "EntryDocument", try_from = "EntryDocument")]
pub struct DiaryEntry {
    /// Store-assigned identifier.
    pub id: EntryId,
    /// Owning user.
    pub user_id: UserId,
    /// Local start of the day the event belongs to.
    pub date: DateTime<Utc>,
    /// Meal or symptom details.
    pub payload: EntryPayload,
    /// Set by the store on insert.
    pub created_at: DateTime<Utc>,
    /// Set by the store on every write.
    pub updated_at: DateTime<Utc>,
}

impl DiaryEntry {
    /// Discriminant of this entry.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.payload.kind()
    }
}

/// An entry that has not been stored yet.
///
/// The store assigns the id and both timestamps when it inserts one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    /// Owning user.
    pub user_id: UserId,
    /// Local start of the day the event belongs to.
    pub date: DateTime<Utc>,
    /// Meal or symptom details.
    pub payload: EntryPayload,
}

impl NewEntry {
    /// Stamps the entry with an id and creation time.
    #[must_use]
    pub fn into_entry(self, id: EntryId, now: DateTime<Utc>) -> DiaryEntry {
        DiaryEntry {
            id,
            user_id: self.user_id,
            date: self.date,
            payload: self.payload,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::meal::tests::lunch;
    use crate::domain::symptom::tests::bloating;

    fn user() -> UserId {
        let Some(user) = UserId::parse("user-1") else {
            panic!("valid user id");
        };
        user
    }

    #[test]
    fn payload_kind_matches_variant() {
        assert_eq!(EntryPayload::Meal(lunch()).kind(), EntryKind::Meal);
        assert_eq!(EntryPayload::Symptom(bloating(3)).kind(), EntryKind::Symptom);
        assert!(EntryPayload::Meal(lunch()).as_symptom().is_none());
        assert!(EntryPayload::Symptom(bloating(3)).as_meal().is_none());
    }

    #[test]
    fn new_entry_is_stamped_once() {
        let now = Utc::now();
        let entry = NewEntry {
            user_id: user(),
            date: now,
            payload: EntryPayload::Meal(lunch()),
        }
        .into_entry(EntryId::new(), now);
        assert_eq!(entry.created_at, entry.updated_at);
        assert_eq!(entry.kind(), EntryKind::Meal);
    }

    #[test]
    fn serializes_as_flat_document() {
        let now = Utc::now();
        let entry = NewEntry {
            user_id: user(),
            date: now,
            payload: EntryPayload::Symptom(bloating(4)),
        }
        .into_entry(EntryId::new(), now);

        let json = serde_json::to_value(&entry).unwrap_or_default();
        assert_eq!(json["type"], "symptom");
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["symptom"]["intensity"], 4);
        assert!(json.get("meal").is_none());

        let Ok(back) = serde_json::from_value::<DiaryEntry>(json) else {
            panic!("document should convert back");
        };
        assert_eq!(back, entry);
    }

    #[test]
    fn deserializing_a_payloadless_document_fails() {
        let json = serde_json::json!({
            "id": EntryId::new(),
            "userId": "user-1",
            "type": "meal",
            "date": "2024-05-20T03:00:00Z",
            "createdAt": "2024-05-20T03:00:00Z",
            "updatedAt": "2024-05-20T03:00:00Z",
        });
        let err = serde_json::from_value::<DiaryEntry>(json);
        assert!(err.is_err());
    }
}
