//! Symptom payload: kind, intensity, and timing of a GI symptom.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{Violations, check_notes, check_time, join_path};

/// Lowest accepted intensity.
pub const MIN_INTENSITY: u8 = 1;

/// Highest accepted intensity.
pub const MAX_INTENSITY: u8 = 5;

/// Closed set of symptom kinds a user can log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SymptomType {
    /// Abdominal distension.
    Bloating,
    /// Stomach or belly pain.
    AbdominalPain,
    /// Flatulence.
    Gas,
    /// Loose stools.
    Diarrhea,
    /// Difficulty passing stools.
    Constipation,
    /// Queasiness.
    Nausea,
    /// Burning sensation in the chest.
    Heartburn,
    /// Acid reflux.
    Reflux,
    /// Intestinal cramps.
    Cramps,
    /// Tiredness after eating.
    Fatigue,
    /// Anything not listed above.
    Other,
}

impl SymptomType {
    /// Every symptom kind, in wire order.
    pub const ALL: [Self; 11] = [
        Self::Bloating,
        Self::AbdominalPain,
        Self::Gas,
        Self::Diarrhea,
        Self::Constipation,
        Self::Nausea,
        Self::Heartburn,
        Self::Reflux,
        Self::Cramps,
        Self::Fatigue,
        Self::Other,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bloating => "bloating",
            Self::AbdominalPain => "abdominal_pain",
            Self::Gas => "gas",
            Self::Diarrhea => "diarrhea",
            Self::Constipation => "constipation",
            Self::Nausea => "nausea",
            Self::Heartburn => "heartburn",
            Self::Reflux => "reflux",
            Self::Cramps => "cramps",
            Self::Fatigue => "fatigue",
            Self::Other => "other",
        }
    }

    /// Looks up a symptom kind by wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for SymptomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symptom payload of a diary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Symptom {
    /// Symptom kind.
    #[serde(rename = "type")]
    pub symptom_type: SymptomType,
    /// Severity from 1 (barely noticeable) to 5 (severe).
    pub intensity: u8,
    /// Clock time of onset (`HH:MM`).
    pub time: String,
    /// How long it lasted, in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Optional free text, at most 500 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Symptom {
    /// Checks every field constraint, recording violations under `path`.
    pub fn collect_violations(&self, path: &str, violations: &mut Violations) {
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&self.intensity) {
            violations.push(
                join_path(path, "intensity"),
                format!("must be an integer between {MIN_INTENSITY} and {MAX_INTENSITY}"),
            );
        }
        check_time(violations, join_path(path, "time"), &self.time);
        if let Some(minutes) = self.duration
            && !(minutes.is_finite() && minutes >= 0.0)
        {
            violations.push(join_path(path, "duration"), "must be a number >= 0");
        }
        check_notes(violations, join_path(path, "notes"), self.notes.as_deref());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn bloating(intensity: u8) -> Symptom {
        Symptom {
            symptom_type: SymptomType::Bloating,
            intensity,
            time: "14:00".to_string(),
            duration: Some(45.0),
            notes: None,
        }
    }

    #[test]
    fn closed_set_has_eleven_kinds() {
        assert_eq!(SymptomType::ALL.len(), 11);
        for t in SymptomType::ALL {
            assert_eq!(SymptomType::parse(t.as_str()), Some(t));
        }
        assert_eq!(SymptomType::parse("headache"), None);
    }

    #[test]
    fn wire_names_match_serde() {
        for t in SymptomType::ALL {
            let json = serde_json::to_string(&t).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn duration_must_be_a_non_negative_number() {
        for (duration, ok) in [(0.0, true), (2.5, true), (-1.0, false), (f64::NAN, false)] {
            let mut symptom = bloating(3);
            symptom.duration = Some(duration);
            let mut v = Violations::new();
            symptom.collect_violations("symptom", &mut v);
            assert_eq!(v.is_empty(), ok, "duration {duration}");
        }
    }

    #[test]
    fn intensity_bounds_are_inclusive() {
        for (intensity, ok) in [(0, false), (1, true), (3, true), (5, true), (6, false)] {
            let mut v = Violations::new();
            bloating(intensity).collect_violations("symptom", &mut v);
            assert_eq!(v.is_empty(), ok, "intensity {intensity}");
        }
    }

    #[test]
    fn bad_time_is_reported() {
        let mut symptom = bloating(2);
        symptom.time = "noon".to_string();
        let mut v = Violations::new();
        symptom.collect_violations("symptom", &mut v);
        let items = v.into_vec();
        assert_eq!(items.first().map(|i| i.field.as_str()), Some("symptom.time"));
    }
}
