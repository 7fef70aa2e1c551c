//! Validated inputs accepted by [`DiaryService`](super::DiaryService).
//!
//! Values of these types are produced by the request parsers in
//! `api::dto` after every field constraint has been checked.

use chrono::NaiveDate;

use crate::domain::{EntryKind, Food, Meal, MealType, Symptom, SymptomType};

/// A meal to log on a local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMeal {
    /// Local day the meal belongs to.
    pub date: NaiveDate,
    /// Meal details.
    pub meal: Meal,
}

/// A symptom to log on a local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSymptom {
    /// Local day the symptom belongs to.
    pub date: NaiveDate,
    /// Symptom details.
    pub symptom: Symptom,
}

/// Partial replacement of meal fields. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealPatch {
    /// New meal kind.
    pub meal_type: Option<MealType>,
    /// New clock time.
    pub time: Option<String>,
    /// New food list; replaces the old one as a whole.
    pub foods: Option<Vec<Food>>,
    /// New notes.
    pub notes: Option<String>,
}

impl MealPatch {
    /// Writes every present field onto `meal`.
    pub fn apply(self, meal: &mut Meal) {
        if let Some(meal_type) = self.meal_type {
            meal.meal_type = meal_type;
        }
        if let Some(time) = self.time {
            meal.time = time;
        }
        if let Some(foods) = self.foods {
            meal.foods = foods;
        }
        if let Some(notes) = self.notes {
            meal.notes = Some(notes);
        }
    }
}

/// Partial replacement of symptom fields. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymptomPatch {
    /// New symptom kind.
    pub symptom_type: Option<SymptomType>,
    /// New intensity.
    pub intensity: Option<u8>,
    /// New clock time.
    pub time: Option<String>,
    /// New duration in minutes.
    pub duration: Option<f64>,
    /// New notes.
    pub notes: Option<String>,
}

impl SymptomPatch {
    /// Writes every present field onto `symptom`.
    pub fn apply(self, symptom: &mut Symptom) {
        if let Some(symptom_type) = self.symptom_type {
            symptom.symptom_type = symptom_type;
        }
        if let Some(intensity) = self.intensity {
            symptom.intensity = intensity;
        }
        if let Some(time) = self.time {
            symptom.time = time;
        }
        if let Some(duration) = self.duration {
            symptom.duration = Some(duration);
        }
        if let Some(notes) = self.notes {
            symptom.notes = Some(notes);
        }
    }
}

/// Partial update of an entry. Carries no discriminant: the entry keeps
/// the kind it was created with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    /// Changes to a meal entry.
    pub meal: Option<MealPatch>,
    /// Changes to a symptom entry.
    pub symptom: Option<SymptomPatch>,
}

/// Which entries to list.
///
/// `date` selects one local day and wins over the range bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Single local day.
    pub date: Option<NaiveDate>,
    /// First local day of an inclusive range.
    pub start_date: Option<NaiveDate>,
    /// Last local day of an inclusive range.
    pub end_date: Option<NaiveDate>,
    /// Kind filter; `None` lists both kinds.
    pub kind: Option<EntryKind>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meal::tests::{lunch, rice};
    use crate::domain::symptom::tests::bloating;

    #[test]
    fn meal_patch_replaces_only_present_fields() {
        let mut meal = lunch();
        MealPatch {
            time: Some("13:00".to_string()),
            foods: Some(vec![rice(None), rice(None)]),
            ..MealPatch::default()
        }
        .apply(&mut meal);
        assert_eq!(meal.meal_type, MealType::Lunch);
        assert_eq!(meal.time, "13:00");
        assert_eq!(meal.foods.len(), 2);
        assert_eq!(meal.notes, None);
    }

    #[test]
    fn empty_symptom_patch_is_a_no_op() {
        let mut symptom = bloating(3);
        SymptomPatch::default().apply(&mut symptom);
        assert_eq!(symptom, bloating(3));

        SymptomPatch {
            intensity: Some(5),
            notes: Some("after lunch".to_string()),
            ..SymptomPatch::default()
        }
        .apply(&mut symptom);
        assert_eq!(symptom.intensity, 5);
        assert_eq!(symptom.notes.as_deref(), Some("after lunch"));
        assert_eq!(symptom.symptom_type, SymptomType::Bloating);
    }
}
