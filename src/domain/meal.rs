//! Meal payload: meal kind, clock time, and the foods eaten.

use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{Violations, check_notes, check_time, join_path};

/// Which meal of the day an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// Morning meal.
    Breakfast,
    /// Midday meal.
    Lunch,
    /// Evening meal.
    Dinner,
    /// Anything in between.
    Snack,
}

impl MealType {
    /// Every meal kind, in wire order.
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snack];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    /// Looks up a meal kind by wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nutrition snapshot computed when the meal was logged.
///
/// Values are stored as supplied and never recomputed. Missing members
/// deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Nutrition {
    /// Energy in kcal.
    pub calories: f64,
    /// Carbohydrates in grams.
    pub carbs: f64,
    /// Protein in grams.
    pub protein: f64,
    /// Fat in grams.
    pub fat: f64,
    /// Sugar in grams.
    pub sugar: f64,
    /// Fiber in grams.
    pub fiber: f64,
    /// Sodium in milligrams.
    pub sodium: f64,
}

impl Nutrition {
    /// Field names paired with their values, in wire order.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("calories", self.calories),
            ("carbs", self.carbs),
            ("protein", self.protein),
            ("fat", self.fat),
            ("sugar", self.sugar),
            ("fiber", self.fiber),
            ("sodium", self.sodium),
        ]
    }
}

impl AddAssign<&Nutrition> for Nutrition {
    fn add_assign(&mut self, rhs: &Nutrition) {
        self.calories += rhs.calories;
        self.carbs += rhs.carbs;
        self.protein += rhs.protein;
        self.fat += rhs.fat;
        self.sugar += rhs.sugar;
        self.fiber += rhs.fiber;
        self.sodium += rhs.sodium;
    }
}

/// A food eaten as part of a meal. Embedded, never addressed on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    /// Reference into the external food catalog.
    pub food_id: String,
    /// Display name at the time of logging.
    pub food_name: String,
    /// Free-text portion ("1 cup", "half a plate").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion: Option<String>,
    /// Weight eaten in grams.
    #[serde(rename = "quantity_g", default, skip_serializing_if = "Option::is_none")]
    pub quantity_g: Option<f64>,
    /// User suspects this food triggers symptoms.
    #[serde(default)]
    pub marked_as_bad: bool,
    /// Nutrition snapshot for the eaten quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_nutrition: Option<Nutrition>,
}

impl Food {
    fn collect_violations(&self, path: &str, violations: &mut Violations) {
        if self.food_id.trim().is_empty() {
            violations.push(join_path(path, "foodId"), "is required");
        }
        if self.food_name.trim().is_empty() {
            violations.push(join_path(path, "foodName"), "is required");
        }
        if let Some(q) = self.quantity_g
            && !(q.is_finite() && q >= 0.0)
        {
            violations.push(join_path(path, "quantity_g"), "must be a number >= 0");
        }
        if let Some(nutrition) = &self.calculated_nutrition {
            let base = join_path(path, "calculatedNutrition");
            for (name, value) in nutrition.fields() {
                if !(value.is_finite() && value >= 0.0) {
                    violations.push(join_path(&base, name), "must be a number >= 0");
                }
            }
        }
    }
}

/// Meal payload of a diary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Meal {
    /// Meal kind.
    #[serde(rename = "type")]
    pub meal_type: MealType,
    /// Clock time (`HH:MM`).
    pub time: String,
    /// Foods eaten, in the order logged. Never empty.
    pub foods: Vec<Food>,
    /// Optional free text, at most 500 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Meal {
    /// Checks every field constraint, recording violations under `path`.
    pub fn collect_violations(&self, path: &str, violations: &mut Violations) {
        check_time(violations, join_path(path, "time"), &self.time);
        if self.foods.is_empty() {
            violations.push(join_path(path, "foods"), "must contain at least 1 item");
        }
        for (i, food) in self.foods.iter().enumerate() {
            food.collect_violations(&format!("{}[{i}]", join_path(path, "foods")), violations);
        }
        check_notes(violations, join_path(path, "notes"), self.notes.as_deref());
    }

    /// Sum of the nutrition snapshots of every food.
    #[must_use]
    pub fn nutrition_total(&self) -> Nutrition {
        let mut total = Nutrition::default();
        for nutrition in self.foods.iter().filter_map(|f| f.calculated_nutrition.as_ref()) {
            total += nutrition;
        }
        total
    }

    /// `true` if any food carries the given catalog id.
    #[must_use]
    pub fn contains_food(&self, food_id: &str) -> bool {
        self.foods.iter().any(|f| f.food_id == food_id)
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn rice(nutrition: Option<Nutrition>) -> Food {
        Food {
            food_id: "food-rice".to_string(),
            food_name: "Arroz branco".to_string(),
            portion: Some("1 cup".to_string()),
            quantity_g: Some(150.0),
            marked_as_bad: false,
            calculated_nutrition: nutrition,
        }
    }

    pub(crate) fn lunch() -> Meal {
        Meal {
            meal_type: MealType::Lunch,
            time: "12:30".to_string(),
            foods: vec![rice(None)],
            notes: None,
        }
    }

    #[test]
    fn meal_type_parses_wire_names() {
        for t in MealType::ALL {
            assert_eq!(MealType::parse(t.as_str()), Some(t));
        }
        assert_eq!(MealType::parse("brunch"), None);
        assert_eq!(MealType::parse("Lunch"), None);
    }

    #[test]
    fn well_formed_meal_has_no_violations() {
        let mut v = Violations::new();
        lunch().collect_violations("meal", &mut v);
        assert!(v.is_empty());
    }

    #[test]
    fn broken_meal_reports_each_field() {
        let mut meal = lunch();
        meal.time = "25:00".to_string();
        meal.foods = vec![Food {
            food_name: " ".to_string(),
            quantity_g: Some(-1.0),
            ..rice(Some(Nutrition {
                sodium: -3.0,
                ..Nutrition::default()
            }))
        }];
        meal.notes = Some("x".repeat(501));

        let mut v = Violations::new();
        meal.collect_violations("meal", &mut v);
        let fields: Vec<String> = v.into_vec().into_iter().map(|f| f.field).collect();
        assert_eq!(
            fields,
            vec![
                "meal.time",
                "meal.foods[0].foodName",
                "meal.foods[0].quantity_g",
                "meal.foods[0].calculatedNutrition.sodium",
                "meal.notes",
            ]
        );
    }

    #[test]
    fn empty_foods_is_a_violation() {
        let mut meal = lunch();
        meal.foods.clear();
        let mut v = Violations::new();
        meal.collect_violations("meal", &mut v);
        let items = v.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().map(|i| i.field.as_str()), Some("meal.foods"));
    }

    #[test]
    fn nutrition_total_sums_snapshots() {
        let mut meal = lunch();
        meal.foods = vec![
            rice(Some(Nutrition {
                calories: 200.0,
                carbs: 44.0,
                ..Nutrition::default()
            })),
            rice(None),
            rice(Some(Nutrition {
                calories: 50.5,
                sodium: 10.0,
                ..Nutrition::default()
            })),
        ];
        let total = meal.nutrition_total();
        assert!((total.calories - 250.5).abs() < f64::EPSILON);
        assert!((total.carbs - 44.0).abs() < f64::EPSILON);
        assert!((total.sodium - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(lunch()).unwrap_or_default();
        assert_eq!(json["type"], "lunch");
        assert_eq!(json["foods"][0]["foodId"], "food-rice");
        assert_eq!(json["foods"][0]["quantity_g"], 150.0);
        assert_eq!(json["foods"][0]["markedAsBad"], false);
        assert!(json.get("notes").is_none());
    }
}
