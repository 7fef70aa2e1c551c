//! Diary entry request bodies: create-meal, create-symptom, update-entry.
//!
//! Each parser walks the raw JSON body, checks every constraint and
//! returns either the validated service input or every violation found.
//! Unknown members are ignored.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::fields::{FieldReader, REQUIRED};
use crate::domain::symptom::{MAX_INTENSITY, MIN_INTENSITY};
use crate::domain::{DiaryEntry, EntryDocument, Food, Meal, MealType, Nutrition, Symptom, SymptomType};
use crate::service::{CreateMeal, CreateSymptom, EntryUpdate, MealPatch, SymptomPatch};
use crate::validation::{FieldViolation, Violations};

const MEAL_TYPES: [&str; 4] = ["breakfast", "lunch", "dinner", "snack"];

fn symptom_types() -> Vec<&'static str> {
    SymptomType::ALL.iter().map(|t| t.as_str()).collect()
}

/// Parses a `POST /diary/meals` body.
///
/// # Errors
///
/// Returns every violated constraint, addressed by field path.
pub fn parse_create_meal(body: &Value) -> Result<CreateMeal, Vec<FieldViolation>> {
    let mut v = Violations::new();
    let Some(root) = FieldReader::open(body, "", &mut v) else {
        return Err(v.into_vec());
    };
    let date = root.date("date", true, &mut v);
    let meal = match root.get("meal") {
        Some(raw) => read_meal(raw, &mut v),
        None => {
            v.push("meal", REQUIRED);
            None
        }
    };
    match (date, meal) {
        (Some(date), Some(meal)) => v.finish(CreateMeal { date, meal }),
        _ => Err(v.into_vec()),
    }
}

/// Parses a `POST /diary/symptoms` body.
///
/// # Errors
///
/// Returns every violated constraint, addressed by field path.
pub fn parse_create_symptom(body: &Value) -> Result<CreateSymptom, Vec<FieldViolation>> {
    let mut v = Violations::new();
    let Some(root) = FieldReader::open(body, "", &mut v) else {
        return Err(v.into_vec());
    };
    let date = root.date("date", true, &mut v);
    let symptom = match root.get("symptom") {
        Some(raw) => read_symptom(raw, &mut v),
        None => {
            v.push("symptom", REQUIRED);
            None
        }
    };
    match (date, symptom) {
        (Some(date), Some(symptom)) => v.finish(CreateSymptom { date, symptom }),
        _ => Err(v.into_vec()),
    }
}

/// Parses a `PATCH /diary/{id}` body.
///
/// Every member is optional. `type` is refused because an entry never
/// changes kind.
///
/// # Errors
///
/// Returns every violated constraint, addressed by field path.
pub fn parse_update_entry(body: &Value) -> Result<EntryUpdate, Vec<FieldViolation>> {
    let mut v = Violations::new();
    let Some(root) = FieldReader::open(body, "", &mut v) else {
        return Err(v.into_vec());
    };
    if root.has("type") {
        v.push("type", "is not allowed; an entry's type cannot change");
    }
    let meal = root.get("meal").and_then(|raw| read_meal_patch(raw, &mut v));
    let symptom = root
        .get("symptom")
        .and_then(|raw| read_symptom_patch(raw, &mut v));
    v.finish(EntryUpdate { meal, symptom })
}

fn read_meal(raw: &Value, v: &mut Violations) -> Option<Meal> {
    let r = FieldReader::open(raw, "meal", v)?;
    let meal_type = r.choice("type", true, &MEAL_TYPES, MealType::parse, v);
    let time = r.time("time", true, v);
    let foods = r.array("foods", true, 1, v).and_then(|items| read_foods(&r, items, v));
    let notes = r.notes("notes", v);
    Some(Meal {
        meal_type: meal_type?,
        time: time?,
        foods: foods?,
        notes,
    })
}

fn read_meal_patch(raw: &Value, v: &mut Violations) -> Option<MealPatch> {
    let r = FieldReader::open(raw, "meal", v)?;
    let before = v.len();
    let patch = MealPatch {
        meal_type: r.choice("type", false, &MEAL_TYPES, MealType::parse, v),
        time: r.time("time", false, v),
        foods: r
            .array("foods", false, 1, v)
            .and_then(|items| read_foods(&r, items, v)),
        notes: r.notes("notes", v),
    };
    (v.len() == before).then_some(patch)
}

fn read_symptom(raw: &Value, v: &mut Violations) -> Option<Symptom> {
    let r = FieldReader::open(raw, "symptom", v)?;
    let kinds = symptom_types();
    let symptom_type = r.choice("type", true, &kinds, SymptomType::parse, v);
    let intensity = read_intensity(&r, true, v);
    let time = r.time("time", true, v);
    let duration = read_duration(&r, v);
    let notes = r.notes("notes", v);
    Some(Symptom {
        symptom_type: symptom_type?,
        intensity: intensity?,
        time: time?,
        duration,
        notes,
    })
}

fn read_symptom_patch(raw: &Value, v: &mut Violations) -> Option<SymptomPatch> {
    let r = FieldReader::open(raw, "symptom", v)?;
    let before = v.len();
    let kinds = symptom_types();
    let patch = SymptomPatch {
        symptom_type: r.choice("type", false, &kinds, SymptomType::parse, v),
        intensity: read_intensity(&r, false, v),
        time: r.time("time", false, v),
        duration: read_duration(&r, v),
        notes: r.notes("notes", v),
    };
    (v.len() == before).then_some(patch)
}

fn read_intensity(r: &FieldReader<'_>, required: bool, v: &mut Violations) -> Option<u8> {
    r.integer_in(
        "intensity",
        required,
        i64::from(MIN_INTENSITY),
        i64::from(MAX_INTENSITY),
        v,
    )
    .and_then(|n| u8::try_from(n).ok())
}

fn read_duration(r: &FieldReader<'_>, v: &mut Violations) -> Option<f64> {
    r.non_negative("duration", v)
}

fn read_foods(parent: &FieldReader<'_>, items: &[Value], v: &mut Violations) -> Option<Vec<Food>> {
    let base = parent.path_of("foods");
    let mut foods = Vec::with_capacity(items.len());
    let mut complete = true;
    for (i, item) in items.iter().enumerate() {
        match read_food(item, &format!("{base}[{i}]"), v) {
            Some(food) => foods.push(food),
            None => complete = false,
        }
    }
    complete.then_some(foods)
}

fn read_food(raw: &Value, path: &str, v: &mut Violations) -> Option<Food> {
    let r = FieldReader::open(raw, path, v)?;
    let before = v.len();
    let food_id = r.string("foodId", true, v);
    let food_name = r.string("foodName", true, v);
    let portion = r.optional_text("portion", v);
    let quantity_g = r.non_negative("quantity_g", v);
    let marked_as_bad = r.boolean("markedAsBad", v).unwrap_or(false);
    let calculated_nutrition = r
        .get("calculatedNutrition")
        .and_then(|raw| read_nutrition(raw, &r.path_of("calculatedNutrition"), v));
    if v.len() != before {
        return None;
    }
    Some(Food {
        food_id: food_id?,
        food_name: food_name?,
        portion,
        quantity_g,
        marked_as_bad,
        calculated_nutrition,
    })
}

fn read_nutrition(raw: &Value, path: &str, v: &mut Violations) -> Option<Nutrition> {
    let r = FieldReader::open(raw, path, v)?;
    let mut read = |key: &str| r.non_negative(key, v).unwrap_or_default();
    Some(Nutrition {
        calories: read("calories"),
        carbs: read("carbs"),
        protein: read("protein"),
        fat: read("fat"),
        sugar: read("sugar"),
        fiber: read("fiber"),
        sodium: read("sodium"),
    })
}

/// A list of entries, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct EntryListResponse {
    /// Number of entries returned.
    pub count: usize,
    /// The entries.
    #[schema(value_type = Vec<EntryDocument>)]
    pub entries: Vec<DiaryEntry>,
}

impl From<Vec<DiaryEntry>> for EntryListResponse {
    fn from(entries: Vec<DiaryEntry>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }
}
