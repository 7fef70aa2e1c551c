//! Field-by-field reading of untyped JSON request bodies.
//!
//! Request bodies arrive as `serde_json::Value` so that every broken field
//! can be reported at once, with its full path, instead of failing on the
//! first type error the way a derived `Deserialize` would.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::util::date::parse_date;
use crate::validation::{
    DATE_FORMAT_MESSAGE, Violations, check_notes, check_time, join_path,
};

pub(crate) const REQUIRED: &str = "is required";

/// Reader over one JSON object at a known path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    path: &'a str,
}

impl<'a> FieldReader<'a> {
    /// Opens `value` as an object, recording a violation on `path` if it
    /// is anything else.
    pub(crate) fn open(value: &'a Value, path: &'a str, v: &mut Violations) -> Option<Self> {
        match value {
            Value::Object(object) => Some(Self { object, path }),
            _ => {
                v.push(root_or(path), "must be an object");
                None
            }
        }
    }

    /// Path of a member of this object.
    pub(crate) fn path_of(&self, key: &str) -> String {
        join_path(self.path, key)
    }

    /// Raw member; JSON `null` reads as absent.
    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.get(key).filter(|value| !value.is_null())
    }

    /// `true` if the member is present and not `null`.
    pub(crate) fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn missing(&self, key: &str, required: bool, v: &mut Violations) {
        if required {
            v.push(self.path_of(key), REQUIRED);
        }
    }

    /// A string member that must not be blank.
    pub(crate) fn string(&self, key: &str, required: bool, v: &mut Violations) -> Option<String> {
        match self.get(key) {
            None => {
                self.missing(key, required, v);
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                v.push(self.path_of(key), "must not be empty");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                v.push(self.path_of(key), "must be a string");
                None
            }
        }
    }

    /// A string member restricted to a closed set of values.
    pub(crate) fn choice<T>(
        &self,
        key: &str,
        required: bool,
        allowed: &[&str],
        parse: impl Fn(&str) -> Option<T>,
        v: &mut Violations,
    ) -> Option<T> {
        let raw = self.get(key);
        let Some(raw) = raw else {
            self.missing(key, required, v);
            return None;
        };
        let parsed = raw.as_str().and_then(parse);
        if parsed.is_none() {
            v.push(
                self.path_of(key),
                format!("must be one of [{}]", allowed.join(", ")),
            );
        }
        parsed
    }

    /// A `YYYY-MM-DD` calendar date.
    pub(crate) fn date(&self, key: &str, required: bool, v: &mut Violations) -> Option<NaiveDate> {
        let Some(raw) = self.get(key) else {
            self.missing(key, required, v);
            return None;
        };
        let parsed = raw.as_str().and_then(parse_date);
        if parsed.is_none() {
            v.push(self.path_of(key), DATE_FORMAT_MESSAGE);
        }
        parsed
    }

    /// An `HH:MM` clock time.
    pub(crate) fn time(&self, key: &str, required: bool, v: &mut Violations) -> Option<String> {
        let Some(raw) = self.get(key) else {
            self.missing(key, required, v);
            return None;
        };
        let mut local = Violations::new();
        check_time(&mut local, self.path_of(key), raw.as_str().unwrap_or_default());
        if local.is_empty() {
            raw.as_str().map(str::to_string)
        } else {
            v.extend(local.into_vec());
            None
        }
    }

    /// Optional string member; empty text is kept as is.
    pub(crate) fn optional_text(&self, key: &str, v: &mut Violations) -> Option<String> {
        let raw = self.get(key)?;
        let text = raw.as_str().map(str::to_string);
        if text.is_none() {
            v.push(self.path_of(key), "must be a string");
        }
        text
    }

    /// Optional free text of bounded length.
    pub(crate) fn notes(&self, key: &str, v: &mut Violations) -> Option<String> {
        let raw = self.get(key)?;
        let Some(text) = raw.as_str() else {
            v.push(self.path_of(key), "must be a string");
            return None;
        };
        let mut local = Violations::new();
        check_notes(&mut local, self.path_of(key), Some(text));
        if local.is_empty() {
            Some(text.to_string())
        } else {
            v.extend(local.into_vec());
            None
        }
    }

    /// An optional finite number `>= 0`.
    pub(crate) fn non_negative(&self, key: &str, v: &mut Violations) -> Option<f64> {
        let raw = self.get(key)?;
        match raw.as_f64() {
            Some(n) if n.is_finite() && n >= 0.0 => Some(n),
            _ => {
                v.push(self.path_of(key), "must be a number >= 0");
                None
            }
        }
    }

    /// An integer in `min..=max`.
    pub(crate) fn integer_in(
        &self,
        key: &str,
        required: bool,
        min: i64,
        max: i64,
        v: &mut Violations,
    ) -> Option<i64> {
        let Some(raw) = self.get(key) else {
            self.missing(key, required, v);
            return None;
        };
        match as_integer(raw) {
            Some(n) if (min..=max).contains(&n) => Some(n),
            _ => {
                v.push(
                    self.path_of(key),
                    format!("must be an integer between {min} and {max}"),
                );
                None
            }
        }
    }

    /// An optional boolean.
    pub(crate) fn boolean(&self, key: &str, v: &mut Violations) -> Option<bool> {
        let raw = self.get(key)?;
        let parsed = raw.as_bool();
        if parsed.is_none() {
            v.push(self.path_of(key), "must be a boolean");
        }
        parsed
    }

    /// An array member; `min_len` items at least.
    pub(crate) fn array(
        &self,
        key: &str,
        required: bool,
        min_len: usize,
        v: &mut Violations,
    ) -> Option<&'a Vec<Value>> {
        let Some(raw) = self.get(key) else {
            self.missing(key, required, v);
            return None;
        };
        let Some(items) = raw.as_array() else {
            v.push(self.path_of(key), "must be an array");
            return None;
        };
        if items.len() < min_len {
            v.push(self.path_of(key), format!("must contain at least {min_len} item"));
            return None;
        }
        Some(items)
    }
}

/// Integral JSON numbers, including `3.0`.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    #[allow(clippy::cast_possible_truncation)]
    let n = f as i64;
    #[allow(clippy::cast_precision_loss)]
    let exact = f.fract() == 0.0 && (n as f64) == f;
    exact.then_some(n)
}

fn root_or(path: &str) -> String {
    if path.is_empty() {
        "body".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_objects_are_reported_at_their_path() {
        let mut v = Violations::new();
        assert!(FieldReader::open(&json!([1, 2]), "", &mut v).is_none());
        assert!(FieldReader::open(&json!("x"), "meal", &mut v).is_none());
        let fields: Vec<String> = v.into_vec().into_iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["body", "meal"]);
    }

    #[test]
    fn null_reads_as_absent() {
        let body = json!({ "notes": null, "name": "  " });
        let mut v = Violations::new();
        let Some(r) = FieldReader::open(&body, "", &mut v) else {
            panic!("object expected");
        };
        assert!(!r.has("notes"));
        assert_eq!(r.notes("notes", &mut v), None);
        assert!(v.is_empty());
        assert_eq!(r.string("name", true, &mut v), None);
        assert_eq!(r.string("missing", true, &mut v), None);
        let messages: Vec<String> = v.into_vec().into_iter().map(|f| f.message).collect();
        assert_eq!(messages, vec!["must not be empty", REQUIRED]);
    }

    #[test]
    fn optional_text_keeps_empty_strings() {
        let body = json!({ "portion": "", "size": 3 });
        let mut v = Violations::new();
        let Some(r) = FieldReader::open(&body, "food", &mut v) else {
            panic!("object expected");
        };
        assert_eq!(r.optional_text("portion", &mut v), Some(String::new()));
        assert_eq!(r.optional_text("missing", &mut v), None);
        assert_eq!(r.optional_text("size", &mut v), None);
        let fields: Vec<String> = v.into_vec().into_iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["food.size"]);
    }

    #[test]
    fn integers_accept_whole_floats_only() {
        let body = json!({ "a": 3.0, "b": 3.5, "c": "3" });
        let mut v = Violations::new();
        let Some(r) = FieldReader::open(&body, "", &mut v) else {
            panic!("object expected");
        };
        assert_eq!(r.integer_in("a", true, 1, 5, &mut v), Some(3));
        assert_eq!(r.integer_in("b", true, 1, 5, &mut v), None);
        assert_eq!(r.integer_in("c", true, 1, 5, &mut v), None);
        assert_eq!(v.into_vec().len(), 2);
    }
}
