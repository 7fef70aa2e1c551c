//! Query strings and path parameters of the diary endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{EntryId, EntryKind};
use crate::service::{ListQuery, MAX_OVERVIEW_DAYS};
use crate::util::date::parse_date;
use crate::validation::{DATE_FORMAT_MESSAGE, FieldViolation, Violations};

/// Window used by the symptom overview when `days` is omitted.
pub const DEFAULT_OVERVIEW_DAYS: u32 = 30;

/// Raw query string of `GET /diary`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RawListQuery {
    /// Single day, `YYYY-MM-DD`. Takes precedence over the range.
    pub date: Option<String>,
    /// First day of an inclusive range, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Last day of an inclusive range, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// `meal`, `symptom` or `all` (default).
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Raw query string of `GET /diary/overview/symptoms`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RawOverviewQuery {
    /// Window length in days (1–365). Defaults to 30.
    pub days: Option<String>,
}

fn optional_date(field: &str, raw: Option<&str>, v: &mut Violations) -> Option<NaiveDate> {
    let raw = raw?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        v.push(field, DATE_FORMAT_MESSAGE);
    }
    parsed
}

/// Validates the list query.
///
/// # Errors
///
/// Returns a violation for each malformed date, an unknown `type`, or an
/// `endDate` before `startDate`.
pub fn parse_list_query(raw: &RawListQuery) -> Result<ListQuery, Vec<FieldViolation>> {
    let mut v = Violations::new();
    let date = optional_date("date", raw.date.as_deref(), &mut v);
    let start_date = optional_date("startDate", raw.start_date.as_deref(), &mut v);
    let end_date = optional_date("endDate", raw.end_date.as_deref(), &mut v);
    let kind = match raw.kind.as_deref() {
        None | Some("all") => None,
        Some(other) => {
            let kind = EntryKind::parse(other);
            if kind.is_none() {
                v.push("type", "must be one of [meal, symptom, all]");
            }
            kind
        }
    };
    if let (Some(start), Some(end)) = (start_date, end_date)
        && end < start
    {
        v.push("endDate", "must not be before startDate");
    }
    v.finish(ListQuery {
        date,
        start_date,
        end_date,
        kind,
    })
}

/// Validates the overview window, defaulting to
/// [`DEFAULT_OVERVIEW_DAYS`].
///
/// # Errors
///
/// Returns a violation on `days` unless it is a whole number between 1
/// and [`MAX_OVERVIEW_DAYS`].
pub fn parse_overview_days(raw: &RawOverviewQuery) -> Result<u32, Vec<FieldViolation>> {
    let Some(text) = raw.days.as_deref() else {
        return Ok(DEFAULT_OVERVIEW_DAYS);
    };
    match text.trim().parse::<u32>() {
        Ok(days) if (1..=MAX_OVERVIEW_DAYS).contains(&days) => Ok(days),
        _ => Err(vec![FieldViolation::new(
            "days",
            format!("must be a number between 1 and {MAX_OVERVIEW_DAYS}"),
        )]),
    }
}

/// Validates the `{id}` path segment.
///
/// # Errors
///
/// Returns a violation on `id` unless it is a UUID.
pub fn parse_entry_id(raw: &str) -> Result<EntryId, Vec<FieldViolation>> {
    raw.parse::<EntryId>()
        .map_err(|_| vec![FieldViolation::new("id", "must be a valid entry id")])
}

/// Validates the `{date}` path segment.
///
/// # Errors
///
/// Returns a violation on `date` unless it is a real `YYYY-MM-DD` date.
pub fn parse_date_param(raw: &str) -> Result<NaiveDate, Vec<FieldViolation>> {
    parse_date(raw).ok_or_else(|| vec![FieldViolation::new("date", DATE_FORMAT_MESSAGE)])
}

/// Validates the `{year}/{month}` path segments.
///
/// # Errors
///
/// Returns a violation on `year` unless it is exactly four digits and on
/// `month` unless it is one or two digits between 1 and 12.
pub fn parse_month_params(year: &str, month: &str) -> Result<(i32, u32), Vec<FieldViolation>> {
    let mut v = Violations::new();
    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    let year = if digits(year, 4, 4) {
        year.parse::<i32>().ok()
    } else {
        None
    };
    if year.is_none() {
        v.push("year", "must be a 4-digit year");
    }
    let month = if digits(month, 1, 2) {
        month.parse::<u32>().ok().filter(|m| (1..=12).contains(m))
    } else {
        None
    };
    if month.is_none() {
        v.push("month", "must be a month between 1 and 12");
    }
    match (year, month) {
        (Some(year), Some(month)) => v.finish((year, month)),
        _ => Err(v.into_vec()),
    }
}
