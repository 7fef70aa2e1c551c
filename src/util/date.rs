//! Calendar helpers bound to the configured diary timezone.
//!
//! Entries are stored as UTC instants but queried by local calendar day,
//! so every day and month boundary goes through a [`LocalCalendar`] built
//! once from configuration. Months are always 1-based (`1` is January).

use std::sync::LazyLock;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;

/// `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `YYYY-MM-DD HH:mm:ss`.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[allow(clippy::expect_used)]
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern compiles")
});

/// Step used to find the first local instant after a daylight-saving gap.
const GAP_STEP_MINUTES: i64 = 15;

/// Timezone-aware day and month arithmetic.
///
/// Wraps an IANA timezone, so local days may last 23 or 25 hours around
/// daylight-saving transitions. Created once at startup from
/// [`crate::config::DiaryConfig`] and passed by value wherever local
/// calendar days matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCalendar {
    tz: Tz,
}

impl LocalCalendar {
    /// Creates a calendar for the given timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Calendar pinned to UTC.
    #[must_use]
    pub const fn utc() -> Self {
        Self::new(chrono_tz::UTC)
    }

    /// Returns the configured timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// UTC offset in effect at `instant`.
    #[must_use]
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        instant.with_timezone(&self.tz).offset().fix()
    }

    /// Renders `instant` as a local `YYYY-MM-DD`.
    #[must_use]
    pub fn format_date(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format(DATE_FORMAT)
            .to_string()
    }

    /// Renders `instant` as a local `YYYY-MM-DD HH:mm:ss`.
    #[must_use]
    pub fn format_date_time(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format(DATE_TIME_FORMAT)
            .to_string()
    }

    /// Local calendar day containing `instant`.
    #[must_use]
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Today's local calendar day.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    /// First instant of the local day `date`.
    ///
    /// When midnight falls inside a daylight-saving gap the day starts at
    /// the first local time that exists. An ambiguous midnight resolves to
    /// the earlier instant.
    #[must_use]
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        (0..=24 * 60 / GAP_STEP_MINUTES)
            .find_map(|step| {
                let local = midnight + Duration::minutes(step * GAP_STEP_MINUTES);
                self.tz.from_local_datetime(&local).earliest()
            })
            .map_or_else(|| midnight.and_utc(), |start| start.with_timezone(&Utc))
    }

    /// Last millisecond of the local day `date`.
    #[must_use]
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let next_start = date.succ_opt().map_or_else(
            || self.start_of_day(date) + Duration::days(1),
            |next| self.start_of_day(next),
        );
        next_start - Duration::milliseconds(1)
    }

    /// Inclusive bounds of the local day `date`.
    #[must_use]
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start_of_day(date), self.end_of_day(date))
    }

    /// First instant of the given month, or `None` for an invalid month.
    #[must_use]
    pub fn start_of_month(&self, year: i32, month: u32) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|d| self.start_of_day(d))
    }

    /// Last millisecond of the given month, or `None` for an invalid month.
    #[must_use]
    pub fn end_of_month(&self, year: i32, month: u32) -> Option<DateTime<Utc>> {
        let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)?)?;
        Some(self.end_of_day(last))
    }

    /// Inclusive bounds of the given month.
    #[must_use]
    pub fn month_bounds(&self, year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((
            self.start_of_month(year, month)?,
            self.end_of_month(year, month)?,
        ))
    }
}

impl Default for LocalCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// Number of days in `month` of `year`; `None` when `month` is outside 1–12.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// Rejects unpadded components and impossible days such as `2024-02-30`.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let shaped = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// `true` if `value` is a real calendar date in `YYYY-MM-DD` form.
#[must_use]
pub fn is_valid_date_format(value: &str) -> bool {
    parse_date(value).is_some()
}

/// `true` if `value` is a 24-hour `H:MM` / `HH:MM` clock time.
#[must_use]
pub fn is_valid_time_format(value: &str) -> bool {
    TIME_RE.is_match(value)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn brt() -> LocalCalendar {
        LocalCalendar::new(chrono_tz::America::Sao_Paulo)
    }

    fn new_york() -> LocalCalendar {
        LocalCalendar::new(chrono_tz::America::New_York)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            panic!("valid date");
        };
        date
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2023, 12), Some(31));
        assert_eq!(days_in_month(2023, 4), Some(30));
    }

    #[test]
    fn days_in_month_rejects_zero_based_months() {
        assert_eq!(days_in_month(2024, 0), None);
        assert_eq!(days_in_month(2024, 13), None);
    }

    #[test]
    fn format_date_is_ten_chars_and_reparses() {
        let cal = brt();
        for instant in [
            Utc.with_ymd_and_hms(2024, 1, 1, 2, 59, 0),
            Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0),
            Utc.with_ymd_and_hms(1999, 7, 4, 12, 0, 0),
        ] {
            let Some(instant) = instant.single() else {
                panic!("valid instant");
            };
            let s = cal.format_date(instant);
            assert_eq!(s.len(), 10);
            assert_eq!(parse_date(&s), Some(cal.local_date(instant)));
        }
    }

    #[test]
    fn format_date_uses_local_offset() {
        let Some(instant) = Utc.with_ymd_and_hms(2024, 3, 10, 1, 30, 0).single() else {
            panic!("valid instant");
        };
        assert_eq!(brt().format_date(instant), "2024-03-09");
        assert_eq!(brt().format_date_time(instant), "2024-03-09 22:30:00");
        assert_eq!(LocalCalendar::utc().format_date(instant), "2024-03-10");
    }

    #[test]
    fn day_bounds_follow_offset() {
        let (start, end) = brt().day_bounds(ymd(2024, 5, 20));
        assert_eq!(start.to_rfc3339(), "2024-05-20T03:00:00+00:00");
        assert_eq!(
            end.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            "2024-05-21T02:59:59.999"
        );
    }

    #[test]
    fn day_bounds_track_daylight_saving() {
        // Spring forward: a 23-hour day.
        let (start, end) = new_york().day_bounds(ymd(2024, 3, 10));
        assert_eq!(start.to_rfc3339(), "2024-03-10T05:00:00+00:00");
        assert_eq!(
            end.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            "2024-03-11T03:59:59.999"
        );
        // Fall back: a 25-hour day.
        let (start, end) = new_york().day_bounds(ymd(2024, 11, 3));
        assert_eq!(start.to_rfc3339(), "2024-11-03T04:00:00+00:00");
        assert_eq!(
            end.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            "2024-11-04T04:59:59.999"
        );
    }

    #[test]
    fn midnight_inside_a_gap_starts_the_day_after_it() {
        // São Paulo skipped 00:00-00:59 on 2018-11-04.
        let start = brt().start_of_day(ymd(2018, 11, 4));
        assert_eq!(start.to_rfc3339(), "2018-11-04T03:00:00+00:00");
        assert_eq!(brt().format_date_time(start), "2018-11-04 01:00:00");
    }

    #[test]
    fn offset_follows_the_season() {
        let at = |m, d| {
            let Some(instant) = Utc.with_ymd_and_hms(2024, m, d, 12, 0, 0).single() else {
                panic!("valid instant");
            };
            new_york().offset_at(instant).local_minus_utc()
        };
        assert_eq!(at(1, 15), -5 * 3600);
        assert_eq!(at(7, 15), -4 * 3600);
        assert_eq!(LocalCalendar::utc().timezone(), chrono_tz::UTC);
    }

    #[test]
    fn month_bounds_cover_whole_month() {
        let cal = LocalCalendar::utc();
        let Some((start, end)) = cal.month_bounds(2024, 2) else {
            panic!("valid month");
        };
        assert_eq!(cal.format_date(start), "2024-02-01");
        assert_eq!(cal.format_date(end), "2024-02-29");
        assert!(cal.month_bounds(2024, 13).is_none());
    }

    #[test]
    fn parse_date_is_calendar_aware() {
        assert_eq!(parse_date("2024-02-29"), Some(ymd(2024, 2, 29)));
        assert!(parse_date("2024-02-30").is_none());
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("2024-2-01").is_none());
        assert!(parse_date("2024/02/01").is_none());
        assert!(parse_date("").is_none());
        assert!(!is_valid_date_format("20240201"));
    }

    #[test]
    fn every_clock_time_is_valid() {
        for h in 0..24 {
            for m in 0..60 {
                let t = format!("{h:02}:{m:02}");
                assert!(is_valid_time_format(&t), "{t}");
            }
        }
    }

    #[test]
    fn malformed_times_are_rejected() {
        for t in ["24:00", "12:60", "1230", "12:3", "aa:bb", " 12:30", "12:30 ", ""] {
            assert!(!is_valid_time_format(t), "{t}");
        }
        assert!(is_valid_time_format("9:05"));
    }
}
