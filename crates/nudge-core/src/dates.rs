//! Calendar-date helpers shared by the matcher, the today-view filter and the CLI.
//!
//! Every scheduling decision in this crate is made on plain calendar dates
//! (`NaiveDate`). Instants (`DateTime<Utc>`) only appear on tasks and are
//! projected onto a calendar through a timezone before comparison.

use crate::error::CoreError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Wire format for every date string the engine reads or writes.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone)
        .map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))
}

/// Parses a strict `YYYY-MM-DD` date string.
pub fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(format!("Expected YYYY-MM-DD, got '{}'", value)))
}

/// Extracts the calendar date from a date or date+time string.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` and `YYYY-MM-DD HH:MM`.
/// The time part is not validated; only the date portion matters to callers.
pub fn date_portion(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let head = value.get(..10)?;
    match value[10..].chars().next() {
        None | Some('T') | Some(' ') => NaiveDate::parse_from_str(head, DATE_FORMAT).ok(),
        Some(_) => None,
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Calendar date of an instant as seen from `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

pub fn today_in(tz: &Tz) -> NaiveDate {
    local_date(Utc::now(), tz)
}

pub fn today_string(tz: &Tz) -> String {
    format_date(today_in(tz))
}

/// Number of days in the given month, `None` for an invalid year/month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let days = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, days)
}

#[inline]
pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

/// Signed number of days from `from` to `to`.
#[inline]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Whole weeks elapsed from `from` to `to`, floored (negative before `from`).
#[inline]
pub fn whole_weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    days_between(from, to).div_euclid(7)
}

/// Calendar-month difference, ignoring the day of month.
#[inline]
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

/// Weekday index with 0 = Sunday … 6 = Saturday.
#[inline]
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-09").unwrap(), ymd(2025, 3, 9));
        assert!(matches!(parse_date("2025-02-30"), Err(CoreError::InvalidDate(_))));
        assert!(parse_date("03/09/2025").is_err());
        assert!(parse_date("").is_err());
    }

    #[rstest]
    #[case("2025-06-01", Some(ymd(2025, 6, 1)))]
    #[case("2025-06-01T09:30", Some(ymd(2025, 6, 1)))]
    #[case("2025-06-01T09:30:00", Some(ymd(2025, 6, 1)))]
    #[case("2025-06-01 18:00", Some(ymd(2025, 6, 1)))]
    #[case("2025-06-01x", None)]
    #[case("2025-6-1", None)]
    #[case("", None)]
    fn test_date_portion(#[case] input: &str, #[case] expected: Option<NaiveDate>) {
        assert_eq!(date_portion(input), expected);
    }

    #[rstest]
    #[case(2025, 1, 31)]
    #[case(2025, 2, 28)]
    #[case(2024, 2, 29)]
    #[case(2025, 4, 30)]
    #[case(2025, 12, 31)]
    fn test_days_in_month(#[case] year: i32, #[case] month: u32, #[case] days: u32) {
        assert_eq!(days_in_month(year, month), Some(days));
    }

    #[test]
    fn test_days_in_month_invalid() {
        assert_eq!(days_in_month(2025, 13), None);
        assert_eq!(days_in_month(2025, 0), None);
    }

    #[test]
    fn test_last_day_helpers() {
        assert!(is_last_day_of_month(ymd(2024, 2, 29)));
        assert!(!is_last_day_of_month(ymd(2025, 2, 27)));
        assert!(is_last_day_of_month(ymd(2025, 12, 31)));
        assert_eq!(last_day_of_month(2025, 4), Some(ymd(2025, 4, 30)));
    }

    #[test]
    fn test_interval_arithmetic() {
        let start = ymd(2025, 1, 6);
        assert_eq!(days_between(start, ymd(2025, 1, 20)), 14);
        assert_eq!(whole_weeks_between(start, ymd(2025, 1, 19)), 1);
        assert_eq!(whole_weeks_between(start, ymd(2025, 1, 5)), -1);
        assert_eq!(months_between(ymd(2024, 11, 30), ymd(2025, 2, 1)), 3);
        assert_eq!(months_between(ymd(2025, 2, 1), ymd(2024, 11, 30)), -3);
    }

    #[test]
    fn test_weekday_index_is_sunday_based() {
        assert_eq!(weekday_index(ymd(2025, 6, 1)), 0); // Sunday
        assert_eq!(weekday_index(ymd(2025, 6, 2)), 1);
        assert_eq!(weekday_index(ymd(2025, 6, 7)), 6);
    }

    #[test]
    fn test_local_date_respects_timezone() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 10, 2, 0, 0).unwrap();
        let ny = validate_timezone("America/New_York").unwrap();
        assert_eq!(local_date(instant, &ny), ymd(2025, 3, 9));
        assert_eq!(local_date(instant, &Tz::UTC), ymd(2025, 3, 10));
    }

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("Europe/Berlin").is_ok());
        assert!(matches!(
            validate_timezone("Mars/Olympus"),
            Err(CoreError::InvalidTimezone(_))
        ));
    }
}
