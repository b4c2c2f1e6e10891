//! Date arguments on the command line: strict `YYYY-MM-DD` first, then
//! English phrases ("tomorrow", "next friday", "friday 5pm").

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;
use nudge_core::dates::parse_date;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DateArgError {
    #[error("Failed to parse date '{input}': {reason}")]
    Day { input: String, reason: String },
    #[error("Failed to parse due date '{input}': {reason}")]
    Due { input: String, reason: String },
    #[error("{0} does not exist in {1}")]
    NonexistentLocalTime(String, Tz),
    #[error("Invalid month '{0}', expected YYYY-MM")]
    Month(String),
}

type Result<T> = std::result::Result<T, DateArgError>;

/// Calendar day named by `input`, relative to `now` in `tz`.
pub fn parse_day(input: &str, now: DateTime<Utc>, tz: &Tz) -> Result<NaiveDate> {
    if let Ok(date) = parse_date(input) {
        return Ok(date);
    }
    parse_date_string(input, now.with_timezone(tz), Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|e| DateArgError::Day {
            input: input.to_string(),
            reason: e.to_string(),
        })
}

/// Deadline instant named by `input`. A bare date means the end of that day.
pub fn parse_due_date(input: &str, now: DateTime<Utc>, tz: &Tz) -> Result<DateTime<Utc>> {
    if let Ok(date) = parse_date(input) {
        return end_of_day(date, tz);
    }
    parse_date_string(input, now.with_timezone(tz), Dialect::Us)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DateArgError::Due {
            input: input.to_string(),
            reason: e.to_string(),
        })
}

fn end_of_day(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>> {
    let local = date.and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN));
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| DateArgError::NonexistentLocalTime(local.to_string(), *tz))
}

/// First day of a `YYYY-MM` month.
pub fn parse_month(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d")
        .map_err(|_| DateArgError::Month(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_core::dates::local_date;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2025, 3, 12, 15, 0, 0).unwrap()
    }

    #[rstest]
    #[case("2025-04-01", "2025-04-01")]
    #[case("today", "2025-03-12")]
    #[case("tomorrow", "2025-03-13")]
    fn test_parse_day(#[case] input: &str, #[case] expected: &str) {
        let day = parse_day(input, now(), &Tz::UTC).unwrap();
        assert_eq!(day, parse_date(expected).unwrap());
    }

    #[test]
    fn test_parse_day_rejects_garbage() {
        assert!(parse_day("not a day at all", now(), &Tz::UTC).is_err());
    }

    #[test]
    fn test_bare_due_date_stays_on_that_day_locally() {
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        let due = parse_due_date("2025-03-20", now(), &tz).unwrap();
        assert_eq!(local_date(due, &tz), parse_date("2025-03-20").unwrap());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-02").unwrap(), parse_date("2025-02-01").unwrap());
        assert!(parse_month("2025-13").is_err());
        assert!(matches!(parse_month("Feb"), Err(DateArgError::Month(_))));
    }
}
