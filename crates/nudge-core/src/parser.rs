//! Recognizes recurrence phrases ("every Sunday", "every 2 weeks") in free
//! task text and splits them off into a [`RecurrenceRule`].

use chrono::{Local, NaiveDate};
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::CoreError;
use crate::rule::{DayOfMonth, RecurrenceRule, WeekdaySet};

/// A recognized rule together with the task text the phrase was removed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecurrence {
    pub rule: RecurrenceRule,
    pub cleaned_text: String,
}

type Builder = fn(&Captures, NaiveDate) -> Result<RecurrenceRule, CoreError>;

const WEEKDAY_NAMES: &str =
    "sunday|monday|tuesday|wednesday|thursday|friday|saturday|sun|mon|tues|tue|wed|thurs|thur|thu|fri|sat";

lazy_static::lazy_static! {
    // First match wins, so the more specific phrases come first.
    static ref PATTERNS: Vec<(Regex, Builder)> = {
        let table = [
            (r"(?i)\bevery\s+(\d+)\s+(day|week|month)s?\b".to_string(), every_n as Builder),
            (r"(?i)\b(?:every\s+|on\s+)?weekdays?\b".to_string(), on_weekdays as Builder),
            (r"(?i)\b(?:(?:every|each)\s+day|everyday|daily)\b".to_string(), every_day as Builder),
            (
                format!(r"(?i)\b(?:every\s+({0})s?|on\s+({0})s)\b", WEEKDAY_NAMES),
                on_named_weekday as Builder,
            ),
            (r"(?i)\b(?:every\s+other\s+week|bi-?weekly|fortnightly)\b".to_string(), every_other_week as Builder),
            (r"(?i)\b(?:every\s+week|weekly)\b".to_string(), every_week as Builder),
            (r"(?i)\b(?:every\s+month|monthly)\b".to_string(), every_month as Builder),
        ];
        table
            .into_iter()
            .map(|(pattern, builder)| (Regex::new(&pattern).expect("valid recurrence phrase regex"), builder))
            .collect()
    };
}

fn every_n(caps: &Captures, today: NaiveDate) -> Result<RecurrenceRule, CoreError> {
    let interval: u32 = caps[1]
        .parse()
        .map_err(|_| CoreError::InvalidInput(format!("interval out of range: {}", &caps[1])))?;
    match caps[2].to_lowercase().as_str() {
        "day" => RecurrenceRule::every_n_days(today, interval),
        "week" => RecurrenceRule::every_n_weeks(today, interval, WeekdaySet::of(today)),
        _ => RecurrenceRule::every_n_months(today, interval, DayOfMonth::of(today)),
    }
}

fn on_weekdays(_: &Captures, today: NaiveDate) -> Result<RecurrenceRule, CoreError> {
    Ok(RecurrenceRule::weekdays(today))
}

fn every_day(_: &Captures, today: NaiveDate) -> Result<RecurrenceRule, CoreError> {
    Ok(RecurrenceRule::daily(today))
}

fn every_other_week(_: &Captures, today: NaiveDate) -> Result<RecurrenceRule, CoreError> {
    RecurrenceRule::biweekly(today, WeekdaySet::of(today))
}

fn every_week(_: &Captures, today: NaiveDate) -> Result<RecurrenceRule, CoreError> {
    RecurrenceRule::weekly(today, WeekdaySet::of(today))
}

fn every_month(_: &Captures, today: NaiveDate) -> Result<RecurrenceRule, CoreError> {
    RecurrenceRule::monthly(today, DayOfMonth::of(today))
}

fn on_named_weekday(caps: &Captures, today: NaiveDate) -> Result<RecurrenceRule, CoreError> {
    let name = caps
        .get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default();
    let index = weekday_from_name(&name)
        .ok_or_else(|| CoreError::InvalidInput(format!("unknown weekday: {}", name)))?;
    RecurrenceRule::weekly(today, WeekdaySet::from_indices([index])?)
}

/// Maps a full or abbreviated English weekday name to its index, Sunday = 0.
pub fn weekday_from_name(name: &str) -> Option<u8> {
    let prefix = name.get(..3)?.to_ascii_lowercase();
    match prefix.as_str() {
        "sun" => Some(0),
        "mon" => Some(1),
        "tue" => Some(2),
        "wed" => Some(3),
        "thu" => Some(4),
        "fri" => Some(5),
        "sat" => Some(6),
        _ => None,
    }
}

/// Parses `text` with the local calendar date as the rule's start.
pub fn parse_recurrence_from_text(text: &str) -> Option<ParsedRecurrence> {
    parse_recurrence_from_text_on(text, Local::now().date_naive())
}

/// Parses `text` anchoring any recognized rule at `today`.
///
/// Returns `None` when no phrase is recognized; the caller keeps its text.
pub fn parse_recurrence_from_text_on(text: &str, today: NaiveDate) -> Option<ParsedRecurrence> {
    let trimmed = text.trim();

    for (regex, build) in PATTERNS.iter() {
        let Some(caps) = regex.captures(trimmed) else {
            continue;
        };
        let rule = match build(&caps, today) {
            Ok(rule) => rule,
            Err(e) => {
                debug!(pattern = regex.as_str(), error = %e, "recurrence phrase rejected");
                continue;
            }
        };

        let phrase = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let remainder = format!("{} {}", &trimmed[..phrase.start], &trimmed[phrase.end..]);
        let cleaned = collapse_whitespace(&remainder);
        debug!(phrase = &trimmed[phrase.clone()], frequency = %rule.frequency(), "parsed recurrence");

        return Some(ParsedRecurrence {
            rule,
            cleaned_text: if cleaned.is_empty() {
                trimmed.to_string()
            } else {
                cleaned
            },
        });
    }

    None
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Frequency, Pattern};
    use rstest::rstest;

    // A Wednesday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    fn parse(text: &str) -> Option<ParsedRecurrence> {
        parse_recurrence_from_text_on(text, today())
    }

    fn days(indices: &[u8]) -> WeekdaySet {
        WeekdaySet::from_indices(indices.iter().copied()).unwrap()
    }

    #[test]
    fn test_every_sunday() {
        let parsed = parse("Call mom every Sunday").unwrap();
        assert_eq!(parsed.cleaned_text, "Call mom");
        assert_eq!(parsed.rule.pattern(), &Pattern::Weekly { days: days(&[0]) });
        assert_eq!(parsed.rule.start_date(), today());
    }

    #[test]
    fn test_every_two_weeks_uses_current_weekday() {
        let parsed = parse("Pay rent every 2 weeks").unwrap();
        assert_eq!(parsed.cleaned_text, "Pay rent");
        assert_eq!(
            parsed.rule.pattern(),
            &Pattern::EveryNWeeks { interval: 2, days: days(&[3]) }
        );
        assert_eq!(parsed.rule.frequency(), Frequency::Custom);
    }

    #[test]
    fn test_no_match_returns_none() {
        assert_eq!(parse("Buy milk"), None);
        assert_eq!(parse(""), None);
    }

    #[rstest]
    #[case("Stretch every day", Pattern::Daily, "Stretch")]
    #[case("Stretch each day", Pattern::Daily, "Stretch")]
    #[case("DAILY standup", Pattern::Daily, "standup")]
    #[case("Check email every weekday", Pattern::Weekdays, "Check email")]
    #[case("Gym on weekdays at 7", Pattern::Weekdays, "Gym at 7")]
    #[case("Team sync on Tuesdays", Pattern::Weekly { days: days(&[2]) }, "Team sync")]
    #[case("Piano every thu", Pattern::Weekly { days: days(&[4]) }, "Piano")]
    #[case("Payroll every other week", Pattern::Biweekly { days: days(&[3]) }, "Payroll")]
    #[case("Payroll bi-weekly", Pattern::Biweekly { days: days(&[3]) }, "Payroll")]
    #[case("Laundry fortnightly", Pattern::Biweekly { days: days(&[3]) }, "Laundry")]
    #[case("Review goals weekly", Pattern::Weekly { days: days(&[3]) }, "Review goals")]
    #[case("Pay card monthly", Pattern::Monthly { day: DayOfMonth::Day(12) }, "Pay card")]
    #[case("Water cactus every 10 days", Pattern::EveryNDays { interval: 10 }, "Water cactus")]
    #[case("Haircut every 6 months", Pattern::EveryNMonths { interval: 6, day: DayOfMonth::Day(12) }, "Haircut")]
    fn test_phrase_table(#[case] input: &str, #[case] expected: Pattern, #[case] cleaned: &str) {
        let parsed = parse(input).unwrap();
        assert_eq!(parsed.rule.pattern(), &expected, "input: {}", input);
        assert_eq!(parsed.cleaned_text, cleaned);
    }

    #[test]
    fn test_interval_phrase_wins_over_later_entries() {
        // "every 3 days" also contains "days"; the explicit interval must win.
        let parsed = parse("Refill every 3 days daily").unwrap();
        assert_eq!(parsed.rule.pattern(), &Pattern::EveryNDays { interval: 3 });
        assert_eq!(parsed.cleaned_text, "Refill daily");
    }

    #[test]
    fn test_weekday_phrase_is_not_a_named_day() {
        let parsed = parse("every weekday standup").unwrap();
        assert_eq!(parsed.rule.pattern(), &Pattern::Weekdays);
    }

    #[test]
    fn test_zero_interval_falls_through() {
        assert_eq!(parse("Nothing every 0 days"), None);

        let parsed = parse("Plants every 0 days, weekly").unwrap();
        assert!(matches!(parsed.rule.pattern(), Pattern::Weekly { .. }));
        assert_eq!(parsed.cleaned_text, "Plants every 0 days,");
    }

    #[test]
    fn test_phrase_only_input_keeps_text() {
        let parsed = parse("  every day  ").unwrap();
        assert_eq!(parsed.cleaned_text, "every day");
    }

    #[test]
    fn test_whitespace_collapsed_around_phrase() {
        let parsed = parse("Take   vitamins   daily   after breakfast").unwrap();
        assert_eq!(parsed.cleaned_text, "Take vitamins after breakfast");
    }

    #[test]
    fn test_word_boundaries() {
        assert_eq!(parse("Buy a dailyplanner"), None);
        assert_eq!(parse("Sunday brunch"), None);
    }

    #[test]
    fn test_weekday_from_name() {
        assert_eq!(weekday_from_name("Tues"), Some(2));
        assert_eq!(weekday_from_name("saturday"), Some(6));
        assert_eq!(weekday_from_name("xx"), None);
        assert_eq!(weekday_from_name("holiday"), None);
    }
}
