//! Human-readable renderings of a recurrence rule: a short chip label and a
//! longer summary sentence that includes the end condition. Neither reads the
//! rule's exception dates.

use std::fmt;

use crate::rule::{DayOfMonth, EndCondition, Pattern, RecurrenceRule, WeekdaySet};

const SHORT_DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const LONG_DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// English ordinal for a positive number: 1st, 2nd, 3rd, 11th, 22nd.
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

fn short_days(days: WeekdaySet) -> String {
    days.iter()
        .map(|index| SHORT_DAY_NAMES[index as usize])
        .collect::<Vec<_>>()
        .join("/")
}

fn long_days(days: WeekdaySet) -> String {
    let names: Vec<&str> = days
        .iter()
        .map(|index| LONG_DAY_NAMES[index as usize])
        .collect();
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

fn day_of_month_phrase(day: DayOfMonth) -> String {
    match day {
        DayOfMonth::Day(d) => format!("the {}", ordinal(d as u32)),
        DayOfMonth::Last => "the last day".to_string(),
    }
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Pattern::Daily | Pattern::EveryNDays { interval: 1 } => write!(f, "Daily"),
            Pattern::Weekdays => write!(f, "Weekdays"),
            Pattern::Weekly { days } | Pattern::EveryNWeeks { interval: 1, days } => {
                write!(f, "Weekly on {}", short_days(days))
            }
            Pattern::Biweekly { days } => write!(f, "Every other week on {}", short_days(days)),
            Pattern::Monthly { day } | Pattern::EveryNMonths { interval: 1, day } => {
                write!(f, "Monthly on {}", day_of_month_phrase(day))
            }
            Pattern::EveryNDays { interval } => write!(f, "Every {} days", interval),
            Pattern::EveryNWeeks { interval, days } => {
                write!(f, "Every {} weeks on {}", interval, short_days(days))
            }
            Pattern::EveryNMonths { interval, day } => {
                write!(f, "Every {} months on {}", interval, day_of_month_phrase(day))
            }
        }
    }
}

/// Short chip label, e.g. "Weekly on Mon/Wed" or "Monthly on the last day".
pub fn format_recurrence_label(rule: &RecurrenceRule) -> String {
    rule.pattern().to_string()
}

fn pattern_summary(pattern: &Pattern) -> String {
    match *pattern {
        Pattern::Daily | Pattern::EveryNDays { interval: 1 } => "Repeats daily".to_string(),
        Pattern::Weekdays => "Repeats every weekday".to_string(),
        Pattern::Weekly { days } | Pattern::EveryNWeeks { interval: 1, days } => {
            format!("Repeats weekly on {}", long_days(days))
        }
        Pattern::Biweekly { days } => format!("Repeats every other week on {}", long_days(days)),
        Pattern::Monthly { day } | Pattern::EveryNMonths { interval: 1, day } => {
            format!("Repeats monthly on {}", day_of_month_phrase(day))
        }
        Pattern::EveryNDays { interval } => format!("Repeats every {} days", interval),
        Pattern::EveryNWeeks { interval, days } => {
            format!("Repeats every {} weeks on {}", interval, long_days(days))
        }
        Pattern::EveryNMonths { interval, day } => format!(
            "Repeats every {} months on {}",
            interval,
            day_of_month_phrase(day)
        ),
    }
}

/// Full sentence including the end condition, e.g.
/// "Repeats weekly on Monday until Dec 31, 2025".
pub fn get_recurrence_summary(rule: &RecurrenceRule) -> String {
    let mut summary = pattern_summary(rule.pattern());
    match rule.end() {
        EndCondition::Never => {}
        EndCondition::OnDate(date) => {
            summary.push_str(&format!(" until {}", date.format("%b %-d, %Y")));
        }
        EndCondition::AfterOccurrences(count) => {
            summary.push_str(&format!(", {}", plural(count.get(), "time")));
        }
    }
    summary
}
