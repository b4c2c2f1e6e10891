use chrono::{Datelike, NaiveDate};
use nudge_core::dates::{days_in_month, weekday_index};
use nudge_core::rule::RecurrenceRule;

/// Marker printed after a day number in the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayMark {
    None,
    Scheduled,
    Completed,
    Skipped,
}

impl DayMark {
    pub fn for_day(rule: &RecurrenceRule, date: NaiveDate) -> Self {
        let exceptions = rule.exceptions();
        if exceptions.is_completed(date) {
            DayMark::Completed
        } else if rule.matches(date) {
            if exceptions.is_skipped(date) {
                DayMark::Skipped
            } else {
                DayMark::Scheduled
            }
        } else {
            DayMark::None
        }
    }

    fn symbol(self) -> char {
        match self {
            DayMark::None => ' ',
            DayMark::Scheduled => '*',
            DayMark::Completed => '✓',
            DayMark::Skipped => '-',
        }
    }
}

/// Renders a Sunday-first month grid for `rule`; `today` is bracketed.
///
/// Returns an empty string for an invalid year/month.
pub fn render_month(rule: &RecurrenceRule, first: NaiveDate, today: NaiveDate) -> String {
    let Some(days) = days_in_month(first.year(), first.month()) else {
        return String::new();
    };

    let mut out = String::new();
    out.push_str(&format!("{:^35}\n", first.format("%B %Y").to_string()));
    out.push_str("  Sun  Mon  Tue  Wed  Thu  Fri  Sat\n");

    let lead = weekday_index(first) as usize;
    let mut line = "     ".repeat(lead);
    for day in 1..=days {
        let Some(date) = first.with_day(day) else {
            continue;
        };
        let mark = DayMark::for_day(rule, date).symbol();
        if date == today {
            line.push_str(&format!("[{:>2}]{}", day, mark));
        } else {
            line.push_str(&format!(" {:>2} {}", day, mark));
        }
        if weekday_index(date) == 6 {
            out.push_str(line.trim_end());
            out.push('\n');
            line.clear();
        }
    }
    if !line.trim().is_empty() {
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str("\n* scheduled  ✓ completed  - skipped\n");
    out
}
