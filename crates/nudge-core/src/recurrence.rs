use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::dates::{days_between, last_day_of_month, months_between, parse_date, whole_weeks_between};
use crate::exceptions::OccurrenceState;
use crate::rule::{EndCondition, Pattern, RawRecurrence, RecurrenceRule, WeekdaySet};

/// How far ahead `next_occurrence_after` looks before concluding a series is over.
pub const SEARCH_HORIZON_DAYS: i64 = 366 * 5;

/// Returns whether `date` (`YYYY-MM-DD`) is a nominal occurrence of `rule`.
///
/// Exception dates are not consulted here; callers decide how completed and
/// skipped occurrences take precedence. An unparseable date is never an
/// occurrence.
pub fn date_matches_recurrence(rule: &RecurrenceRule, date: &str) -> bool {
    match parse_date(date) {
        Ok(date) => rule.matches(date),
        Err(e) => {
            debug!(date, error = %e, "date is not an occurrence candidate");
            false
        }
    }
}

/// Same as [`date_matches_recurrence`] for a rule still in its stored form.
///
/// A record that does not describe a complete rule matches nothing.
pub fn matches_raw(raw: &RawRecurrence, date: &str) -> bool {
    match RecurrenceRule::try_from(raw.clone()) {
        Ok(rule) => date_matches_recurrence(&rule, date),
        Err(e) => {
            debug!(frequency = %raw.frequency, error = %e, "recurrence record rejected");
            false
        }
    }
}

/// Last day searched from `from`, saturating at the end of the calendar.
fn horizon_end(from: NaiveDate) -> NaiveDate {
    from.checked_add_signed(Duration::days(SEARCH_HORIZON_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// A single date of a series together with its exception state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub state: OccurrenceState,
}

impl Occurrence {
    /// Returns true if this occurrence should be shown to the user
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.state != OccurrenceState::Skipped
    }
}

impl RecurrenceRule {
    /// Nominal membership test: pattern plus end condition, no exceptions.
    pub fn matches(&self, date: NaiveDate) -> bool {
        if self.validate().is_err() || !self.pattern_matches(date) {
            return false;
        }

        match *self.end() {
            EndCondition::Never => true,
            EndCondition::OnDate(end) => date <= end,
            EndCondition::AfterOccurrences(limit) => self
                .ordinal_within(date, limit.get())
                .is_some(),
        }
    }

    /// Exception-aware visibility of one date.
    ///
    /// A completed date is always present, even if the pattern no longer
    /// selects it. Otherwise the date must match and must not be skipped.
    pub fn is_occurrence_visible(&self, date: NaiveDate) -> bool {
        let exceptions = self.exceptions();
        exceptions.is_completed(date) || (!exceptions.is_skipped(date) && self.matches(date))
    }

    /// 1-based position of `date` among the nominal occurrences, ignoring the
    /// end condition. `None` when `date` is not an occurrence.
    pub fn occurrence_ordinal(&self, date: NaiveDate) -> Option<u32> {
        if self.validate().is_err() || !self.pattern_matches(date) {
            return None;
        }
        self.ordinal_within(date, u32::MAX)
    }

    /// All occurrences in `[from, to]`, honouring the end condition.
    pub fn occurrences_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        if to < from || self.validate().is_err() {
            return Vec::new();
        }

        let (begin, last, limit) = match *self.end() {
            EndCondition::Never => (from.max(self.start_date()), to, None),
            EndCondition::OnDate(end) => (from.max(self.start_date()), to.min(end), None),
            // Counting has to start at the anchor regardless of `from`.
            EndCondition::AfterOccurrences(n) => (self.start_date(), to, Some(n.get())),
        };

        let mut occurrences = Vec::new();
        let mut count = 0u32;
        let mut cursor = begin;
        while cursor <= last {
            if self.pattern_matches(cursor) {
                count += 1;
                if limit.is_some_and(|n| count > n) {
                    break;
                }
                if cursor >= from {
                    occurrences.push(cursor);
                }
            }
            match cursor.succ_opt() {
                Some(next) => cursor = next,
                None => break,
            }
        }
        occurrences
    }

    /// Occurrences falling in one calendar month, for month-grid rendering.
    pub fn month_occurrences(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        match (NaiveDate::from_ymd_opt(year, month, 1), last_day_of_month(year, month)) {
            (Some(first), Some(last)) => self.occurrences_between(first, last),
            _ => Vec::new(),
        }
    }

    /// First non-skipped occurrence strictly after `after`.
    ///
    /// Returns `None` once the series has ended or nothing matches within
    /// [`SEARCH_HORIZON_DAYS`].
    pub fn next_occurrence_after(&self, after: NaiveDate) -> Option<NaiveDate> {
        let from = after.succ_opt()?;
        let to = horizon_end(after);
        self.occurrences_between(from, to)
            .into_iter()
            .find(|date| !self.exceptions().is_skipped(*date))
    }

    /// Up to `count` upcoming occurrences from `from` (inclusive), with their
    /// exception state. Skipped occurrences are included and marked.
    pub fn preview_occurrences(&self, from: NaiveDate, count: usize) -> Vec<Occurrence> {
        let to = horizon_end(from);
        self.occurrences_between(from, to)
            .into_iter()
            .take(count)
            .map(|date| Occurrence {
                date,
                state: self.exceptions().state(date),
            })
            .collect()
    }

    fn pattern_matches(&self, date: NaiveDate) -> bool {
        let start = self.start_date();
        if date < start {
            return false;
        }

        match *self.pattern() {
            Pattern::Daily => true,
            Pattern::Weekdays => WeekdaySet::WORKWEEK.contains_date(date),
            Pattern::Weekly { days } => days.contains_date(date),
            Pattern::Biweekly { days } => {
                days.contains_date(date) && whole_weeks_between(start, date) % 2 == 0
            }
            Pattern::Monthly { day } => day.matches(date),
            Pattern::EveryNDays { interval } => days_between(start, date) % interval as i64 == 0,
            Pattern::EveryNWeeks { interval, days } => {
                days.contains_date(date) && whole_weeks_between(start, date) % interval as i64 == 0
            }
            Pattern::EveryNMonths { interval, day } => {
                day.matches(date) && months_between(start, date) % interval as i64 == 0
            }
        }
    }

    /// Ordinal of a date already known to match the pattern, or `None` if
    /// more than `limit` occurrences precede it.
    fn ordinal_within(&self, date: NaiveDate, limit: u32) -> Option<u32> {
        let start = self.start_date();
        let ordinal = match *self.pattern() {
            Pattern::Daily => Some(days_between(start, date) + 1),
            Pattern::EveryNDays { interval } => {
                Some(days_between(start, date) / interval as i64 + 1)
            }
            _ => None,
        };
        if let Some(ordinal) = ordinal {
            return u32::try_from(ordinal).ok().filter(|n| *n <= limit);
        }

        let mut count = 0u32;
        let mut cursor = start;
        while cursor <= date {
            if self.pattern_matches(cursor) {
                count += 1;
                if cursor == date {
                    return Some(count);
                }
                if count >= limit {
                    return None;
                }
            }
            cursor = cursor.succ_opt()?;
        }
        None
    }
}
