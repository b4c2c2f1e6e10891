//! The recurrence rule model.
//!
//! Rules are stored and exchanged as a flat JSON record ([`RawRecurrence`]) in
//! which most fields only mean something for one frequency. Inside the engine
//! the same rule is a [`RecurrenceRule`] whose [`Pattern`] carries exactly the
//! fields its frequency needs, so an incompatible combination (a weekly rule
//! with a day-of-month, a monthly rule without one) cannot be represented.
//! The projection between the two is the only place a rule can be rejected.

use crate::dates::{format_date, parse_date, weekday_index};
use crate::error::CoreError;
use crate::exceptions::ExceptionDates;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekdays,
    Weekly,
    Biweekly,
    Monthly,
    Custom,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekdays => write!(f, "weekdays"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Biweekly => write!(f, "biweekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekdays" => Ok(Frequency::Weekdays),
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            "custom" => Ok(Frequency::Custom),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Days,
    Weeks,
    Months,
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalUnit::Days => write!(f, "days"),
            IntervalUnit::Weeks => write!(f, "weeks"),
            IntervalUnit::Months => write!(f, "months"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndType {
    Never,
    OnDate,
    AfterOccurrences,
}

/// Set of weekday indices, 0 = Sunday … 6 = Saturday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Monday through Friday.
    pub const WORKWEEK: WeekdaySet = WeekdaySet(0b0011_1110);

    pub const fn empty() -> Self {
        WeekdaySet(0)
    }

    /// Builds a set from weekday indices, rejecting anything outside `0..=6`.
    pub fn from_indices<I>(indices: I) -> Result<Self, CoreError>
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        let mut set = WeekdaySet::empty();
        for index in indices {
            let index = index.into();
            if !(0..=6).contains(&index) {
                return Err(CoreError::InvalidRule(format!(
                    "weekday index must be between 0 (Sunday) and 6 (Saturday), got {}",
                    index
                )));
            }
            set.0 |= 1 << index;
        }
        Ok(set)
    }

    /// The set holding only the weekday of `date`.
    pub fn of(date: NaiveDate) -> Self {
        WeekdaySet(1 << weekday_index(date))
    }

    #[inline]
    pub fn contains(&self, index: u8) -> bool {
        index < 7 && self.0 & (1 << index) != 0
    }

    #[inline]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains(weekday_index(date))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Indices in ascending order, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..7).filter(move |index| self.contains(*index))
    }
}

/// Day-of-month selector for monthly patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayOfMonth {
    /// A fixed day, 1..=31. Months without that day produce no occurrence.
    Day(u8),
    /// The last calendar day of each month (`-1` on the wire).
    Last,
}

impl DayOfMonth {
    pub const LAST_SENTINEL: i64 = -1;

    pub fn from_raw(value: i64) -> Result<Self, CoreError> {
        match value {
            Self::LAST_SENTINEL => Ok(DayOfMonth::Last),
            1..=31 => Ok(DayOfMonth::Day(value as u8)),
            _ => Err(CoreError::InvalidRule(format!(
                "dayOfMonth must be 1-31 or -1, got {}",
                value
            ))),
        }
    }

    pub fn to_raw(self) -> i64 {
        match self {
            DayOfMonth::Day(day) => day as i64,
            DayOfMonth::Last => Self::LAST_SENTINEL,
        }
    }

    /// The selector that picks `date`'s own day of month.
    pub fn of(date: NaiveDate) -> Self {
        DayOfMonth::Day(date.day() as u8)
    }

    #[inline]
    pub fn matches(self, date: NaiveDate) -> bool {
        match self {
            DayOfMonth::Day(day) => date.day() == day as u32,
            DayOfMonth::Last => crate::dates::is_last_day_of_month(date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndCondition {
    Never,
    /// Last date (inclusive) that may still produce an occurrence.
    OnDate(NaiveDate),
    /// Number of nominal occurrences, counted from the start date.
    AfterOccurrences(NonZeroU32),
}

impl EndCondition {
    pub fn end_type(&self) -> EndType {
        match self {
            EndCondition::Never => EndType::Never,
            EndCondition::OnDate(_) => EndType::OnDate,
            EndCondition::AfterOccurrences(_) => EndType::AfterOccurrences,
        }
    }
}

/// Frequency together with exactly the fields that frequency uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Daily,
    Weekdays,
    Weekly { days: WeekdaySet },
    Biweekly { days: WeekdaySet },
    Monthly { day: DayOfMonth },
    EveryNDays { interval: u32 },
    EveryNWeeks { interval: u32, days: WeekdaySet },
    EveryNMonths { interval: u32, day: DayOfMonth },
}

impl Pattern {
    pub fn frequency(&self) -> Frequency {
        match self {
            Pattern::Daily => Frequency::Daily,
            Pattern::Weekdays => Frequency::Weekdays,
            Pattern::Weekly { .. } => Frequency::Weekly,
            Pattern::Biweekly { .. } => Frequency::Biweekly,
            Pattern::Monthly { .. } => Frequency::Monthly,
            Pattern::EveryNDays { .. }
            | Pattern::EveryNWeeks { .. }
            | Pattern::EveryNMonths { .. } => Frequency::Custom,
        }
    }

    /// Checks the invariants the type system cannot express.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Pattern::Weekly { days } | Pattern::Biweekly { days } if days.is_empty() => Err(
                CoreError::InvalidRule(format!("{} rule requires at least one day", self.frequency())),
            ),
            Pattern::EveryNWeeks { days, .. } if days.is_empty() => Err(CoreError::InvalidRule(
                "custom weekly rule requires at least one day".to_string(),
            )),
            Pattern::EveryNDays { interval }
            | Pattern::EveryNWeeks { interval, .. }
            | Pattern::EveryNMonths { interval, .. }
                if *interval == 0 =>
            {
                Err(CoreError::InvalidRule(
                    "interval must be a positive integer".to_string(),
                ))
            }
            Pattern::Monthly { day: DayOfMonth::Day(d) }
            | Pattern::EveryNMonths { day: DayOfMonth::Day(d), .. }
                if !(1..=31).contains(d) =>
            {
                Err(CoreError::InvalidRule(format!("dayOfMonth must be 1-31, got {}", d)))
            }
            _ => Ok(()),
        }
    }
}

/// A validated recurrence rule with its per-occurrence exceptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecurrence", into = "RawRecurrence")]
pub struct RecurrenceRule {
    pattern: Pattern,
    start_date: NaiveDate,
    end: EndCondition,
    exceptions: ExceptionDates,
}

impl RecurrenceRule {
    pub fn new(pattern: Pattern, start_date: NaiveDate) -> Result<Self, CoreError> {
        pattern.validate()?;
        Ok(Self {
            pattern,
            start_date,
            end: EndCondition::Never,
            exceptions: ExceptionDates::new(),
        })
    }

    pub fn daily(start_date: NaiveDate) -> Self {
        Self::unchecked(Pattern::Daily, start_date)
    }

    pub fn weekdays(start_date: NaiveDate) -> Self {
        Self::unchecked(Pattern::Weekdays, start_date)
    }

    pub fn weekly(start_date: NaiveDate, days: WeekdaySet) -> Result<Self, CoreError> {
        Self::new(Pattern::Weekly { days }, start_date)
    }

    pub fn biweekly(start_date: NaiveDate, days: WeekdaySet) -> Result<Self, CoreError> {
        Self::new(Pattern::Biweekly { days }, start_date)
    }

    pub fn monthly(start_date: NaiveDate, day: DayOfMonth) -> Result<Self, CoreError> {
        Self::new(Pattern::Monthly { day }, start_date)
    }

    pub fn every_n_days(start_date: NaiveDate, interval: u32) -> Result<Self, CoreError> {
        Self::new(Pattern::EveryNDays { interval }, start_date)
    }

    pub fn every_n_weeks(
        start_date: NaiveDate,
        interval: u32,
        days: WeekdaySet,
    ) -> Result<Self, CoreError> {
        Self::new(Pattern::EveryNWeeks { interval, days }, start_date)
    }

    pub fn every_n_months(
        start_date: NaiveDate,
        interval: u32,
        day: DayOfMonth,
    ) -> Result<Self, CoreError> {
        Self::new(Pattern::EveryNMonths { interval, day }, start_date)
    }

    fn unchecked(pattern: Pattern, start_date: NaiveDate) -> Self {
        Self {
            pattern,
            start_date,
            end: EndCondition::Never,
            exceptions: ExceptionDates::new(),
        }
    }

    pub fn with_end(mut self, end: EndCondition) -> Self {
        self.end = end;
        self
    }

    pub fn with_exceptions(mut self, exceptions: ExceptionDates) -> Self {
        self.exceptions = exceptions;
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn frequency(&self) -> Frequency {
        self.pattern.frequency()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end(&self) -> &EndCondition {
        &self.end
    }

    pub fn exceptions(&self) -> &ExceptionDates {
        &self.exceptions
    }

    /// Mutable access for occurrence toggles; the pattern stays untouched.
    pub fn exceptions_mut(&mut self) -> &mut ExceptionDates {
        &mut self.exceptions
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.pattern.validate()
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The flat record a rule is persisted as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecurrence {
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<i64>>,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_unit: Option<IntervalUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_type: Option<EndType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_after_occurrences: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed_dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_dates: Vec<String>,
}

impl RawRecurrence {
    /// A bare record with only the required fields set.
    pub fn new(frequency: Frequency, start_date: impl Into<String>) -> Self {
        Self {
            frequency,
            days: None,
            start_date: start_date.into(),
            interval: None,
            interval_unit: None,
            day_of_month: None,
            end_type: None,
            end_date: None,
            end_after_occurrences: None,
            completed_dates: Vec::new(),
            skipped_dates: Vec::new(),
        }
    }

    fn pattern(&self) -> Result<Pattern, CoreError> {
        match self.frequency {
            Frequency::Daily => Ok(Pattern::Daily),
            Frequency::Weekdays => Ok(Pattern::Weekdays),
            Frequency::Weekly => Ok(Pattern::Weekly {
                days: self.required_days()?,
            }),
            Frequency::Biweekly => Ok(Pattern::Biweekly {
                days: self.required_days()?,
            }),
            Frequency::Monthly => Ok(Pattern::Monthly {
                day: self.required_day_of_month()?,
            }),
            Frequency::Custom => self.custom_pattern(),
        }
    }

    fn custom_pattern(&self) -> Result<Pattern, CoreError> {
        let interval = match self.interval {
            None => 1,
            Some(n) if n >= 1 && n <= u32::MAX as i64 => n as u32,
            Some(n) => {
                return Err(CoreError::InvalidRule(format!(
                    "interval must be a positive integer, got {}",
                    n
                )))
            }
        };
        let has_days = self.days.as_ref().is_some_and(|days| !days.is_empty());

        // A non-empty `days` list makes it an interval-gated weekly rule,
        // whatever `intervalUnit` says.
        match (has_days, self.interval_unit) {
            (true, _) => Ok(Pattern::EveryNWeeks {
                interval,
                days: self.required_days()?,
            }),
            (false, Some(IntervalUnit::Days)) => Ok(Pattern::EveryNDays { interval }),
            (false, Some(IntervalUnit::Months)) => Ok(Pattern::EveryNMonths {
                interval,
                day: self.required_day_of_month()?,
            }),
            (false, Some(IntervalUnit::Weeks)) => Err(CoreError::InvalidRule(
                "custom weekly rule requires at least one day".to_string(),
            )),
            (false, None) => Err(CoreError::InvalidRule(
                "custom rule requires days or an interval unit".to_string(),
            )),
        }
    }

    fn required_days(&self) -> Result<WeekdaySet, CoreError> {
        let days = WeekdaySet::from_indices(self.days.iter().flatten().copied())?;
        if days.is_empty() {
            return Err(CoreError::InvalidRule(format!(
                "{} rule requires at least one day",
                self.frequency
            )));
        }
        Ok(days)
    }

    fn required_day_of_month(&self) -> Result<DayOfMonth, CoreError> {
        let value = self.day_of_month.ok_or_else(|| {
            CoreError::InvalidRule(format!("{} rule requires dayOfMonth", self.frequency))
        })?;
        DayOfMonth::from_raw(value)
    }

    fn end_condition(&self) -> Result<EndCondition, CoreError> {
        match self.end_type.unwrap_or(EndType::Never) {
            EndType::Never => Ok(EndCondition::Never),
            EndType::OnDate => {
                let raw = self.end_date.as_deref().ok_or_else(|| {
                    CoreError::InvalidRule("endType 'onDate' requires endDate".to_string())
                })?;
                Ok(EndCondition::OnDate(rule_date("endDate", raw)?))
            }
            EndType::AfterOccurrences => {
                let count = self
                    .end_after_occurrences
                    .and_then(|n| u32::try_from(n).ok())
                    .and_then(NonZeroU32::new)
                    .ok_or_else(|| {
                        CoreError::InvalidRule(
                            "endType 'afterOccurrences' requires a positive endAfterOccurrences"
                                .to_string(),
                        )
                    })?;
                Ok(EndCondition::AfterOccurrences(count))
            }
        }
    }
}

fn rule_date(field: &str, value: &str) -> Result<NaiveDate, CoreError> {
    parse_date(value).map_err(|_| {
        CoreError::InvalidRule(format!("{} must be a YYYY-MM-DD date, got '{}'", field, value))
    })
}

fn rule_dates(field: &str, values: &[String]) -> Result<Vec<NaiveDate>, CoreError> {
    values.iter().map(|value| rule_date(field, value)).collect()
}

impl TryFrom<RawRecurrence> for RecurrenceRule {
    type Error = CoreError;

    fn try_from(raw: RawRecurrence) -> Result<Self, Self::Error> {
        let start_date = rule_date("startDate", &raw.start_date)?;
        let pattern = raw.pattern()?;
        let end = raw.end_condition()?;
        let exceptions = ExceptionDates::from_sets(
            rule_dates("completedDates", &raw.completed_dates)?,
            rule_dates("skippedDates", &raw.skipped_dates)?,
        );

        Ok(Self {
            pattern,
            start_date,
            end,
            exceptions,
        })
    }
}

impl From<RecurrenceRule> for RawRecurrence {
    fn from(rule: RecurrenceRule) -> Self {
        let mut raw = RawRecurrence::new(rule.frequency(), format_date(rule.start_date));

        match rule.pattern {
            Pattern::Daily | Pattern::Weekdays => {}
            Pattern::Weekly { days } | Pattern::Biweekly { days } => {
                raw.days = Some(days.iter().map(i64::from).collect());
            }
            Pattern::Monthly { day } => raw.day_of_month = Some(day.to_raw()),
            Pattern::EveryNDays { interval } => {
                raw.interval = Some(interval as i64);
                raw.interval_unit = Some(IntervalUnit::Days);
            }
            Pattern::EveryNWeeks { interval, days } => {
                raw.interval = Some(interval as i64);
                raw.interval_unit = Some(IntervalUnit::Weeks);
                raw.days = Some(days.iter().map(i64::from).collect());
            }
            Pattern::EveryNMonths { interval, day } => {
                raw.interval = Some(interval as i64);
                raw.interval_unit = Some(IntervalUnit::Months);
                raw.day_of_month = Some(day.to_raw());
            }
        }

        raw.end_type = Some(rule.end.end_type());
        match rule.end {
            EndCondition::Never => {}
            EndCondition::OnDate(date) => raw.end_date = Some(format_date(date)),
            EndCondition::AfterOccurrences(count) => {
                raw.end_after_occurrences = Some(count.get() as i64)
            }
        }

        raw.completed_dates = rule.exceptions.completed().map(format_date).collect();
        raw.skipped_dates = rule.exceptions.skipped().map(format_date).collect();
        raw
    }
}
