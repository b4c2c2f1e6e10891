//! Per-occurrence exception dates attached to a recurrence rule.
//!
//! A recurring task is a template; marking one occurrence done or dismissing it
//! never touches the pattern itself. Both sets are keyed by calendar date and
//! are kept disjoint by every mutating operation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDates {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    completed_dates: BTreeSet<NaiveDate>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    skipped_dates: BTreeSet<NaiveDate>,
}

/// State of a single occurrence as far as the exception sets are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceState {
    Completed,
    Skipped,
    Untouched,
}

impl ExceptionDates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the store from raw membership lists.
    ///
    /// A date listed in both sets is kept as completed: completion overrides.
    pub fn from_sets<C, S>(completed: C, skipped: S) -> Self
    where
        C: IntoIterator<Item = NaiveDate>,
        S: IntoIterator<Item = NaiveDate>,
    {
        let completed_dates: BTreeSet<NaiveDate> = completed.into_iter().collect();
        let skipped_dates = skipped
            .into_iter()
            .filter(|date| !completed_dates.contains(date))
            .collect();
        Self {
            completed_dates,
            skipped_dates,
        }
    }

    pub fn mark_completed(&mut self, date: NaiveDate) {
        self.skipped_dates.remove(&date);
        self.completed_dates.insert(date);
    }

    pub fn mark_skipped(&mut self, date: NaiveDate) {
        self.completed_dates.remove(&date);
        self.skipped_dates.insert(date);
    }

    /// Removes the date from both sets. Returns true if anything changed.
    pub fn clear(&mut self, date: NaiveDate) -> bool {
        let was_completed = self.completed_dates.remove(&date);
        let was_skipped = self.skipped_dates.remove(&date);
        was_completed || was_skipped
    }

    /// Flips completion for one occurrence and returns the new state.
    pub fn toggle_completed(&mut self, date: NaiveDate) -> bool {
        if self.completed_dates.remove(&date) {
            false
        } else {
            self.mark_completed(date);
            true
        }
    }

    /// Flips the skip marker for one occurrence and returns the new state.
    pub fn toggle_skipped(&mut self, date: NaiveDate) -> bool {
        if self.skipped_dates.remove(&date) {
            false
        } else {
            self.mark_skipped(date);
            true
        }
    }

    #[inline]
    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }

    #[inline]
    pub fn is_skipped(&self, date: NaiveDate) -> bool {
        self.skipped_dates.contains(&date)
    }

    pub fn state(&self, date: NaiveDate) -> OccurrenceState {
        if self.is_completed(date) {
            OccurrenceState::Completed
        } else if self.is_skipped(date) {
            OccurrenceState::Skipped
        } else {
            OccurrenceState::Untouched
        }
    }

    /// Completed dates in chronological order.
    pub fn completed(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.completed_dates.iter().copied()
    }

    /// Skipped dates in chronological order.
    pub fn skipped(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.skipped_dates.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.completed_dates.len() + self.skipped_dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed_dates.is_empty() && self.skipped_dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mark_completed_removes_skip() {
        let mut ex = ExceptionDates::new();
        let day = ymd(2025, 5, 5);
        ex.mark_skipped(day);
        assert_eq!(ex.state(day), OccurrenceState::Skipped);

        ex.mark_completed(day);
        assert_eq!(ex.state(day), OccurrenceState::Completed);
        assert!(!ex.is_skipped(day));
        assert_eq!(ex.len(), 1);
    }

    #[test]
    fn test_mark_skipped_removes_completion() {
        let mut ex = ExceptionDates::new();
        let day = ymd(2025, 5, 5);
        ex.mark_completed(day);
        ex.mark_skipped(day);
        assert!(ex.is_skipped(day));
        assert!(!ex.is_completed(day));
    }

    #[test]
    fn test_toggles() {
        let mut ex = ExceptionDates::new();
        let day = ymd(2025, 5, 6);

        assert!(ex.toggle_completed(day));
        assert!(!ex.toggle_completed(day));
        assert_eq!(ex.state(day), OccurrenceState::Untouched);

        assert!(ex.toggle_completed(day));
        assert!(ex.toggle_skipped(day));
        assert!(!ex.is_completed(day));
        assert!(!ex.toggle_skipped(day));
        assert!(ex.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut ex = ExceptionDates::new();
        let day = ymd(2025, 5, 7);
        assert!(!ex.clear(day));
        ex.mark_skipped(day);
        assert!(ex.clear(day));
        assert!(ex.is_empty());
    }

    #[test]
    fn test_from_sets_prefers_completion() {
        let shared = ymd(2025, 1, 1);
        let ex = ExceptionDates::from_sets(vec![shared], vec![shared, ymd(2025, 1, 2)]);
        assert!(ex.is_completed(shared));
        assert!(!ex.is_skipped(shared));
        assert_eq!(ex.skipped().collect::<Vec<_>>(), vec![ymd(2025, 1, 2)]);
    }

    #[test]
    fn test_serializes_as_sorted_date_strings() {
        let mut ex = ExceptionDates::new();
        ex.mark_completed(ymd(2025, 3, 2));
        ex.mark_completed(ymd(2025, 3, 1));
        let json = serde_json::to_value(&ex).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "completedDates": ["2025-03-01", "2025-03-02"] })
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        Complete(u8),
        Skip(u8),
        ToggleComplete(u8),
        ToggleSkip(u8),
        Clear(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..10).prop_map(Op::Complete),
            (0u8..10).prop_map(Op::Skip),
            (0u8..10).prop_map(Op::ToggleComplete),
            (0u8..10).prop_map(Op::ToggleSkip),
            (0u8..10).prop_map(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn prop_sets_stay_disjoint(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let base = ymd(2025, 1, 1);
            let mut ex = ExceptionDates::new();
            for op in ops {
                let day = |n: u8| base + chrono::Duration::days(n as i64);
                match op {
                    Op::Complete(n) => ex.mark_completed(day(n)),
                    Op::Skip(n) => ex.mark_skipped(day(n)),
                    Op::ToggleComplete(n) => { ex.toggle_completed(day(n)); }
                    Op::ToggleSkip(n) => { ex.toggle_skipped(day(n)); }
                    Op::Clear(n) => { ex.clear(day(n)); }
                }
                for date in ex.completed() {
                    prop_assert!(!ex.is_skipped(date));
                }
            }
        }
    }
}
