//! Which tasks belong in "today's" list.
//!
//! A task can carry four competing temporal signals: a recurrence rule, a hard
//! deadline, a scheduled ("deferred to") date and its creation date, which
//! drives rollover of stale incomplete items. [`TodayView::should_show`]
//! resolves them in a fixed order:
//!
//! 1. deleted tasks never show;
//! 2. a recurrence rule alone decides, independent of `completed`; a rule that
//!    could not be read matches no day;
//! 3. an incomplete task due today shows;
//! 4. an incomplete task scheduled for today shows, one scheduled later does not;
//! 5. a completed task shows only on the day it was completed;
//! 6. everything else rolls over from its creation day onward unless exempt.

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::debug;

use crate::dates::{local_date, parse_date};
use crate::models::Task;

/// Today-view filter bound to the timezone used to read task instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodayView {
    timezone: Tz,
}

impl Default for TodayView {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl TodayView {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn should_show(&self, task: &Task, today: NaiveDate) -> bool {
        if task.deleted {
            return false;
        }

        if let Some(rule) = &task.recurrence {
            return rule.is_occurrence_visible(today);
        }
        if task.unreadable_recurrence.is_some() {
            return false;
        }

        if !task.completed {
            if let Some(due) = task.due_date {
                if local_date(due, &self.timezone) == today {
                    return true;
                }
            }

            match task.deferred_date() {
                Some(scheduled) if scheduled == today => return true,
                Some(scheduled) if scheduled > today => return false,
                _ => {}
            }
        } else {
            return task
                .completed_at
                .is_some_and(|at| local_date(at, &self.timezone) == today);
        }

        let created = local_date(task.created_at, &self.timezone);
        if created == today {
            true
        } else if created < today {
            !task.skip_rollover
        } else {
            debug!(task = %task.id, %created, %today, "task created after the viewed day");
            false
        }
    }

    /// True for an incomplete one-off task carried over from an earlier day.
    pub fn is_rolled_over(&self, task: &Task, today: NaiveDate) -> bool {
        !task.completed
            && !task.deleted
            && !task.is_recurring()
            && !task.skip_rollover
            && local_date(task.created_at, &self.timezone) < today
            && self.should_show(task, today)
    }

    pub fn count_rolled_over<'a, I>(&self, tasks: I, today: NaiveDate) -> usize
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks
            .into_iter()
            .filter(|task| self.is_rolled_over(task, today))
            .count()
    }

    /// The subset of `tasks` visible on `today`, in input order.
    pub fn filter<'a, I>(&self, tasks: I, today: NaiveDate) -> Vec<&'a Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks
            .into_iter()
            .filter(|task| self.should_show(task, today))
            .collect()
    }
}

/// Today-view decision for a `YYYY-MM-DD` day, reading instants in UTC.
///
/// An unparseable day shows nothing.
pub fn should_show_in_today_view(task: &Task, today: &str) -> bool {
    match parse_date(today) {
        Ok(today) => TodayView::default().should_show(task, today),
        Err(e) => {
            debug!(today, error = %e, "cannot evaluate today view");
            false
        }
    }
}

pub fn is_rolled_over(task: &Task, today: &str) -> bool {
    parse_date(today).is_ok_and(|today| TodayView::default().is_rolled_over(task, today))
}

pub fn count_rolled_over_tasks(tasks: &[Task], today: &str) -> usize {
    match parse_date(today) {
        Ok(today) => TodayView::default().count_rolled_over(tasks, today),
        Err(_) => 0,
    }
}
