use chrono::{DateTime, NaiveDate, Utc};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use nudge_core::exceptions::OccurrenceState;
use nudge_core::format::format_recurrence_label;
use nudge_core::models::Task;
use nudge_core::recurrence::Occurrence;
use uuid::Uuid;

use crate::util::short_id;

pub const UNREADABLE_RULE_LABEL: &str = "unreadable rule";

/// How a task reads on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Open,
    Done,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ViewTask {
    pub id: Uuid,
    pub text: String,
    pub state: TaskState,
    pub recurrence_label: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub deferred_to: Option<String>,
    pub rolled_over: bool,
    pub skip_rollover: bool,
}

impl ViewTask {
    /// Builds the row for `task` as seen on `day`.
    pub fn on_day(task: &Task, day: NaiveDate, rolled_over: bool) -> Self {
        let state = match &task.recurrence {
            Some(rule) => match rule.exceptions().state(day) {
                OccurrenceState::Completed => TaskState::Done,
                OccurrenceState::Skipped => TaskState::Skipped,
                OccurrenceState::Untouched => TaskState::Open,
            },
            None if task.completed => TaskState::Done,
            None => TaskState::Open,
        };
        Self {
            id: task.id,
            text: task.text.clone(),
            state,
            recurrence_label: match (&task.recurrence, &task.unreadable_recurrence) {
                (Some(rule), _) => Some(format_recurrence_label(rule)),
                (None, Some(_)) => Some(UNREADABLE_RULE_LABEL.to_string()),
                (None, None) => None,
            },
            due_date: task.due_date,
            deferred_to: task.deferred_to.clone(),
            rolled_over,
            skip_rollover: task.skip_rollover,
        }
    }
}

pub fn display_tasks(tasks: &[ViewTask]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    println!("{}", build_task_table(tasks, Utc::now()));
}

pub fn build_task_table(tasks: &[ViewTask], now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Task", "Repeats", "Due", "Scheduled"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&task.id)));

        let mut display_name = String::new();
        if task.recurrence_label.is_some() {
            display_name.push('↻');
            display_name.push(' ');
        }
        display_name.push_str(&task.text);
        if task.rolled_over {
            display_name.push_str(" (rolled over)");
        }
        if task.skip_rollover {
            display_name.push_str(" ⇥");
        }

        let name_cell = match task.state {
            TaskState::Done => Cell::new(display_name)
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey),
            TaskState::Skipped => Cell::new(display_name).fg(Color::DarkGrey),
            TaskState::Open if task.rolled_over => Cell::new(display_name).fg(Color::Yellow),
            TaskState::Open => Cell::new(display_name),
        };
        row.add_cell(name_cell);

        row.add_cell(Cell::new(task.recurrence_label.as_deref().unwrap_or("-")));

        let due_cell = match task.due_date {
            Some(due) => {
                let cell = Cell::new(due.humanize());
                if task.state == TaskState::Open && due < now {
                    cell.fg(Color::Red)
                } else {
                    cell
                }
            }
            None => Cell::new("-"),
        };
        row.add_cell(due_cell);

        row.add_cell(Cell::new(task.deferred_to.as_deref().unwrap_or("-")));
        table.add_row(row);
    }

    table
}

pub fn display_occurrences(occurrences: &[Occurrence], today: NaiveDate) {
    if occurrences.is_empty() {
        println!("No upcoming occurrences.");
        return;
    }
    println!("{}", build_occurrence_table(occurrences, today));
}

pub fn build_occurrence_table(occurrences: &[Occurrence], today: NaiveDate) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Day", "When", "Status"]);

    for (index, occurrence) in occurrences.iter().enumerate() {
        let offset = occurrence.date - today;
        let when = if offset.num_days() == 0 {
            "today".to_string()
        } else {
            offset.humanize()
        };
        let status = match occurrence.state {
            OccurrenceState::Completed => Cell::new("Completed").fg(Color::Green),
            OccurrenceState::Skipped => Cell::new("Skipped").fg(Color::DarkGrey),
            OccurrenceState::Untouched => Cell::new("Scheduled"),
        };

        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(occurrence.date.format("%Y-%m-%d")),
            Cell::new(occurrence.date.format("%a")),
            Cell::new(when),
            status,
        ]);
    }

    table
}
