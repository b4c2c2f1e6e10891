use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::dates::date_portion;
use crate::rule::RecurrenceRule;

/// A task as the scheduling engine sees it.
///
/// Only the temporal fields drive scheduling; `text` and `notes` are carried so
/// the record round-trips through the task file unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Hard deadline
    pub due_date: Option<DateTime<Utc>>,
    /// "Scheduled for" marker, `YYYY-MM-DD` optionally followed by a time
    pub deferred_to: Option<String>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub skip_rollover: bool,
    /// Template rule for recurring tasks. Completion of individual
    /// occurrences lives in the rule's exception dates, not on the task.
    pub recurrence: Option<RecurrenceRule>,
    /// Stored rule that does not describe a valid recurrence. The task stays
    /// loadable but matches no day; the record is written back as found
    /// until the rule is replaced or cleared.
    pub unreadable_recurrence: Option<serde_json::Value>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            text: "".to_string(),
            notes: None,
            created_at: Utc::now(),
            completed: false,
            completed_at: None,
            due_date: None,
            deferred_to: None,
            deleted: false,
            deleted_at: None,
            skip_rollover: false,
            recurrence: None,
            unreadable_recurrence: None,
        }
    }
}

/// The task as persisted. The rule stays untyped here so that a rejected
/// rule costs the task its schedule, not its record.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: Uuid,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deferred_to: Option<String>,
    #[serde(default)]
    deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    skip_rollover: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurrence: Option<serde_json::Value>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let (recurrence, unreadable_recurrence) = match record.recurrence {
            None | Some(serde_json::Value::Null) => (None, None),
            Some(value) => match serde_json::from_value::<RecurrenceRule>(value.clone()) {
                Ok(rule) => (Some(rule), None),
                Err(e) => {
                    warn!(task = %record.id, error = %e, "ignoring unreadable recurrence rule");
                    (None, Some(value))
                }
            },
        };

        Self {
            id: record.id,
            text: record.text,
            notes: record.notes,
            created_at: record.created_at,
            completed: record.completed,
            completed_at: record.completed_at,
            due_date: record.due_date,
            deferred_to: record.deferred_to,
            deleted: record.deleted,
            deleted_at: record.deleted_at,
            skip_rollover: record.skip_rollover,
            recurrence,
            unreadable_recurrence,
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let recurrence = match task.recurrence {
            Some(rule) => serde_json::to_value(rule).ok(),
            None => task.unreadable_recurrence,
        };

        Self {
            id: task.id,
            text: task.text,
            notes: task.notes,
            created_at: task.created_at,
            completed: task.completed,
            completed_at: task.completed_at,
            due_date: task.due_date,
            deferred_to: task.deferred_to,
            deleted: task.deleted,
            deleted_at: task.deleted_at,
            skip_rollover: task.skip_rollover,
            recurrence,
        }
    }
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn from_new(data: NewTaskData, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: data.text,
            notes: data.notes,
            created_at: now,
            due_date: data.due_date,
            deferred_to: data.deferred_to,
            skip_rollover: data.skip_rollover,
            recurrence: data.recurrence,
            ..Default::default()
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Replaces the rule, discarding any unreadable one.
    pub fn set_recurrence(&mut self, rule: Option<RecurrenceRule>) {
        self.recurrence = rule;
        self.unreadable_recurrence = None;
    }

    /// Calendar date portion of `deferred_to`, if it parses.
    pub fn deferred_date(&self) -> Option<NaiveDate> {
        self.deferred_to.as_deref().and_then(date_portion)
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(at);
    }

    pub fn reopen(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    pub fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.deleted = true;
        self.deleted_at = Some(at);
    }

    /// Flips completion of one occurrence of a recurring task.
    ///
    /// Returns the new completion state, or `None` for a non-recurring task.
    pub fn toggle_occurrence_completed(&mut self, date: NaiveDate) -> Option<bool> {
        self.recurrence
            .as_mut()
            .map(|rule| rule.exceptions_mut().toggle_completed(date))
    }

    /// Flips the skip marker of one occurrence of a recurring task.
    pub fn toggle_occurrence_skipped(&mut self, date: NaiveDate) -> Option<bool> {
        self.recurrence
            .as_mut()
            .map(|rule| rule.exceptions_mut().toggle_skipped(date))
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTaskData {
    pub text: String,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub deferred_to: Option<String>,
    pub skip_rollover: bool,
    pub recurrence: Option<RecurrenceRule>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_deserializes_minimal_record() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "0190b5b4-0c7a-7d1e-9a51-4c2f2c1e9b10",
            "text": "Water plants",
            "createdAt": "2025-03-01T08:00:00Z",
            "recurrence": { "frequency": "custom", "days": [6], "startDate": "2025-03-01" }
        }))
        .unwrap();

        assert_eq!(task.text, "Water plants");
        assert!(!task.completed);
        assert!(!task.skip_rollover);
        assert!(task.is_recurring());
    }

    #[test]
    fn test_invalid_recurrence_keeps_the_task() {
        let broken_rule = serde_json::json!({ "frequency": "monthly", "startDate": "2025-03-01" });
        let mut task: Task = serde_json::from_value(serde_json::json!({
            "id": "0190b5b4-0c7a-7d1e-9a51-4c2f2c1e9b10",
            "text": "Broken",
            "createdAt": "2025-03-01T08:00:00Z",
            "recurrence": broken_rule
        }))
        .unwrap();

        assert_eq!(task.text, "Broken");
        assert!(!task.is_recurring());
        assert_eq!(task.unreadable_recurrence, Some(broken_rule.clone()));

        let saved = serde_json::to_value(&task).unwrap();
        assert_eq!(saved["recurrence"], broken_rule);

        task.set_recurrence(None);
        let saved = serde_json::to_value(&task).unwrap();
        assert!(saved.get("recurrence").is_none());
    }

    #[test]
    fn test_deferred_date() {
        let mut task = Task::new("Call back");
        task.deferred_to = Some("2025-04-02T15:30".to_string());
        assert_eq!(task.deferred_date(), Some(ymd(2025, 4, 2)));
        task.deferred_to = Some("soon".to_string());
        assert_eq!(task.deferred_date(), None);
    }

    #[test]
    fn test_complete_and_reopen() {
        let mut task = Task::new("Ship it");
        let at = Utc.with_ymd_and_hms(2025, 4, 2, 10, 0, 0).unwrap();
        task.complete(at);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(at));
        task.reopen();
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn test_occurrence_toggles_only_apply_to_recurring_tasks() {
        let mut task = Task::new("Stretch");
        assert_eq!(task.toggle_occurrence_completed(ymd(2025, 1, 1)), None);

        task.recurrence = Some(RecurrenceRule::daily(ymd(2025, 1, 1)));
        assert_eq!(task.toggle_occurrence_skipped(ymd(2025, 1, 2)), Some(true));
        assert_eq!(task.toggle_occurrence_completed(ymd(2025, 1, 2)), Some(true));

        let rule = task.recurrence.as_ref().unwrap();
        assert!(rule.exceptions().is_completed(ymd(2025, 1, 2)));
        assert!(!rule.exceptions().is_skipped(ymd(2025, 1, 2)));
        assert!(!task.completed);
    }
}
