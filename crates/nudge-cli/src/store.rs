//! Task persistence for the CLI: one JSON document holding every task.
//!
//! The core never sees this file. Records that do not deserialize into a
//! [`Task`] at all (for instance one missing its ID) are kept verbatim and
//! written back untouched, so a save never loses data it could not read. A
//! task whose recurrence rule is rejected still loads; see
//! [`Task::unreadable_recurrence`].

use async_trait::async_trait;
use chrono::Utc;
use nudge_core::error::CoreError;
use nudge_core::models::{NewTaskData, Task};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

#[async_trait]
pub trait TaskStore {
    /// Every readable task, deleted ones included, in file order.
    async fn load_tasks(&self) -> Result<Vec<Task>, CoreError>;
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError>;
    /// Replaces the stored task with the same ID.
    async fn update_task(&self, task: Task) -> Result<Task, CoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TaskFile {
    #[serde(default)]
    tasks: Vec<serde_json::Value>,
}

#[derive(Debug, Default)]
struct Snapshot {
    tasks: Vec<Task>,
    unreadable: Vec<serde_json::Value>,
}

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_snapshot(&self) -> Result<Snapshot, CoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "task file does not exist yet");
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Snapshot::default());
        }

        let file: TaskFile = serde_json::from_str(&contents)?;
        let mut snapshot = Snapshot::default();
        for value in file.tasks {
            match serde_json::from_value::<Task>(value.clone()) {
                Ok(task) => snapshot.tasks.push(task),
                Err(e) => {
                    warn!(
                        id = value.get("id").and_then(|id| id.as_str()).unwrap_or("?"),
                        error = %e,
                        "skipping unreadable task record"
                    );
                    snapshot.unreadable.push(value);
                }
            }
        }
        Ok(snapshot)
    }

    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), CoreError> {
        let mut tasks = Vec::with_capacity(snapshot.tasks.len() + snapshot.unreadable.len());
        for task in &snapshot.tasks {
            tasks.push(serde_json::to_value(task)?);
        }
        tasks.extend(snapshot.unreadable.iter().cloned());
        let json = serde_json::to_string_pretty(&TaskFile { tasks })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), tasks = snapshot.tasks.len(), "task file written");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for JsonFileStore {
    async fn load_tasks(&self) -> Result<Vec<Task>, CoreError> {
        Ok(self.read_snapshot().await?.tasks)
    }

    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError> {
        if data.text.trim().is_empty() {
            return Err(CoreError::InvalidInput("Task text cannot be empty".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.read_snapshot().await?;
        let task = Task::from_new(data, Utc::now());
        snapshot.tasks.push(task.clone());
        self.write_snapshot(&snapshot).await?;
        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        Ok(self
            .read_snapshot()
            .await?
            .tasks
            .into_iter()
            .find(|task| task.id == id))
    }

    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError> {
        let prefix = short_id.to_lowercase();
        Ok(self
            .read_snapshot()
            .await?
            .tasks
            .into_iter()
            .filter(|task| !task.deleted && task.id.to_string().starts_with(&prefix))
            .collect())
    }

    async fn update_task(&self, task: Task) -> Result<Task, CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.read_snapshot().await?;
        let slot = snapshot
            .tasks
            .iter_mut()
            .find(|existing| existing.id == task.id)
            .ok_or_else(|| CoreError::NotFound(task.id.to_string()))?;
        *slot = task.clone();
        self.write_snapshot(&snapshot).await?;
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_core::rule::RecurrenceRule;
    use tempfile::TempDir;

    fn setup_store() -> (JsonFileStore, TempDir) {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store = JsonFileStore::new(temp_dir.path().join("data").join("tasks.json"));
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let (store, _dir) = setup_store();
        assert!(store.load_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_find_update() {
        let (store, _dir) = setup_store();
        let start = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let task = store
            .add_task(NewTaskData {
                text: "Stretch".to_string(),
                recurrence: Some(RecurrenceRule::daily(start)),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut found = store.find_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(found, task);

        found.skip_rollover = true;
        store.update_task(found).await.unwrap();
        let reloaded = store.load_tasks().await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded[0].skip_rollover);
        assert!(reloaded[0].is_recurring());
    }

    #[tokio::test]
    async fn test_rejects_empty_text() {
        let (store, _dir) = setup_store();
        let result = store.add_task(NewTaskData::default()).await;
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_update_unknown_task() {
        let (store, _dir) = setup_store();
        let result = store.update_task(Task::new("ghost")).await;
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_prefix_lookup_skips_deleted() {
        let (store, _dir) = setup_store();
        let task = store
            .add_task(NewTaskData {
                text: "Temporary".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let prefix = task.id.to_string()[..8].to_uppercase();
        assert_eq!(store.find_tasks_by_short_id_prefix(&prefix).await.unwrap().len(), 1);

        let mut deleted = task.clone();
        deleted.soft_delete(Utc::now());
        store.update_task(deleted).await.unwrap();
        assert!(store.find_tasks_by_short_id_prefix(&prefix).await.unwrap().is_empty());
    }

    async fn seed(store: &JsonFileStore, records: &[serde_json::Value]) {
        tokio::fs::create_dir_all(store.path().parent().unwrap()).await.unwrap();
        tokio::fs::write(
            store.path(),
            serde_json::to_string(&serde_json::json!({ "tasks": records })).unwrap(),
        )
        .await
        .unwrap();
    }

    async fn saved_records(store: &JsonFileStore) -> Vec<serde_json::Value> {
        let raw: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(store.path()).await.unwrap()).unwrap();
        raw["tasks"].as_array().unwrap().clone()
    }

    #[tokio::test]
    async fn test_unreadable_records_survive_a_save() {
        let (store, _dir) = setup_store();
        let bad = serde_json::json!({ "text": "No id or creation time" });
        seed(&store, &[bad.clone()]).await;

        assert!(store.load_tasks().await.unwrap().is_empty());
        store
            .add_task(NewTaskData {
                text: "Fine".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let tasks = saved_records(&store).await;
        assert_eq!(tasks.len(), 2);
        assert!(tasks.contains(&bad));
    }

    #[tokio::test]
    async fn test_task_with_rejected_rule_stays_reachable() {
        let (store, _dir) = setup_store();
        let broken_rule = serde_json::json!({ "frequency": "monthly", "startDate": "2025-03-01" });
        seed(
            &store,
            &[serde_json::json!({
                "id": "0190b5b4-0c7a-7d1e-9a51-4c2f2c1e9b10",
                "text": "Broken rule",
                "createdAt": "2025-03-01T08:00:00Z",
                "recurrence": broken_rule
            })],
        )
        .await;

        let found = store.find_tasks_by_short_id_prefix("0190b5b4").await.unwrap();
        assert_eq!(found.len(), 1);
        let mut task = found[0].clone();
        assert!(!task.is_recurring());

        task.skip_rollover = true;
        store.update_task(task.clone()).await.unwrap();
        assert_eq!(saved_records(&store).await[0]["recurrence"], broken_rule);

        task.set_recurrence(None);
        store.update_task(task).await.unwrap();
        assert!(saved_records(&store).await[0].get("recurrence").is_none());
    }
}
