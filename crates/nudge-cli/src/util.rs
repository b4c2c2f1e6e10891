use anyhow::{anyhow, Result};
use nudge_core::error::CoreError;
use nudge_core::models::Task;
use uuid::Uuid;

use crate::store::TaskStore;

/// Characters of the ID shown in tables and accepted as the shortest prefix.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

pub async fn resolve_task_id(store: &impl TaskStore, short_id: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(short_id) {
        return Ok(id);
    }
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let tasks = store.find_tasks_by_short_id_prefix(short_id).await?;
    if tasks.len() == 1 {
        Ok(tasks[0].id)
    } else if tasks.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let task_info: Vec<(String, String)> = tasks
            .into_iter()
            .map(|t| (t.id.to_string(), t.text))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(task_info)))
    }
}

/// Resolves an ID and loads the task, rejecting deleted ones.
pub async fn load_task(store: &impl TaskStore, short_id: &str) -> Result<Task> {
    let task_id = resolve_task_id(store, short_id).await?;
    match store.find_task_by_id(task_id).await? {
        Some(task) if !task.deleted => Ok(task),
        _ => Err(anyhow!(CoreError::NotFound(format!(
            "Task with ID '{}' not found.",
            task_id
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use nudge_core::models::NewTaskData;

    async fn add(store: &JsonFileStore, text: &str) -> Task {
        store
            .add_task(NewTaskData {
                text: text.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolves_full_and_short_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("tasks.json"));
        let task = add(&store, "Water plants").await;

        assert_eq!(resolve_task_id(&store, &task.id.to_string()).await.unwrap(), task.id);
        assert_eq!(resolve_task_id(&store, &short_id(&task.id)).await.unwrap(), task.id);
        assert_eq!(load_task(&store, &short_id(&task.id)).await.unwrap().text, "Water plants");
    }

    #[tokio::test]
    async fn test_rejects_short_and_unknown_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("tasks.json"));
        add(&store, "Only task").await;

        let err = resolve_task_id(&store, "a").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<CoreError>(), Some(CoreError::InvalidInput(_))));

        let err = resolve_task_id(&store, "zz").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<CoreError>(), Some(CoreError::NotFound(_))));
    }
}
