use anyhow::Result;
use chrono::Utc;
use dialoguer::Confirm;

use crate::cli::DeleteCommand;
use crate::store::TaskStore;
use crate::util::load_task;

pub async fn delete_task(store: &impl TaskStore, command: DeleteCommand) -> Result<()> {
    let mut task = load_task(store, &command.id).await?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!("Are you sure you want to delete task '{}'?", task.text))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    task.soft_delete(Utc::now());
    let task = store.update_task(task).await?;
    println!("Deleted task: '{}'", task.text);
    Ok(())
}
