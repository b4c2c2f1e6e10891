use anyhow::Result;
use owo_colors::OwoColorize;

use crate::cli::RolloverCommand;
use crate::store::TaskStore;
use crate::util::load_task;

pub async fn set_rollover(store: &impl TaskStore, command: RolloverCommand) -> Result<()> {
    let mut task = load_task(store, &command.id).await?;
    task.skip_rollover = command.off;
    let task = store.update_task(task).await?;

    if task.skip_rollover {
        println!("'{}' will no longer roll over to later days", task.text);
    } else {
        println!("'{}' rolls over until it is done", task.text);
    }
    if task.is_recurring() {
        println!(
            "{} recurring tasks follow their rule; rollover does not affect them",
            "!".yellow()
        );
    }
    Ok(())
}
