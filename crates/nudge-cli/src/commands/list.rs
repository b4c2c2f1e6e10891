use anyhow::Result;
use chrono::Utc;
use nudge_core::dates::local_date;
use nudge_core::today::TodayView;

use crate::cli::ListCommand;
use crate::config::Config;
use crate::store::TaskStore;
use crate::views::table::{display_tasks, ViewTask};

pub async fn list_tasks(store: &impl TaskStore, config: &Config, command: ListCommand) -> Result<()> {
    let tz = config.tz()?;
    let today = local_date(Utc::now(), &tz);
    let view = TodayView::new(tz);

    let rows: Vec<ViewTask> = store
        .load_tasks()
        .await?
        .iter()
        .filter(|task| !task.deleted)
        .filter(|task| {
            !command.recurring || task.is_recurring() || task.unreadable_recurrence.is_some()
        })
        .map(|task| ViewTask::on_day(task, today, view.is_rolled_over(task, today)))
        .collect();

    display_tasks(&rows);
    Ok(())
}
