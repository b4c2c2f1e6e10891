use anyhow::{anyhow, Result};
use chrono::Utc;
use nudge_core::dates::local_date;
use nudge_core::error::CoreError;
use owo_colors::OwoColorize;

use crate::cli::DoneCommand;
use crate::config::Config;
use crate::parser::parse_day;
use crate::store::TaskStore;
use crate::util::load_task;

pub async fn done_task(store: &impl TaskStore, config: &Config, command: DoneCommand) -> Result<()> {
    let tz = config.tz()?;
    let now = Utc::now();
    let day = match command.on.as_deref() {
        Some(input) => parse_day(input, now, &tz)?,
        None => local_date(now, &tz),
    };
    let mut task = load_task(store, &command.id).await?;

    if let Some(rule) = &task.recurrence {
        if !rule.matches(day) && !rule.exceptions().is_completed(day) {
            println!(
                "{} {} is not a scheduled occurrence of '{}'",
                "!".yellow(),
                day,
                task.text
            );
        }
        let completed = task.toggle_occurrence_completed(day).unwrap_or(false);
        let task = store.update_task(task).await?;
        if completed {
            println!("Completed '{}' for {}", task.text, day);
        } else {
            println!("Reopened '{}' for {}", task.text, day);
        }
        return Ok(());
    }

    if task.unreadable_recurrence.is_some() {
        return Err(anyhow!(CoreError::InvalidRule(format!(
            "'{}' has a recurrence rule that cannot be read; replace it with `recur set` or remove it with `recur clear`",
            task.text
        ))));
    }
    if command.on.is_some() {
        println!("{} --on only applies to recurring tasks; ignoring it", "!".yellow());
    }
    if task.completed {
        task.reopen();
        let task = store.update_task(task).await?;
        println!("Reopened task: '{}'", task.text);
    } else {
        task.complete(now);
        let task = store.update_task(task).await?;
        println!("Completed task: '{}'", task.text);
    }
    Ok(())
}
