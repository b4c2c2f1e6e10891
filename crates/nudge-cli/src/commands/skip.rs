use anyhow::{anyhow, Result};
use chrono::Utc;
use nudge_core::dates::local_date;
use nudge_core::error::CoreError;

use crate::cli::SkipCommand;
use crate::config::Config;
use crate::parser::parse_day;
use crate::store::TaskStore;
use crate::util::load_task;

pub async fn skip_occurrence(store: &impl TaskStore, config: &Config, command: SkipCommand) -> Result<()> {
    let tz = config.tz()?;
    let now = Utc::now();
    let day = match command.on.as_deref() {
        Some(input) => parse_day(input, now, &tz)?,
        None => local_date(now, &tz),
    };
    let mut task = load_task(store, &command.id).await?;

    let skipped = task.toggle_occurrence_skipped(day).ok_or_else(|| {
        anyhow!(CoreError::InvalidInput(format!(
            "'{}' is not a recurring task; only occurrences can be skipped",
            task.text
        )))
    })?;
    let task = store.update_task(task).await?;

    if skipped {
        println!("Skipped '{}' on {}", task.text, day);
    } else {
        println!("Restored '{}' on {}", task.text, day);
    }
    Ok(())
}
