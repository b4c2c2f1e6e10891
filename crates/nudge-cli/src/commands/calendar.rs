use anyhow::{anyhow, Result};
use chrono::{Datelike, Utc};
use nudge_core::dates::local_date;
use nudge_core::error::CoreError;
use nudge_core::format::format_recurrence_label;
use owo_colors::OwoColorize;

use crate::cli::CalendarCommand;
use crate::config::Config;
use crate::parser::parse_month;
use crate::store::TaskStore;
use crate::util::load_task;
use crate::views::calendar::render_month;

pub async fn show_calendar(store: &impl TaskStore, config: &Config, command: CalendarCommand) -> Result<()> {
    let tz = config.tz()?;
    let today = local_date(Utc::now(), &tz);
    let first = match command.month.as_deref() {
        Some(month) => parse_month(month)?,
        None => today.with_day(1).unwrap_or(today),
    };

    let task = load_task(store, &command.id).await?;
    let rule = task.recurrence.as_ref().ok_or_else(|| {
        anyhow!(CoreError::InvalidInput(format!(
            "'{}' is not a recurring task",
            task.text
        )))
    })?;

    println!("{} ({})", task.text.bold(), format_recurrence_label(rule).cyan());
    print!("{}", render_month(rule, first, today));
    println!(
        "{} occurrence(s) this month",
        rule.month_occurrences(first.year(), first.month()).len()
    );
    Ok(())
}
