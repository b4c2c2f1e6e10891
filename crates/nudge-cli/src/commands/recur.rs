use anyhow::{anyhow, Result};
use chrono::Utc;
use comfy_table::Table;
use nudge_core::dates::{format_date, local_date};
use nudge_core::error::CoreError;
use nudge_core::format::{format_recurrence_label, get_recurrence_summary};
use nudge_core::models::Task;
use nudge_core::parser::parse_recurrence_from_text_on;
use nudge_core::rule::{EndCondition, RecurrenceRule};
use owo_colors::OwoColorize;
use std::num::NonZeroU32;

use crate::cli::{
    RecurClearCommand, RecurCommand, RecurInfoCommand, RecurPreviewCommand, RecurSetCommand,
    RecurSubcommand,
};
use crate::config::Config;
use crate::parser::parse_day;
use crate::store::TaskStore;
use crate::util::{load_task, short_id};
use crate::views::table::display_occurrences;

pub async fn recur_command<S: TaskStore>(store: &S, config: &Config, command: RecurCommand) -> Result<()> {
    match command.command {
        RecurSubcommand::Info(cmd) => info_command(store, config, cmd).await,
        RecurSubcommand::Preview(cmd) => preview_command(store, config, cmd).await,
        RecurSubcommand::Set(cmd) => set_command(store, config, cmd).await,
        RecurSubcommand::Clear(cmd) => clear_command(store, cmd).await,
    }
}

fn require_rule(task: &Task) -> Result<&RecurrenceRule> {
    if task.unreadable_recurrence.is_some() {
        return Err(anyhow!(CoreError::InvalidRule(format!(
            "'{}' has a recurrence rule that cannot be read; replace it with `recur set` or remove it with `recur clear`",
            task.text
        ))));
    }
    task.recurrence.as_ref().ok_or_else(|| {
        anyhow!(CoreError::InvalidInput(format!(
            "'{}' is not a recurring task",
            task.text
        )))
    })
}

async fn info_command<S: TaskStore>(store: &S, config: &Config, command: RecurInfoCommand) -> Result<()> {
    let tz = config.tz()?;
    let today = local_date(Utc::now(), &tz);
    let task = load_task(store, &command.id).await?;
    let rule = require_rule(&task)?;

    println!("{}", format!("↻ {}", task.text).bold());
    let mut table = Table::new();
    table.set_header(vec!["Property", "Value"]);
    table.add_row(vec!["Task ID".to_string(), short_id(&task.id)]);
    table.add_row(vec!["Rule".to_string(), format_recurrence_label(rule)]);
    table.add_row(vec!["Summary".to_string(), get_recurrence_summary(rule)]);
    table.add_row(vec!["Starts".to_string(), format_date(rule.start_date())]);
    table.add_row(vec![
        "Completed dates".to_string(),
        rule.exceptions().completed().count().to_string(),
    ]);
    table.add_row(vec![
        "Skipped dates".to_string(),
        rule.exceptions().skipped().count().to_string(),
    ]);
    let next = rule
        .next_occurrence_after(today.pred_opt().unwrap_or(today))
        .map(format_date)
        .unwrap_or_else(|| "none (series ended)".to_string());
    table.add_row(vec!["Next occurrence".to_string(), next]);
    println!("{}", table);

    println!("\nUpcoming:");
    display_occurrences(&rule.preview_occurrences(today, config.preview_count), today);
    Ok(())
}

async fn preview_command<S: TaskStore>(
    store: &S,
    config: &Config,
    command: RecurPreviewCommand,
) -> Result<()> {
    let tz = config.tz()?;
    let now = Utc::now();
    let today = local_date(now, &tz);
    let from = match command.from.as_deref() {
        Some(input) => parse_day(input, now, &tz)?,
        None => today,
    };
    let task = load_task(store, &command.id).await?;
    let rule = require_rule(&task)?;

    let count = command.count.unwrap_or(config.preview_count);
    println!(
        "Next {} occurrence{} of '{}' ({})",
        count,
        if count == 1 { "" } else { "s" },
        task.text,
        format_recurrence_label(rule).cyan()
    );
    display_occurrences(&rule.preview_occurrences(from, count), today);
    Ok(())
}

async fn set_command<S: TaskStore>(store: &S, config: &Config, command: RecurSetCommand) -> Result<()> {
    let tz = config.tz()?;
    let now = Utc::now();
    let today = local_date(now, &tz);
    let mut task = load_task(store, &command.id).await?;

    let parsed = parse_recurrence_from_text_on(&command.phrase, today).ok_or_else(|| {
        anyhow!(CoreError::InvalidInput(format!(
            "No recurrence recognized in '{}'. Try phrases like 'every weekday' or 'every 2 weeks'",
            command.phrase
        )))
    })?;

    let end = match (command.until.as_deref(), command.count) {
        (Some(until), _) => {
            let until = parse_day(until, now, &tz)?;
            if until < parsed.rule.start_date() {
                return Err(anyhow!(CoreError::InvalidInput(format!(
                    "End date {} is before the rule starts ({})",
                    until,
                    parsed.rule.start_date()
                ))));
            }
            EndCondition::OnDate(until)
        }
        (None, Some(count)) => EndCondition::AfterOccurrences(NonZeroU32::new(count).ok_or_else(
            || anyhow!(CoreError::InvalidInput("--count must be at least 1".to_string())),
        )?),
        (None, None) => EndCondition::Never,
    };

    let exceptions = task
        .recurrence
        .take()
        .map(|old| old.exceptions().clone())
        .unwrap_or_default();
    task.set_recurrence(Some(parsed.rule.with_end(end).with_exceptions(exceptions)));
    let task = store.update_task(task).await?;

    if let Some(rule) = &task.recurrence {
        println!("Updated '{}': {}", task.text, get_recurrence_summary(rule));
    }
    Ok(())
}

async fn clear_command<S: TaskStore>(store: &S, command: RecurClearCommand) -> Result<()> {
    let mut task = load_task(store, &command.id).await?;
    if task.recurrence.is_none() && task.unreadable_recurrence.is_none() {
        println!("'{}' was not recurring", task.text);
        return Ok(());
    }
    task.set_recurrence(None);
    let task = store.update_task(task).await?;
    println!("'{}' no longer repeats", task.text);
    Ok(())
}
