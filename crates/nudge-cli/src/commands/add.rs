use anyhow::Result;
use chrono::Utc;
use nudge_core::dates::{format_date, local_date};
use nudge_core::format::get_recurrence_summary;
use nudge_core::models::NewTaskData;
use nudge_core::parser::parse_recurrence_from_text_on;
use owo_colors::{OwoColorize, Style};
use tracing::debug;

use crate::cli::AddCommand;
use crate::config::Config;
use crate::parser::{parse_day, parse_due_date};
use crate::store::TaskStore;

pub async fn add_task(store: &impl TaskStore, config: &Config, command: AddCommand) -> Result<()> {
    let tz = config.tz()?;
    let now = Utc::now();
    let today = local_date(now, &tz);

    let due_date = command
        .due
        .as_deref()
        .map(|d| parse_due_date(d, now, &tz))
        .transpose()?;
    let deferred_to = command
        .defer
        .as_deref()
        .map(|d| parse_day(d, now, &tz).map(format_date))
        .transpose()?;

    let parsed = if command.no_parse {
        None
    } else {
        parse_recurrence_from_text_on(&command.text, today)
    };
    let (text, recurrence) = match parsed {
        Some(parsed) => (parsed.cleaned_text, Some(parsed.rule)),
        None => {
            debug!(text = %command.text, no_parse = command.no_parse, "adding task without recurrence");
            (command.text, None)
        }
    };

    let added_task = store
        .add_task(NewTaskData {
            text,
            notes: command.notes,
            due_date,
            deferred_to,
            skip_rollover: command.no_rollover,
            recurrence,
        })
        .await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    let kind = if added_task.is_recurring() {
        "recurring task"
    } else {
        "task"
    };
    println!(
        "{} Created {}: {}",
        "✓".style(success_style),
        kind,
        added_task.text.bright_white().bold()
    );
    println!("  {} Task ID: {}", "→".style(info_style), added_task.id);

    if let Some(rule) = &added_task.recurrence {
        println!("  {} {}", "→".style(info_style), get_recurrence_summary(rule));
    }
    if let Some(due) = added_task.due_date {
        println!(
            "  {} Due: {}",
            "→".style(info_style),
            due.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string().cyan()
        );
    }
    if let Some(deferred) = &added_task.deferred_to {
        println!("  {} Scheduled for {}", "→".style(info_style), deferred.cyan());
    }
    if added_task.skip_rollover {
        println!("  {} Will not roll over to later days", "→".style(info_style));
    }

    Ok(())
}
