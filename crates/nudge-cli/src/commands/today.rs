use anyhow::Result;
use chrono::Utc;
use nudge_core::dates::local_date;
use nudge_core::today::TodayView;
use owo_colors::OwoColorize;

use crate::cli::TodayCommand;
use crate::config::Config;
use crate::parser::parse_day;
use crate::store::TaskStore;
use crate::views::table::{display_tasks, TaskState, ViewTask};

pub async fn show_today(store: &impl TaskStore, config: &Config, command: TodayCommand) -> Result<()> {
    let tz = config.tz()?;
    let now = Utc::now();
    let day = match command.date.as_deref() {
        Some(input) => parse_day(input, now, &tz)?,
        None => local_date(now, &tz),
    };

    let tasks = store.load_tasks().await?;
    let view = TodayView::new(tz);
    let show_done = command.all || config.show_completed;

    let rows: Vec<ViewTask> = view
        .filter(&tasks, day)
        .into_iter()
        .map(|task| ViewTask::on_day(task, day, view.is_rolled_over(task, day)))
        .filter(|row| show_done || row.state != TaskState::Done)
        .collect();

    println!("{}", format!("Today, {}", day.format("%A %B %-d, %Y")).bold());
    display_tasks(&rows);

    let rolled_over = view.count_rolled_over(&tasks, day);
    if rolled_over > 0 {
        println!(
            "{}",
            format!(
                "{} task{} rolled over from earlier days",
                rolled_over,
                if rolled_over == 1 { "" } else { "s" }
            )
            .yellow()
        );
    }

    Ok(())
}
