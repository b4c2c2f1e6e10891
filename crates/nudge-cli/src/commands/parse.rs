use anyhow::Result;
use chrono::Utc;
use nudge_core::dates::local_date;
use nudge_core::format::{format_recurrence_label, get_recurrence_summary};
use nudge_core::parser::parse_recurrence_from_text_on;
use owo_colors::OwoColorize;

use crate::cli::ParseCommand;
use crate::config::Config;

pub fn parse_text(config: &Config, command: ParseCommand) -> Result<()> {
    let tz = config.tz()?;
    let today = local_date(Utc::now(), &tz);

    match parse_recurrence_from_text_on(&command.text, today) {
        Some(parsed) => {
            println!("{} {}", "Label:".bold(), format_recurrence_label(&parsed.rule));
            println!("{} {}", "Summary:".bold(), get_recurrence_summary(&parsed.rule));
            println!("{} {}", "Text:".bold(), parsed.cleaned_text);
            println!("{}", serde_json::to_string_pretty(&parsed.rule)?);
        }
        None => {
            println!("No recurrence recognized; the text stays as entered:");
            println!("{}", command.text);
        }
    }
    Ok(())
}
