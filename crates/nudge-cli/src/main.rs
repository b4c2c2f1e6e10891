use clap::Parser;
use nudge_core::error::CoreError;
use owo_colors::{OwoColorize, Style};
use store::JsonFileStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod store;
mod util;
mod views;

const LOG_ENV: &str = "NUDGE_LOG";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    debug!(data_file = %config.data_file.display(), timezone = %config.timezone, "loaded configuration");
    let store = JsonFileStore::new(&config.data_file);

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_task(&store, &config, command).await,
        cli::Commands::Today(command) => {
            commands::today::show_today(&store, &config, command).await
        }
        cli::Commands::List(command) => commands::list::list_tasks(&store, &config, command).await,
        cli::Commands::Done(command) => commands::done::done_task(&store, &config, command).await,
        cli::Commands::Skip(command) => {
            commands::skip::skip_occurrence(&store, &config, command).await
        }
        cli::Commands::Delete(command) => commands::delete::delete_task(&store, command).await,
        cli::Commands::Rollover(command) => {
            commands::rollover::set_rollover(&store, command).await
        }
        cli::Commands::Recur(command) => {
            commands::recur::recur_command(&store, &config, command).await
        }
        cli::Commands::Calendar(command) => {
            commands::calendar::show_calendar(&store, &config, command).await
        }
        cli::Commands::Parse(command) => commands::parse::parse_text(&config, command),
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, text) in tasks {
                    eprintln!("  {} ({})", id.yellow(), text);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidTimezone(_) => {
                eprintln!(
                    "{} {}. Use IANA names like {}",
                    "Error:".style(error_style),
                    core_error,
                    "America/New_York".yellow()
                );
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), core_error),
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
