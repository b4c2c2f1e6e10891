use clap::{ArgGroup, Parser, Subcommand};

/// Nudge: a small task tracker with recurring tasks and a rolling today view
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task, detecting recurrence phrases in its text
    Add(AddCommand),
    /// Show the tasks that belong on today's list
    Today(TodayCommand),
    /// List every task
    List(ListCommand),
    /// Complete a task, or one occurrence of a recurring task
    Done(DoneCommand),
    /// Skip one occurrence of a recurring task
    Skip(SkipCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Turn rollover of an unfinished task on or off
    Rollover(RolloverCommand),
    /// Inspect and edit recurrence rules
    Recur(RecurCommand),
    /// Show a month calendar of a recurring task
    Calendar(CalendarCommand),
    /// Try the recurrence phrase parser without saving anything
    Parse(ParseCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The task text, e.g. "Call mom every Sunday"
    pub text: String,
    /// Free-form notes
    #[clap(short, long)]
    pub notes: Option<String>,
    /// Hard deadline (e.g. '2025-06-01', 'tomorrow', 'friday 5pm')
    #[clap(short, long)]
    pub due: Option<String>,
    /// Schedule the task for a later day instead of today
    #[clap(long)]
    pub defer: Option<String>,
    /// Do not carry the task over to following days if left unfinished
    #[clap(long)]
    pub no_rollover: bool,
    /// Keep the text verbatim instead of extracting a recurrence phrase
    #[clap(long)]
    pub no_parse: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct TodayCommand {
    /// Show the list for another day
    #[clap(long)]
    pub date: Option<String>,
    /// Include tasks already finished today
    #[clap(short, long)]
    pub all: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Only recurring tasks
    #[clap(short, long)]
    pub recurring: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DoneCommand {
    /// The ID (or unique ID prefix) of the task
    pub id: String,
    /// Occurrence date for recurring tasks (defaults to today)
    #[clap(long)]
    pub on: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SkipCommand {
    /// The ID (or unique ID prefix) of the task
    pub id: String,
    /// Occurrence date to skip (defaults to today)
    #[clap(long)]
    pub on: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID (or unique ID prefix) of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
#[command(group(ArgGroup::new("mode").required(true).args(["off", "on"])))]
pub struct RolloverCommand {
    /// The ID (or unique ID prefix) of the task
    pub id: String,
    /// Stop carrying the task over to following days
    #[clap(long)]
    pub off: bool,
    /// Carry the task over again
    #[clap(long)]
    pub on: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurCommand {
    #[command(subcommand)]
    pub command: RecurSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecurSubcommand {
    /// Show a task's rule, end condition and exception dates
    Info(RecurInfoCommand),
    /// List upcoming occurrences
    Preview(RecurPreviewCommand),
    /// Replace a task's rule from a phrase such as "every 2 weeks"
    Set(RecurSetCommand),
    /// Make a task non-recurring
    Clear(RecurClearCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct RecurInfoCommand {
    /// The ID (or unique ID prefix) of the task
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurPreviewCommand {
    /// The ID (or unique ID prefix) of the task
    pub id: String,
    /// Number of occurrences to show
    #[clap(short, long)]
    pub count: Option<usize>,
    /// First day to consider (defaults to today)
    #[clap(long)]
    pub from: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurSetCommand {
    /// The ID (or unique ID prefix) of the task
    pub id: String,
    /// Recurrence phrase, e.g. "every weekday" or "every 3 months"
    pub phrase: String,
    /// Last day an occurrence may fall on
    #[clap(long, conflicts_with = "count")]
    pub until: Option<String>,
    /// Stop after this many occurrences
    #[clap(long)]
    pub count: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurClearCommand {
    /// The ID (or unique ID prefix) of the task
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CalendarCommand {
    /// The ID (or unique ID prefix) of the task
    pub id: String,
    /// Month to show as YYYY-MM (defaults to the current month)
    #[clap(short, long)]
    pub month: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ParseCommand {
    /// Text to scan for a recurrence phrase
    pub text: String,
}
