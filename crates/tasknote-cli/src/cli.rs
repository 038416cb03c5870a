use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Calendar and recurrence tooling for tasks kept as notes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Tasks file to read and write (overrides config)
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// IANA timezone used to decide what "today" is (overrides config)
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    /// Evaluate as if today were this date
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show calendar events for a date range
    Calendar(CalendarCommand),
    /// Complete an occurrence of a recurring task
    Complete(MarkCommand),
    /// Skip an occurrence of a recurring task
    Skip(MarkCommand),
    /// Show the next pending occurrence of a recurring task
    Next(NextCommand),
    /// Expand a recurrence rule over a date range
    Expand(ExpandCommand),
    /// Drop old completed/skipped entries from every recurring task
    Prune(PruneCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct CalendarCommand {
    /// First day of the range (default: a few days before today)
    #[arg(long)]
    pub from: Option<String>,
    /// Last day of the range (default: lookahead from today)
    #[arg(long)]
    pub to: Option<String>,

    #[arg(long, help = "Hide scheduled dates of one-off tasks")]
    pub no_scheduled: bool,
    #[arg(long, help = "Hide due dates of one-off tasks")]
    pub no_due: bool,
    #[arg(long, help = "Hide recurring instances")]
    pub no_recurring: bool,
    #[arg(long, help = "Hide time entries")]
    pub no_time_entries: bool,
    #[arg(long, help = "Hide completed recurring instances")]
    pub hide_completed: bool,
    #[arg(long, help = "Hide skipped recurring instances")]
    pub hide_skipped: bool,

    /// Print events as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct MarkCommand {
    /// Task ID prefix or exact title
    pub task: String,
    /// Occurrence date (default: the oldest overdue occurrence, else today)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct NextCommand {
    /// Task ID prefix or exact title
    pub task: String,
    /// Also list this many upcoming occurrences
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct ExpandCommand {
    /// Recurrence rule, e.g. "FREQ=WEEKLY;BYDAY=MO,WE"
    pub rule: String,
    /// First day of the range; also the anchor when the rule has no DTSTART
    #[arg(long)]
    pub from: String,
    /// Last day of the range
    #[arg(long)]
    pub to: String,
}

#[derive(Parser, Debug, Clone)]
pub struct PruneCommand {
    /// Keep entries from this many days back
    #[arg(long, default_value_t = 365)]
    pub keep_days: u32,
    /// Report what would be removed without writing
    #[arg(long)]
    pub dry_run: bool,
}
