use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use recur_core::rule::Frequency;

/// Parse, build, expand and describe iCalendar recurrence rules
#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./recur.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the structured fields of a rule
    Parse(ParseCommand),
    /// Serialize a rule from its fields
    Build(BuildCommand),
    /// List the occurrences of a rule
    Expand(ExpandCommand),
    /// Show the next occurrence after a reference time
    Next(NextCommand),
    /// Check whether a date is an occurrence (exit status 1 when it is not)
    Check(CheckCommand),
    /// Describe a rule in plain English
    Describe(DescribeCommand),
    /// Export events from a JSON file as an iCalendar document
    Ics(IcsCommand),
}

#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// The rule, e.g. "FREQ=WEEKLY;BYDAY=MO,WE"
    pub rule: String,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BuildCommand {
    /// daily, weekly, monthly or yearly
    #[arg(long)]
    pub freq: Frequency,
    #[arg(long)]
    pub interval: Option<u32>,
    #[arg(long)]
    pub count: Option<u32>,
    /// Last allowed start (e.g. '2025-12-31', 'next friday')
    #[arg(long)]
    pub until: Option<String>,
    /// Weekdays for weekly rules (MO,WE or mon,wed)
    #[arg(long)]
    pub by_day: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExpandCommand {
    pub rule: String,
    /// Start of the first occurrence
    #[arg(long)]
    pub start: String,
    /// End of the first occurrence; gives every occurrence a duration
    #[arg(long)]
    pub end: Option<String>,
    /// Cap for rules without COUNT or UNTIL (overrides max_occurrences)
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct NextCommand {
    pub rule: String,
    #[arg(long)]
    pub start: String,
    /// End of the first occurrence; the next one is shown with its end
    #[arg(long)]
    pub end: Option<String>,
    /// Reference time (defaults to now)
    #[arg(long)]
    pub after: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
    pub rule: String,
    #[arg(long)]
    pub start: String,
    /// The date to test
    #[arg(long)]
    pub on: String,
}

#[derive(Args, Debug, Clone)]
pub struct DescribeCommand {
    pub rule: String,
}

#[derive(Args, Debug, Clone)]
pub struct IcsCommand {
    /// JSON file holding one event or an array of events
    pub file: PathBuf,
}
