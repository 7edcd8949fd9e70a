//! Command-line argument definitions.
//!
//! The flags are combinable; `app::run` executes whichever are present
//! in a fixed order (join, drop, list, start, message, end, report).

use std::path::PathBuf;

use clap::Parser;

/// Personal work-time ledger.
///
/// Records jobs as start/end intervals in a plain text file, one line
/// per job, and reports the hours in calendar form.
#[derive(Debug, Parser)]
#[command(name = "stint", version, about, long_about = None)]
pub struct Cli {
    /// Start a job, now or at the given time expression
    /// (e.g. `14:10`, `4:`, `1:30-`, `fri,8:00`).
    #[arg(
        short,
        long,
        value_name = "TIME",
        num_args = 0..=1,
        default_missing_value = "now"
    )]
    pub start: Option<String>,

    /// End the open job, now or at the given time expression.
    #[arg(
        short,
        long,
        value_name = "TIME",
        num_args = 0..=1,
        default_missing_value = "now"
    )]
    pub end: Option<String>,

    /// Append a line to the open job's message.
    #[arg(short, long, value_name = "TEXT")]
    pub message: Option<String>,

    /// List jobs: no value for all, a number for the last N, or a time
    /// expression for jobs started since then.
    #[arg(
        short,
        long,
        value_name = "FILTER",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    pub list: Option<String>,

    /// Join the jobs at these positions into one.
    #[arg(
        short,
        long,
        value_name = "POS",
        num_args = 1..,
        value_delimiter = ','
    )]
    pub join: Option<Vec<usize>>,

    /// Drop the job at this position.
    #[arg(short, long, value_name = "POS")]
    pub drop: Option<usize>,

    /// Print the calendar report.
    #[arg(short, long)]
    pub report: bool,

    /// Print listings and reports as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Answer yes to all confirmation prompts.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Whether any ledger operation was requested at all.
    pub const fn has_operation(&self) -> bool {
        self.start.is_some()
            || self.end.is_some()
            || self.message.is_some()
            || self.list.is_some()
            || self.join.is_some()
            || self.drop.is_some()
            || self.report
    }
}
