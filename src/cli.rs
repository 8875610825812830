//! Command line definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Reports on open pull requests across a GitHub organization, keeping a
/// daily snapshot history for comparisons and trend graphs.
#[derive(Parser, Debug)]
#[command(name = "pr-reporter")]
#[command(about = "Open PR statistics for a GitHub organization")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Path to the YAML config file. The CONFIG_PATH environment variable
    /// takes precedence when set.
    #[arg(long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Path of the snapshot database.
    #[arg(long, global = true, default_value = "pr_stats.db")]
    pub db_path: PathBuf,

    #[command(flatten)]
    pub report: ReportArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Flags for the default open-PR report.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// List PRs with no comments after each repository's summary.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only list zero-comment PRs at least this many days old.
    #[arg(long, default_value_t = 0)]
    pub min_age: i64,

    /// Compare against the snapshot from this many days ago.
    #[arg(long, num_args = 0..=1, default_missing_value = "7")]
    pub compare: Option<i64>,

    /// Render a PNG graph of open-PR counts from the snapshot history.
    #[arg(long)]
    pub graph: bool,

    /// Restrict the report to a single repository from the config.
    #[arg(long)]
    pub repo: Option<String>,

    /// Trailing window in days for the graph.
    #[arg(long, default_value_t = 30)]
    pub days: i64,

    /// Use today's stored snapshot instead of querying GitHub.
    #[arg(long)]
    pub dbonly: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze pull requests closed within a recent window.
    Closed(ClosedArgs),

    /// List organization members and their public emails.
    Emails,
}

/// Flags for the closed-PR analysis.
#[derive(Args, Debug)]
pub struct ClosedArgs {
    /// Number of days to look back.
    #[arg(long, default_value_t = 28)]
    pub days: i64,

    /// GitHub login to break out separately in the report.
    #[arg(long)]
    pub user: Option<String>,

    /// Print one line per closed PR while analyzing.
    #[arg(long)]
    pub debug: bool,
}
