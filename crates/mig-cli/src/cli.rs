//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt;
use std::str::FromStr;

/// mig - schema migrations discovered across multiple directories
#[derive(Parser, Debug)]
#[command(name = "mig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path
    #[arg(short, long, global = true, env = "MIG_DATABASE")]
    pub database: Option<String>,

    /// Use the database of a named target from the config
    #[arg(short, long, global = true, env = "MIG_TARGET")]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Up(UpArgs),

    /// Revert applied migrations
    Down(DownArgs),

    /// Revert and re-apply the most recent migrations
    Redo(RedoArgs),

    /// Migrate up or down to a specific version
    To(TargetArgs),

    /// Set the migration history to a version without running migrations
    Mark(TargetArgs),

    /// Show applied migrations
    History(HistoryArgs),

    /// Show pending migrations
    New(NewArgs),

    /// Create a new migration file
    Create(CreateArgs),
}

/// Number of migrations to act on: a positive count or `all`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    All,
    Count(usize),
}

impl Limit {
    /// The count, or `None` for all.
    pub fn count(self) -> Option<usize> {
        match self {
            Limit::All => None,
            Limit::Count(n) => Some(n),
        }
    }
}

impl FromStr for Limit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Limit::All);
        }
        s.parse::<usize>()
            .map(Limit::Count)
            .map_err(|_| format!("expected a number or 'all', got '{s}'"))
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::All => write!(f, "all"),
            Limit::Count(n) => write!(f, "{n}"),
        }
    }
}

/// Arguments for the up command
#[derive(Args, Debug)]
pub struct UpArgs {
    /// Number of pending migrations to apply (default: all)
    pub limit: Option<Limit>,
}

/// Arguments for the down command
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Number of migrations to revert, or `all` (default: 1)
    pub limit: Option<Limit>,
}

/// Arguments for the redo command
#[derive(Args, Debug)]
pub struct RedoArgs {
    /// Number of migrations to redo, or `all` (default: 1)
    pub limit: Option<Limit>,
}

/// Arguments for the to and mark commands
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Migration name or version (e.g. m240101_000000_init or 240101_000000)
    pub target: String,
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Number of records to show, or `all`
    #[arg(default_value = "10")]
    pub limit: Limit,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: ListOutput,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Number of pending migrations to show, or `all`
    #[arg(default_value = "10")]
    pub limit: Limit,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: ListOutput,
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Migration description (letters, digits and underscores)
    pub name: String,
}

/// Output formats for listing commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
