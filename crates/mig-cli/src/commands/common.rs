//! Shared utilities for CLI commands

use anyhow::Result;
use mig_core::{Direction, MigrationDiscovery, MigrationRunner, RunReport};
use mig_db::MigrationDb;
use std::fmt;

use crate::cli::{GlobalArgs, Limit};
use crate::context::RuntimeContext;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and the database is closed properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ExitCode is control flow, not a user-facing error
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// The runner used by every database-backed command.
pub(crate) type Runner<'c> = MigrationRunner<'c, MigrationDiscovery, MigrationDb>;

/// Load the project, open the database and hand a runner to `body`.
pub(crate) fn with_runner<T, F>(global: &GlobalArgs, body: F) -> Result<T>
where
    F: FnOnce(&mut Runner<'_>) -> Result<T>,
{
    let RuntimeContext { project, db } = RuntimeContext::new(global)?;
    let mut runner = MigrationRunner::new(project.discovery, &db, &db);
    body(&mut runner)
}

/// Translate a down-style limit: one by default, every applied migration
/// for `all`.
pub(crate) fn down_limit(runner: &Runner<'_>, limit: Option<Limit>) -> Result<Option<usize>> {
    Ok(match limit {
        None => None,
        Some(Limit::Count(n)) => Some(n),
        Some(Limit::All) => Some(runner.history(None)?.len().max(1)),
    })
}

/// Print what a run did, one line per migration.
///
/// Returns `ExitCode(1)` when the run stopped on a failure.
pub(crate) fn print_report(report: &RunReport) -> Result<()> {
    let verb = match report.direction {
        Direction::Up => "applied",
        Direction::Down => "reverted",
    };
    for id in &report.completed {
        println!("*** {verb} {id}");
    }

    match &report.failure {
        None => {
            if !report.completed.is_empty() {
                println!();
                println!(
                    "{} migration{} {verb}. Migrated {} successfully.",
                    report.completed.len(),
                    if report.completed.len() == 1 { "" } else { "s" },
                    report.direction
                );
            }
            Ok(())
        }
        Some(failure) => {
            println!("*** failed {} {}", report.direction, failure.id);
            eprintln!("  {}", failure.error);
            println!();
            println!("Migration failed. All later migrations are canceled.");
            Err(ExitCode(1).into())
        }
    }
}
