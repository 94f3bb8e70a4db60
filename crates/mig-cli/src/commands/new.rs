//! New command implementation (list pending migrations)

use anyhow::Result;
use mig_core::{CoreError, MigrationId};
use serde::Serialize;

use crate::cli::{GlobalArgs, ListOutput, NewArgs};
use crate::commands::common::with_runner;

/// Pending migration for display
#[derive(Debug, Serialize)]
struct PendingEntry {
    name: String,
    version: String,
}

impl From<&MigrationId> for PendingEntry {
    fn from(id: &MigrationId) -> Self {
        Self {
            name: id.to_string(),
            version: id.version().to_string(),
        }
    }
}

/// Execute the new command
pub fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let limit = args.limit.count();
    if limit == Some(0) {
        return Err(CoreError::InvalidLimit { limit: 0 }.into());
    }

    with_runner(global, |runner| {
        let pending = runner.pending()?;
        let total = pending.len();
        let shown: Vec<PendingEntry> = pending
            .iter()
            .take(limit.unwrap_or(total))
            .map(PendingEntry::from)
            .collect();

        match args.output {
            ListOutput::Table => print_table(&shown, total),
            ListOutput::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
        }
        Ok(())
    })
}

/// Print pending migrations in table format
fn print_table(entries: &[PendingEntry], total: usize) {
    if entries.is_empty() {
        println!("No new migrations found. Your system is up-to-date.");
        return;
    }

    if entries.len() == total {
        println!(
            "Found {} new migration{}:",
            total,
            if total == 1 { "" } else { "s" }
        );
    } else {
        println!(
            "Showing {} out of {} new migrations:",
            entries.len(),
            total
        );
    }
    for entry in entries {
        println!("    {}", entry.name);
    }
}
