//! History command implementation

use anyhow::Result;
use chrono::DateTime;
use mig_core::HistoryRecord;
use serde::Serialize;

use crate::cli::{GlobalArgs, HistoryArgs, ListOutput};
use crate::commands::common::with_runner;

/// History entry for display
#[derive(Debug, Serialize)]
struct HistoryEntry {
    version: String,
    apply_time: i64,
    applied_at: String,
}

impl From<&HistoryRecord> for HistoryEntry {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            version: record.version.clone(),
            apply_time: record.apply_time,
            applied_at: format_apply_time(record.apply_time),
        }
    }
}

/// Render a Unix timestamp as a UTC date and time.
fn format_apply_time(apply_time: i64) -> String {
    DateTime::from_timestamp(apply_time, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| apply_time.to_string())
}

/// Execute the history command
pub fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    with_runner(global, |runner| {
        let records = runner.history(args.limit.count())?;
        let entries: Vec<HistoryEntry> = records.iter().map(HistoryEntry::from).collect();

        match args.output {
            ListOutput::Table => print_table(&entries),
            ListOutput::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        }
        Ok(())
    })
}

/// Print history in table format
fn print_table(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No migration has been done before.");
        return;
    }

    let version_width = entries
        .iter()
        .map(|e| e.version.len())
        .max()
        .unwrap_or(7)
        .max(7);

    println!("{:<version_width$}  APPLIED AT", "VERSION");
    println!("{:-<version_width$}  {}", "", "-".repeat(19));
    for entry in entries {
        println!("{:<version_width$}  {}", entry.version, entry.applied_at);
    }

    println!();
    println!(
        "Showing {} applied migration{}",
        entries.len(),
        if entries.len() == 1 { "" } else { "s" }
    );
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
