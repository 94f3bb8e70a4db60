//! Up command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::{print_report, with_runner};

/// Execute the up command
pub fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    with_runner(global, |runner| {
        let report = runner.up(args.limit.and_then(|l| l.count()))?;
        if report.is_empty() {
            println!("No new migrations found. Your system is up-to-date.");
            return Ok(());
        }
        print_report(&report)
    })
}
