//! Redo command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, RedoArgs};
use crate::commands::common::{down_limit, print_report, with_runner};

/// Execute the redo command
pub fn execute(args: &RedoArgs, global: &GlobalArgs) -> Result<()> {
    with_runner(global, |runner| {
        let limit = down_limit(runner, args.limit)?;
        let reports = runner.redo(limit)?;
        if reports.iter().all(|r| r.is_empty()) {
            println!("No migration has been done before.");
            return Ok(());
        }
        for report in &reports {
            print_report(report)?;
        }
        Ok(())
    })
}
