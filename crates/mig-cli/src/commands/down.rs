//! Down command implementation

use anyhow::Result;

use crate::cli::{DownArgs, GlobalArgs};
use crate::commands::common::{down_limit, print_report, with_runner};

/// Execute the down command
pub fn execute(args: &DownArgs, global: &GlobalArgs) -> Result<()> {
    with_runner(global, |runner| {
        let limit = down_limit(runner, args.limit)?;
        let report = runner.down(limit)?;
        if report.is_empty() {
            println!("No migration has been done before.");
            return Ok(());
        }
        print_report(&report)
    })
}
