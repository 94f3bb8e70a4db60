//! To command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, TargetArgs};
use crate::commands::common::{print_report, with_runner};

/// Execute the to command
pub fn execute(args: &TargetArgs, global: &GlobalArgs) -> Result<()> {
    with_runner(global, |runner| {
        let report = runner.to(&args.target)?;
        if report.is_empty() {
            println!("Already at '{}'. Nothing needs to be done.", args.target);
            return Ok(());
        }
        print_report(&report)
    })
}
