//! Mark command implementation

use anyhow::Result;
use mig_core::Direction;

use crate::cli::{GlobalArgs, TargetArgs};
use crate::commands::common::with_runner;

/// Execute the mark command
pub fn execute(args: &TargetArgs, global: &GlobalArgs) -> Result<()> {
    with_runner(global, |runner| {
        let report = runner.mark(&args.target)?;
        if report.completed.is_empty() {
            println!("Already at '{}'. Nothing needs to be done.", args.target);
            return Ok(());
        }

        let action = match report.direction {
            Direction::Up => "marked as applied",
            Direction::Down => "marked as not applied",
        };
        for id in &report.completed {
            println!("*** {action}: {id}");
        }
        println!();
        println!(
            "The migration history is set at {}. No actual migration was performed.",
            args.target
        );
        Ok(())
    })
}
