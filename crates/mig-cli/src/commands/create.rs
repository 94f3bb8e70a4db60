//! Create command implementation

use anyhow::{Context, Result};
use chrono::Utc;
use mig_core::create_migration;

use crate::cli::{CreateArgs, GlobalArgs};
use crate::context::ProjectContext;

/// Execute the create command
pub fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let project = ProjectContext::load(global)?;
    let primary = project.discovery.sources().primary();
    project.verbose(&format!("Creating migration in {}", primary.display()));

    let path = create_migration(primary, project.discovery.pattern(), &args.name, Utc::now())
        .context("Failed to create migration")?;
    println!("New migration created successfully: {}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
