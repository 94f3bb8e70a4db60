//! Runtime context for CLI commands

use anyhow::{Context, Result};
use mig_core::{Config, CoreError, MigrationDiscovery, PathResolver};
use mig_db::MigrationDb;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;
use crate::commands::common::ExitCode;

/// Loaded project: configuration plus discovery over resolved sources
pub struct ProjectContext {
    /// Project root directory
    pub root: PathBuf,

    /// The loaded configuration
    pub config: Config,

    /// Discovery engine with every extended source resolved
    pub discovery: MigrationDiscovery,

    /// Verbose output enabled
    pub verbose: bool,
}

impl ProjectContext {
    /// Load configuration and resolve migration sources.
    ///
    /// An extended migration directory that does not exist is reported on
    /// stderr and ends the process with exit code 1.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&args.project_dir);

        let config = if let Some(config_path) = &args.config {
            Config::load(Path::new(config_path)).context("Failed to load configuration file")?
        } else {
            Config::load_from_dir(&root).context("Failed to load project configuration")?
        };

        log::debug!("Loaded configuration for project {}", config.name);

        let mut discovery = MigrationDiscovery::from_config(&root, &config)
            .context("Failed to set up migration discovery")?;
        let resolver = PathResolver::from_config(&root, &config);
        match discovery.resolve_sources(&resolver) {
            Ok(()) => {}
            Err(CoreError::SourceNotFound { path }) => {
                eprintln!("Error: The migration directory does not exist: {path}");
                return Err(ExitCode(1).into());
            }
            Err(err) => return Err(err).context("Failed to resolve migration sources"),
        }

        let ctx = Self {
            root,
            config,
            discovery,
            verbose: args.verbose,
        };
        ctx.verbose(&format!(
            "Primary migration directory: {}",
            ctx.discovery.sources().primary().display()
        ));
        for entry in ctx.discovery.sources().extended() {
            if let Some(path) = entry.resolved() {
                ctx.verbose(&format!("Extended migration directory: {}", path.display()));
            }
        }
        Ok(ctx)
    }

    /// Print verbose output if enabled
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", msg);
        }
    }
}

/// Runtime context containing the loaded project and database connection
pub struct RuntimeContext {
    /// The loaded project
    pub project: ProjectContext,

    /// Database connection holding the migration history
    pub db: MigrationDb,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let project = ProjectContext::load(args)?;

        let db_path = match &args.database {
            Some(path) => path.clone(),
            None => {
                project
                    .config
                    .get_database_config(args.target.as_deref())
                    .context("Failed to resolve database configuration")?
                    .path
            }
        };
        let db_path = database_path(&project.root, &db_path);
        project.verbose(&format!("Database: {}", db_path.display()));

        let db = MigrationDb::open(&db_path, &project.config.history_table)
            .context("Failed to connect to database")?;

        Ok(Self { project, db })
    }
}

/// Resolve a configured database path against the project root.
///
/// `:memory:` and absolute paths are used as given.
fn database_path(root: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if path == ":memory:" || candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    }
}
