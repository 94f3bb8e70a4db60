//! Error types for mig-core

use thiserror::Error;

/// Core error type for mig
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Extended migration directory could not be resolved
    #[error("[E004] The migration directory does not exist: {path}")]
    SourceNotFound { path: String },

    /// E005: No source holds the requested migration file
    #[error("[E005] Migration not found: {name}")]
    MigrationNotFound { name: String },

    /// E006: Migration file exists but yields no usable unit
    #[error("[E006] Failed to load migration '{name}' from {path}: {reason}")]
    MigrationLoad {
        name: String,
        path: String,
        reason: String,
    },

    /// E007: Name does not follow the m<yymmdd>_<hhmmss>_<description> convention
    #[error("[E007] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// E008: Step count must be positive
    #[error("[E008] Invalid step count: {limit}. The step argument must be greater than 0")]
    InvalidLimit { limit: usize },

    /// E009: Migration unit failed while running
    #[error("[E009] Migration '{name}' failed during {direction}: {message}")]
    Execution {
        name: String,
        direction: String,
        message: String,
    },

    /// E010: Down requested on a unit without a down section
    #[error("[E010] Migration '{name}' does not support migration down")]
    Irreversible { name: String },

    /// E011: History store failure
    #[error("[E011] Migration history error: {0}")]
    History(String),

    /// E012: IO error
    #[error("[E012] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E013: IO error with file path context
    #[error("[E013] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E014: YAML parse error
    #[error("[E014] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

impl CoreError {
    /// Whether this error stems from an unusable source configuration.
    ///
    /// The CLI treats these as fatal before any discovery happens.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CoreError::SourceNotFound { .. }
                | CoreError::ConfigNotFound { .. }
                | CoreError::ConfigParseError { .. }
                | CoreError::ConfigInvalid { .. }
        )
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
