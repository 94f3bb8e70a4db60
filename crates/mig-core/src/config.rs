//! Configuration types and parsing for mig.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Project configuration from mig.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Primary migration directory, relative to the project root
    #[serde(default = "default_migration_path")]
    pub migration_path: String,

    /// Additional migration directories, searched after the primary one.
    ///
    /// Accepts a single string or a list. Entries may use an `@alias`
    /// prefix from [`aliases`](Self::aliases).
    #[serde(default, deserialize_with = "one_or_many")]
    pub extended_migration_paths: Vec<String>,

    /// Named path prefixes usable as `@name/...` in extended paths
    #[serde(default)]
    pub aliases: HashMap<String, String>,

    /// File extension of migration units
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Table recording applied migrations
    #[serde(default = "default_history_table")]
    pub history_table: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Named target configurations (e.g., dev, staging, prod)
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(path)) => vec![path],
        Some(OneOrMany::Many(paths)) => paths,
    })
}

const DEFAULT_DB_PATH: &str = ":memory:";

fn default_migration_path() -> String {
    "migrations".to_string()
}

fn default_extension() -> String {
    "sql".to_string()
}

fn default_history_table() -> String {
    "migration".to_string()
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {e}", path.display()),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for mig.yml or mig.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("mig.yml");
        let yaml_path = dir.join("mig.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.migration_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migration_path cannot be empty".to_string(),
            });
        }

        if self.extension.trim_start_matches('.').is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "extension cannot be empty".to_string(),
            });
        }

        // Interpolated into DDL, so keep it to a plain identifier
        let table_ok = !self.history_table.is_empty()
            && self
                .history_table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !self.history_table.starts_with(|c: char| c.is_ascii_digit());
        if !table_ok {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "history_table '{}' must be a plain identifier ([A-Za-z_][A-Za-z0-9_]*)",
                    self.history_table
                ),
            });
        }

        for alias in self.aliases.keys() {
            if alias.is_empty() || alias.contains(['/', '\\', '@']) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Invalid alias name '{alias}'"),
                });
            }
        }

        Ok(())
    }

    /// Get the absolute primary migration path relative to a project root
    pub fn migration_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migration_path)
    }

    /// Get database configuration, optionally applying target overrides
    pub fn get_database_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;

                Ok(target_config
                    .database
                    .clone()
                    .unwrap_or_else(|| self.database.clone()))
            }
            None => Ok(self.database.clone()),
        }
    }

    /// Get the list of available target names, sorted
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
