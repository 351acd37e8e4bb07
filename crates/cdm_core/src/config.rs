//! Store configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve the database file, summary cap, dependency check and logging
//!   settings with documented defaults.
//!
//! # Invariants
//! - Blank values count as unset.
//! - `CDM_DB_PATH` wins over `CDM_DB_DIR` + `CDM_DB_NAME`.
//! - The summary cap is always within `1..=SUMMARY_LIMIT_MAX`.

use crate::logging::{default_log_level, LoggingConfig};
use crate::model::validation::DependencyCheck;
use crate::service::model_store::{normalize_summary_limit, ModelStoreOptions};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CDM_DB_PATH";
pub const ENV_DB_DIR: &str = "CDM_DB_DIR";
pub const ENV_DB_NAME: &str = "CDM_DB_NAME";
pub const ENV_SUMMARY_LIMIT: &str = "CDM_SUMMARY_LIMIT";
pub const ENV_CHECK_DEPENDENCIES: &str = "CDM_CHECK_DEPENDENCIES";
pub const ENV_LOG_LEVEL: &str = "CDM_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CDM_LOG_DIR";

pub const DEFAULT_DB_DIR: &str = "db-data";
pub const DEFAULT_DB_NAME: &str = "modelsdb";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    InvalidBool { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got `{value}`")
            }
            Self::InvalidBool { key, value } => {
                write!(f, "{key} must be true or false, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved configuration for one store process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub summary_limit: u32,
    pub check_dependencies: bool,
    pub logging: LoggingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_DIR).join(format!("{DEFAULT_DB_NAME}.db")),
            summary_limit: normalize_summary_limit(None),
            check_dependencies: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, one call per key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let db_path = match value(ENV_DB_PATH) {
            Some(path) => PathBuf::from(path),
            None => {
                let dir = value(ENV_DB_DIR).unwrap_or_else(|| DEFAULT_DB_DIR.to_string());
                let name = value(ENV_DB_NAME).unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
                PathBuf::from(dir).join(format!("{name}.db"))
            }
        };

        let summary_limit = match value(ENV_SUMMARY_LIMIT) {
            Some(raw) => {
                let parsed = raw.parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
                    key: ENV_SUMMARY_LIMIT,
                    value: raw.clone(),
                })?;
                normalize_summary_limit(Some(parsed))
            }
            None => normalize_summary_limit(None),
        };

        let check_dependencies = match value(ENV_CHECK_DEPENDENCIES) {
            Some(raw) => parse_bool(ENV_CHECK_DEPENDENCIES, &raw)?,
            None => true,
        };

        Ok(Self {
            db_path,
            summary_limit,
            check_dependencies,
            logging: LoggingConfig {
                level: value(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
                log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
            },
        })
    }

    /// Options for `ModelStore::with_options`.
    pub fn store_options(&self) -> ModelStoreOptions {
        ModelStoreOptions {
            summary_limit: self.summary_limit,
            dependency_check: if self.check_dependencies {
                DependencyCheck::Enforce
            } else {
                DependencyCheck::Skip
            },
        }
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, ENV_CHECK_DEPENDENCIES, ENV_SUMMARY_LIMIT};
    use crate::model::validation::DependencyCheck;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn resolve(pairs: &[(&str, &str)]) -> Result<StoreConfig, ConfigError> {
        let env = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        StoreConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = resolve(&[]).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.db_path, PathBuf::from("db-data").join("modelsdb.db"));
        assert_eq!(config.summary_limit, 10);
        assert_eq!(config.store_options().dependency_check, DependencyCheck::Enforce);
    }

    #[test]
    fn db_path_overrides_dir_and_name() {
        let config = resolve(&[
            ("CDM_DB_DIR", "/var/cdm"),
            ("CDM_DB_NAME", "models"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/cdm/models.db"));

        let config = resolve(&[
            ("CDM_DB_PATH", "/tmp/explicit.db"),
            ("CDM_DB_DIR", "/var/cdm"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/explicit.db"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = resolve(&[("CDM_DB_PATH", "   "), ("CDM_LOG_DIR", "")]).unwrap();
        assert_eq!(config.db_path, StoreConfig::default().db_path);
        assert_eq!(config.logging.log_dir, None);
    }

    #[test]
    fn summary_limit_is_clamped() {
        assert_eq!(resolve(&[(ENV_SUMMARY_LIMIT, "500")]).unwrap().summary_limit, 50);
        assert_eq!(resolve(&[(ENV_SUMMARY_LIMIT, "0")]).unwrap().summary_limit, 10);
        assert_eq!(resolve(&[(ENV_SUMMARY_LIMIT, "7")]).unwrap().summary_limit, 7);
        assert!(matches!(
            resolve(&[(ENV_SUMMARY_LIMIT, "ten")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn dependency_check_can_be_disabled() {
        let config = resolve(&[(ENV_CHECK_DEPENDENCIES, "FALSE")]).unwrap();
        assert!(!config.check_dependencies);
        assert_eq!(config.store_options().dependency_check, DependencyCheck::Skip);
        assert!(matches!(
            resolve(&[(ENV_CHECK_DEPENDENCIES, "maybe")]),
            Err(ConfigError::InvalidBool { .. })
        ));
    }
}
