//! CLI logic for the `cdm` model store tool.
//!
//! # Responsibility
//! - Resolve configuration from the environment and command-line flags.
//! - Run one store operation and render its result as pretty JSON.
//! - Map store outcomes onto stable process exit codes.

mod args;

pub use args::{Args, Command};

use cdm_core::{
    open_db, parse_model, sample_model, CausalDecisionModel, ConfigError, DbError, LoggingConfig,
    ModelStore, ModelStoreError, ModelValidationError, RepoError, SqliteRecordRepository,
    StoreConfig, VersionInfo,
};
use log::{error, info};
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_NOT_FOUND: i32 = 2;
pub const EXIT_CONFLICT: i32 = 3;
pub const EXIT_VALIDATION: i32 = 4;

/// Failure of one CLI invocation.
#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Db(DbError),
    Repo(RepoError),
    Store(ModelStoreError),
    Input { path: PathBuf, source: std::io::Error },
    Output(serde_json::Error),
}

impl CliError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Store(ModelStoreError::NotFound { .. }) => EXIT_NOT_FOUND,
            Self::Store(ModelStoreError::Conflict(_)) => EXIT_CONFLICT,
            Self::Store(ModelStoreError::Validation(_)) => EXIT_VALIDATION,
            _ => EXIT_FAILURE,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Input { path, source } => {
                write!(f, "cannot read `{}`: {source}", path.display())
            }
            Self::Output(err) => write!(f, "cannot render output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Input { source, .. } => Some(source),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ModelStoreError> for CliError {
    fn from(value: ModelStoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ModelValidationError> for CliError {
    fn from(value: ModelValidationError) -> Self {
        Self::Store(ModelStoreError::Validation(value))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

/// Resolves configuration: environment first, then flags on top.
pub fn resolve_config(args: &Args) -> Result<StoreConfig, CliError> {
    let mut config = StoreConfig::from_env()?;
    apply_overrides(&mut config, args);
    Ok(config)
}

/// Applies command-line flags over an already resolved configuration.
pub fn apply_overrides(config: &mut StoreConfig, args: &Args) {
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    if args.no_check_dependencies {
        config.check_dependencies = false;
    }
    config.logging = LoggingConfig {
        level: args
            .log_level
            .clone()
            .unwrap_or_else(|| config.logging.level.clone()),
        log_dir: args.log_dir.clone().or_else(|| config.logging.log_dir.clone()),
    };
}

/// Runs one command against the configured database and returns the text to
/// print on stdout.
pub fn run(command: &Command, config: &StoreConfig) -> Result<String, CliError> {
    let started_at = Instant::now();
    let name = command.name();
    info!(
        "event=cli_command module=cli status=start command={name} db_path={}",
        config.db_path.display()
    );

    let result = execute(command, config);
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!(
            "event=cli_command module=cli status=ok command={name} duration_ms={duration_ms}"
        ),
        Err(err) => error!(
            "event=cli_command module=cli status=error command={name} duration_ms={duration_ms} exit_code={} error={err}",
            err.exit_code()
        ),
    }
    result
}

fn execute(command: &Command, config: &StoreConfig) -> Result<String, CliError> {
    let conn = open_db(&config.db_path)?;
    let store = ModelStore::with_options(
        SqliteRecordRepository::try_new(&conn)?,
        config.store_options(),
    );

    let output = match command {
        Command::List { limit } => {
            let list = store.list_summaries(*limit)?;
            json!({
                "items": list.items,
                "appliedLimit": list.applied_limit,
            })
        }
        Command::Meta { uuid } => serde_json::to_value(store.get_meta(*uuid)?)?,
        Command::Full { uuid } => serde_json::to_value(store.get_full(*uuid)?)?,
        Command::History { uuid } => Value::Array(
            store
                .history(*uuid)?
                .iter()
                .map(version_json)
                .collect::<Result<Vec<_>, serde_json::Error>>()?,
        ),
        Command::Diagram { uuid } => serde_json::to_value(store.get_diagram(*uuid)?)?,
        Command::Create { input } => {
            let model = read_model(input)?;
            serde_json::to_value(store.create(&model)?)?
        }
        Command::Update { input } => {
            let model = read_model(input)?;
            serde_json::to_value(store.update(&model)?)?
        }
        Command::Delete { uuid } => {
            store.delete(*uuid)?;
            json!({ "deleted": uuid })
        }
        Command::Seed => serde_json::to_value(store.create(&sample_model())?)?,
    };

    Ok(serde_json::to_string_pretty(&output)?)
}

fn version_json(version: &VersionInfo) -> Result<Value, serde_json::Error> {
    Ok(json!({
        "seq": version.seq,
        "recordedAt": version.recorded_at,
        "current": version.is_current,
        "meta": serde_json::to_value(&version.meta)?,
    }))
}

fn read_model(input: &Path) -> Result<CausalDecisionModel, CliError> {
    let input_error = |source| CliError::Input {
        path: input.to_path_buf(),
        source,
    };
    let text = if input == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(input_error)?;
        buffer
    } else {
        std::fs::read_to_string(input).map_err(input_error)?
    };
    Ok(parse_model(&text)?)
}
