//! Command-line argument definitions for the `cdm` tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Versioned store for causal decision models
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// SQLite database file (overrides CDM_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files; logs go to stderr otherwise
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Accept dependencies whose endpoints are not elements of their diagram
    #[arg(long, global = true)]
    pub no_check_dependencies: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List current meta of stored models, newest first
    List {
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Print the current meta of one model
    Meta { uuid: Uuid },
    /// Print the fully assembled current version of one model
    Full { uuid: Uuid },
    /// Print every retained version of one model
    History { uuid: Uuid },
    /// Print the current version of one diagram
    Diagram { uuid: Uuid },
    /// Store a new model read from a JSON file, or `-` for stdin
    Create { input: PathBuf },
    /// Store a new version of an existing model
    Update { input: PathBuf },
    /// Remove every version of one model
    Delete { uuid: Uuid },
    /// Store a freshly generated sample model
    Seed,
}

impl Command {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Meta { .. } => "meta",
            Self::Full { .. } => "full",
            Self::History { .. } => "history",
            Self::Diagram { .. } => "diagram",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Seed => "seed",
        }
    }
}
