//! Versioned store for Causal Decision Model documents.
//! This crate is the single source of truth for identity, versioning and
//! document assembly invariants.

pub mod config;
pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod reference;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::cdm::{
    CausalDecisionModel, CausalDependency, Control, Diagram, DiagramDisplay, DiagramElement,
    EvalAsset, EvalElement, InputOutputValue, RunnableModel,
};
pub use model::kind::EntityKind;
pub use model::meta::{Document, EntityId, Meta};
pub use model::sample::sample_model;
pub use model::validation::{parse_model, validate_model, DependencyCheck, ModelValidationError};
pub use reference::{resolve, AssetCollection, AssetLibrary, AssetRef, ReferenceError, SharedModel};
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult, SqliteRecordRepository};
pub use service::model_store::{
    ModelStore, ModelStoreError, ModelStoreOptions, ModelStoreResult, ModelSummaryList,
    VersionInfo,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
