//! Model store facade.
//!
//! # Responsibility
//! - Provide create/read/update/delete for whole models on top of the
//!   record repository.
//! - Translate absence and identity clashes into typed outcomes.
//!
//! # Invariants
//! - `create` requires the model `uuid` to be absent; `update` requires it
//!   to be present. Both insert a complete new record set.
//! - `update` replaces the whole tree: anything missing from the payload is
//!   missing from the new version. There is no field-level merge.
//! - Each write runs in one immediate transaction, so readers never see a
//!   partially inserted tree.
//! - `delete` removes every model version and nothing the model owned.

use crate::graph::{GraphAssembler, PersistedEntity, TreeWriter};
use crate::model::cdm::{CausalDecisionModel, Diagram};
use crate::model::kind::EntityKind;
use crate::model::meta::{EntityId, Meta};
use crate::model::validation::{validate_model, DependencyCheck, ModelValidationError};
use crate::repo::record_repo::{RecordRepository, RecordSeq, RepoError, StoredRecord};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub const SUMMARY_DEFAULT_LIMIT: u32 = 10;
pub const SUMMARY_LIMIT_MAX: u32 = 50;

/// Service error for model store operations.
#[derive(Debug)]
pub enum ModelStoreError {
    /// No current version exists for the `uuid` (and kind) asked for.
    NotFound {
        kind: EntityKind,
        uuid: EntityId,
    },
    /// `create` was called for a model `uuid` that already exists.
    Conflict(EntityId),
    Validation(ModelValidationError),
    /// A post-condition failed after a write.
    Consistency(&'static str),
    Repo(RepoError),
}

impl ModelStoreError {
    fn model_not_found(uuid: EntityId) -> Self {
        Self::NotFound {
            kind: EntityKind::Model,
            uuid,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation_failed",
            Self::Consistency(_) => "consistency_failed",
            Self::Repo(_) => "repo_failed",
        }
    }
}

impl Display for ModelStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, uuid } => write!(f, "{kind} not found: {uuid}"),
            Self::Conflict(uuid) => write!(f, "model already exists: {uuid}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Consistency(details) => write!(f, "inconsistent model state: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ModelStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ModelStoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ModelValidationError> for ModelStoreError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ModelStoreResult<T> = Result<T, ModelStoreError>;

/// Tunables for the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelStoreOptions {
    /// Cap used when a summary request does not name its own limit.
    pub summary_limit: u32,
    pub dependency_check: DependencyCheck,
}

impl Default for ModelStoreOptions {
    fn default() -> Self {
        Self {
            summary_limit: SUMMARY_DEFAULT_LIMIT,
            dependency_check: DependencyCheck::Enforce,
        }
    }
}

/// Summary list envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummaryList {
    /// Current `Meta` of distinct models, newest version first.
    pub items: Vec<Meta>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// One retained physical version of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionInfo {
    pub seq: RecordSeq,
    /// Epoch milliseconds at insert time.
    pub recorded_at: i64,
    pub meta: Meta,
    pub is_current: bool,
}

/// Model store facade over a record repository.
pub struct ModelStore<R: RecordRepository> {
    repo: R,
    options: ModelStoreOptions,
}

impl<R: RecordRepository> ModelStore<R> {
    /// Creates a store with default options.
    pub fn new(repo: R) -> Self {
        Self::with_options(repo, ModelStoreOptions::default())
    }

    pub fn with_options(repo: R, options: ModelStoreOptions) -> Self {
        Self { repo, options }
    }

    /// Inserts a model that does not exist yet and returns the stored tree.
    pub fn create(&self, model: &CausalDecisionModel) -> ModelStoreResult<CausalDecisionModel> {
        let started_at = Instant::now();
        let uuid = model.uuid();
        let result = self.write_version(model, false);
        log_outcome("model_create", uuid, started_at, &result);
        result
    }

    /// Inserts a new version of an existing model and returns the new tree.
    pub fn update(&self, model: &CausalDecisionModel) -> ModelStoreResult<CausalDecisionModel> {
        let started_at = Instant::now();
        let uuid = model.uuid();
        let result = self.write_version(model, true);
        log_outcome("model_update", uuid, started_at, &result);
        result
    }

    /// Removes every version of a model. Owned entities stay in storage.
    pub fn delete(&self, uuid: EntityId) -> ModelStoreResult<()> {
        let started_at = Instant::now();
        let result: ModelStoreResult<()> = self.repo.in_transaction(|repo| {
            if !repo.exists(EntityKind::Model, uuid)? {
                return Err(ModelStoreError::model_not_found(uuid));
            }
            repo.delete_versions(EntityKind::Model, uuid)?;
            if repo.exists(EntityKind::Model, uuid)? {
                return Err(ModelStoreError::Consistency(
                    "model still present after delete",
                ));
            }
            Ok(())
        });
        log_outcome("model_delete", uuid, started_at, &result);
        result
    }

    /// Returns whether any version of the model exists.
    pub fn exists(&self, uuid: EntityId) -> ModelStoreResult<bool> {
        Ok(self.repo.exists(EntityKind::Model, uuid)?)
    }

    /// Lists current `Meta` of up to `limit` distinct models.
    ///
    /// `None` or `0` falls back to the configured cap; values above
    /// `SUMMARY_LIMIT_MAX` are clamped.
    pub fn list_summaries(&self, limit: Option<u32>) -> ModelStoreResult<ModelSummaryList> {
        let requested = limit
            .filter(|value| *value != 0)
            .unwrap_or(self.options.summary_limit);
        let applied_limit = normalize_summary_limit(Some(requested));
        let items = self
            .repo
            .list_current_by_kind(EntityKind::Model, applied_limit)?
            .into_iter()
            .map(|record| record.meta)
            .collect::<Vec<_>>();
        info!(
            "event=model_list module=service status=ok applied_limit={applied_limit} count={}",
            items.len()
        );
        Ok(ModelSummaryList {
            items,
            applied_limit,
        })
    }

    /// Returns the current `Meta` of one model.
    pub fn get_meta(&self, uuid: EntityId) -> ModelStoreResult<Meta> {
        self.repo
            .current_version(EntityKind::Model, uuid)?
            .map(|record| record.meta)
            .ok_or_else(|| ModelStoreError::model_not_found(uuid))
    }

    /// Assembles the full current tree of one model.
    pub fn get_full(&self, uuid: EntityId) -> ModelStoreResult<CausalDecisionModel> {
        let started_at = Instant::now();
        let result = self.get_entity::<CausalDecisionModel>(uuid);
        log_outcome("model_get_full", uuid, started_at, &result);
        result
    }

    /// Assembles the current version of any persisted entity kind by `uuid`,
    /// including entities orphaned by a model delete or update.
    pub fn get_entity<E: PersistedEntity>(&self, uuid: EntityId) -> ModelStoreResult<E> {
        GraphAssembler::new(&self.repo)
            .current::<E>(uuid)?
            .ok_or(ModelStoreError::NotFound { kind: E::KIND, uuid })
    }

    /// Assembles the current version of one diagram.
    pub fn get_diagram(&self, uuid: EntityId) -> ModelStoreResult<Diagram> {
        self.get_entity::<Diagram>(uuid)
    }

    /// Lists every retained version of one model, oldest first.
    pub fn history(&self, uuid: EntityId) -> ModelStoreResult<Vec<VersionInfo>> {
        let versions = self.repo.list_versions(EntityKind::Model, uuid)?;
        let current_seq = versions
            .last()
            .map(|record| record.seq)
            .ok_or_else(|| ModelStoreError::model_not_found(uuid))?;
        Ok(versions
            .into_iter()
            .map(|record| version_info(record, current_seq))
            .collect())
    }

    fn write_version(
        &self,
        model: &CausalDecisionModel,
        must_exist: bool,
    ) -> ModelStoreResult<CausalDecisionModel> {
        validate_model(model, self.options.dependency_check)?;
        let uuid = model.uuid();

        self.repo.in_transaction(|repo| {
            let exists = repo.exists(EntityKind::Model, uuid)?;
            match (must_exist, exists) {
                (false, true) => return Err(ModelStoreError::Conflict(uuid)),
                (true, false) => return Err(ModelStoreError::model_not_found(uuid)),
                _ => {}
            }

            let seq = TreeWriter::new(repo).write(model)?;
            let current = repo.current_version(EntityKind::Model, uuid)?.ok_or(
                ModelStoreError::Consistency("written model not found in read-back"),
            )?;
            if current.seq != seq {
                return Err(ModelStoreError::Consistency(
                    "written model is not the current version",
                ));
            }
            Ok(GraphAssembler::new(repo).assemble::<CausalDecisionModel>(&current)?)
        })
    }
}

/// Normalizes a summary limit according to the list contract.
pub fn normalize_summary_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => SUMMARY_DEFAULT_LIMIT,
        Some(value) if value > SUMMARY_LIMIT_MAX => SUMMARY_LIMIT_MAX,
        Some(value) => value,
    }
}

fn version_info(record: StoredRecord, current_seq: RecordSeq) -> VersionInfo {
    VersionInfo {
        seq: record.seq,
        recorded_at: record.recorded_at,
        meta: record.meta,
        is_current: record.seq == current_seq,
    }
}

fn log_outcome<T>(
    event: &str,
    uuid: EntityId,
    started_at: Instant,
    result: &ModelStoreResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event={event} module=service status=ok uuid={uuid} duration_ms={duration_ms}"
        ),
        Err(
            err @ (ModelStoreError::NotFound { .. }
            | ModelStoreError::Conflict(_)
            | ModelStoreError::Validation(_)),
        ) => warn!(
            "event={event} module=service status=rejected uuid={uuid} duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
        Err(err) => error!(
            "event={event} module=service status=error uuid={uuid} duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_summary_limit, SUMMARY_DEFAULT_LIMIT, SUMMARY_LIMIT_MAX};

    #[test]
    fn summary_limit_defaults_and_clamps() {
        assert_eq!(normalize_summary_limit(None), SUMMARY_DEFAULT_LIMIT);
        assert_eq!(normalize_summary_limit(Some(0)), SUMMARY_DEFAULT_LIMIT);
        assert_eq!(normalize_summary_limit(Some(3)), 3);
        assert_eq!(normalize_summary_limit(Some(500)), SUMMARY_LIMIT_MAX);
    }
}
