//! Read side: rebuild nested document trees from current records.

use crate::graph::entity::{decode_body, PersistedEntity};
use crate::model::kind::Relation;
use crate::model::meta::EntityId;
use crate::repo::record_repo::{RecordRepository, RecordSeq, RepoResult, StoredRecord};

/// Materializes document trees depth-first, in declared field order.
pub struct GraphAssembler<'r, R: RecordRepository> {
    repo: &'r R,
}

impl<'r, R: RecordRepository> GraphAssembler<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Assembles the current version of `uuid` as an `E`.
    ///
    /// Returns `Ok(None)` when no record of `E::KIND` exists for `uuid`.
    pub fn current<E: PersistedEntity>(&self, uuid: EntityId) -> RepoResult<Option<E>> {
        match self.repo.current_version(E::KIND, uuid)? {
            Some(record) => self.assemble(&record).map(Some),
            None => Ok(None),
        }
    }

    /// Assembles one specific physical record and everything it owns.
    pub fn assemble<E: PersistedEntity>(&self, record: &StoredRecord) -> RepoResult<E> {
        let mut entity: E = decode_body(record)?;
        entity.attach_children(self, record.seq)?;
        Ok(entity)
    }

    /// Assembles the children linked under `parent` for `relation`.
    pub fn owned<E: PersistedEntity>(
        &self,
        parent: RecordSeq,
        relation: Relation,
    ) -> RepoResult<Vec<E>> {
        self.repo
            .owned_children(parent, relation)?
            .iter()
            .map(|record| self.assemble(record))
            .collect()
    }
}
