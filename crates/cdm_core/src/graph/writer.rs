//! Write side: one new physical record per entity in a document tree.

use crate::graph::entity::{encode_body, PersistedEntity};
use crate::model::kind::Relation;
use crate::repo::record_repo::{RecordRepository, RecordSeq, RepoError, RepoResult};

/// Inserts whole document trees through a record repository.
///
/// The writer does not open a transaction; callers that need all-or-nothing
/// semantics wrap it in `RecordRepository::in_transaction`.
pub struct TreeWriter<'r, R: RecordRepository> {
    repo: &'r R,
}

impl<'r, R: RecordRepository> TreeWriter<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Inserts `entity` and its owned subtree, returning the root `seq`.
    pub fn write<E: PersistedEntity>(&self, entity: &E) -> RepoResult<RecordSeq> {
        let body = encode_body(entity)?;
        let seq = self.repo.insert_record(E::KIND, entity.meta(), &body)?;
        entity.persist_children(self, seq)?;
        Ok(seq)
    }

    /// Inserts `children` in order and links each under `parent`.
    pub fn write_owned<E: PersistedEntity>(
        &self,
        parent: RecordSeq,
        relation: Relation,
        children: &[E],
    ) -> RepoResult<()> {
        if relation.child_kind() != E::KIND {
            return Err(RepoError::InvalidData(format!(
                "cannot link `{}` as `{}`",
                E::KIND,
                relation.label()
            )));
        }

        for (position, child) in children.iter().enumerate() {
            let child_seq = self.write(child)?;
            self.repo.link_child(parent, relation, position, child_seq)?;
        }
        Ok(())
    }
}
