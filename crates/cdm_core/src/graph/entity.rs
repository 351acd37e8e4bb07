//! Per-kind persistence mapping.
//!
//! A record body is the entity serialized to JSON with `meta` and every
//! owned collection removed; `meta` lives in record columns and owned
//! collections live in `record_links`.

use crate::graph::assembler::GraphAssembler;
use crate::graph::writer::TreeWriter;
use crate::model::cdm::{
    CausalDecisionModel, CausalDependency, Control, Diagram, DiagramDisplay, DiagramElement,
    EvalAsset, EvalElement, InputOutputValue, RunnableModel,
};
use crate::model::kind::{EntityKind, Relation};
use crate::model::meta::Meta;
use crate::repo::record_repo::{RecordRepository, RecordSeq, RepoError, RepoResult, StoredRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// An entity kind that can be written as a record and assembled back.
pub trait PersistedEntity: Serialize + DeserializeOwned {
    const KIND: EntityKind;
    /// Owned collections, in declared field order.
    const OWNED: &'static [Relation] = &[];

    fn meta(&self) -> &Meta;

    /// Writes every owned collection under the freshly inserted `seq`.
    fn persist_children<R: RecordRepository>(
        &self,
        _writer: &TreeWriter<'_, R>,
        _seq: RecordSeq,
    ) -> RepoResult<()> {
        Ok(())
    }

    /// Fills every owned collection from the children linked to `seq`.
    fn attach_children<R: RecordRepository>(
        &mut self,
        _assembler: &GraphAssembler<'_, R>,
        _seq: RecordSeq,
    ) -> RepoResult<()> {
        Ok(())
    }
}

/// Encodes the record body of `entity`.
pub fn encode_body<E: PersistedEntity>(entity: &E) -> RepoResult<String> {
    let mut value = serde_json::to_value(entity)?;
    let object = value.as_object_mut().ok_or_else(|| {
        RepoError::InvalidData(format!("{} did not serialize to a JSON object", E::KIND))
    })?;
    object.remove("meta");
    for relation in E::OWNED {
        object.remove(relation.field());
    }
    Ok(serde_json::to_string(&*object)?)
}

/// Decodes a record into an entity with empty owned collections.
pub fn decode_body<E: PersistedEntity>(record: &StoredRecord) -> RepoResult<E> {
    if record.kind != E::KIND {
        return Err(RepoError::InvalidData(format!(
            "record {} is a `{}`, expected `{}`",
            record.seq,
            record.kind,
            E::KIND
        )));
    }

    let mut value: Value = serde_json::from_str(&record.body)?;
    let object = value.as_object_mut().ok_or_else(|| {
        RepoError::InvalidData(format!("body of record {} is not a JSON object", record.seq))
    })?;
    object.insert("meta".to_string(), serde_json::to_value(&record.meta)?);
    Ok(serde_json::from_value(value)?)
}

impl PersistedEntity for CausalDecisionModel {
    const KIND: EntityKind = EntityKind::Model;
    const OWNED: &'static [Relation] = &[
        Relation::ModelDiagrams,
        Relation::ModelInputOutputValues,
        Relation::ModelControls,
        Relation::ModelRunnableModels,
        Relation::ModelEvalAssets,
    ];

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn persist_children<R: RecordRepository>(
        &self,
        writer: &TreeWriter<'_, R>,
        seq: RecordSeq,
    ) -> RepoResult<()> {
        writer.write_owned(seq, Relation::ModelDiagrams, &self.diagrams)?;
        writer.write_owned(seq, Relation::ModelInputOutputValues, &self.io_values)?;
        writer.write_owned(seq, Relation::ModelControls, &self.controls)?;
        writer.write_owned(seq, Relation::ModelRunnableModels, &self.runnable_models)?;
        writer.write_owned(seq, Relation::ModelEvalAssets, &self.eval_assets)
    }

    fn attach_children<R: RecordRepository>(
        &mut self,
        assembler: &GraphAssembler<'_, R>,
        seq: RecordSeq,
    ) -> RepoResult<()> {
        self.diagrams = assembler.owned(seq, Relation::ModelDiagrams)?;
        self.io_values = assembler.owned(seq, Relation::ModelInputOutputValues)?;
        self.controls = assembler.owned(seq, Relation::ModelControls)?;
        self.runnable_models = assembler.owned(seq, Relation::ModelRunnableModels)?;
        self.eval_assets = assembler.owned(seq, Relation::ModelEvalAssets)?;
        Ok(())
    }
}

impl PersistedEntity for Diagram {
    const KIND: EntityKind = EntityKind::Diagram;
    const OWNED: &'static [Relation] = &[Relation::DiagramElements, Relation::DiagramDependencies];

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn persist_children<R: RecordRepository>(
        &self,
        writer: &TreeWriter<'_, R>,
        seq: RecordSeq,
    ) -> RepoResult<()> {
        writer.write_owned(seq, Relation::DiagramElements, &self.elements)?;
        writer.write_owned(seq, Relation::DiagramDependencies, &self.dependencies)
    }

    fn attach_children<R: RecordRepository>(
        &mut self,
        assembler: &GraphAssembler<'_, R>,
        seq: RecordSeq,
    ) -> RepoResult<()> {
        self.elements = assembler.owned(seq, Relation::DiagramElements)?;
        self.dependencies = assembler.owned(seq, Relation::DiagramDependencies)?;
        Ok(())
    }
}

impl PersistedEntity for DiagramElement {
    const KIND: EntityKind = EntityKind::DiagramElement;
    const OWNED: &'static [Relation] = &[Relation::ElementDisplays];

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn persist_children<R: RecordRepository>(
        &self,
        writer: &TreeWriter<'_, R>,
        seq: RecordSeq,
    ) -> RepoResult<()> {
        writer.write_owned(seq, Relation::ElementDisplays, &self.displays)
    }

    fn attach_children<R: RecordRepository>(
        &mut self,
        assembler: &GraphAssembler<'_, R>,
        seq: RecordSeq,
    ) -> RepoResult<()> {
        self.displays = assembler.owned(seq, Relation::ElementDisplays)?;
        Ok(())
    }
}

impl PersistedEntity for RunnableModel {
    const KIND: EntityKind = EntityKind::RunnableModel;
    const OWNED: &'static [Relation] = &[Relation::RunnableModelElements];

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn persist_children<R: RecordRepository>(
        &self,
        writer: &TreeWriter<'_, R>,
        seq: RecordSeq,
    ) -> RepoResult<()> {
        writer.write_owned(seq, Relation::RunnableModelElements, &self.elements)
    }

    fn attach_children<R: RecordRepository>(
        &mut self,
        assembler: &GraphAssembler<'_, R>,
        seq: RecordSeq,
    ) -> RepoResult<()> {
        self.elements = assembler.owned(seq, Relation::RunnableModelElements)?;
        Ok(())
    }
}

macro_rules! leaf_entity {
    ($($ty:ty => $kind:expr),+ $(,)?) => {
        $(
            impl PersistedEntity for $ty {
                const KIND: EntityKind = $kind;

                fn meta(&self) -> &Meta {
                    &self.meta
                }
            }
        )+
    };
}

leaf_entity! {
    DiagramDisplay => EntityKind::DiagramDisplay,
    CausalDependency => EntityKind::CausalDependency,
    InputOutputValue => EntityKind::InputOutputValue,
    Control => EntityKind::Control,
    EvalElement => EntityKind::EvalElement,
    EvalAsset => EntityKind::EvalAsset,
}
