//! Referenced model shape: shareable sub-entities held by `AssetRef`.

use crate::model::cdm::{
    CausalDecisionModel, Control, Diagram, EvalAsset, InputOutputValue, RunnableModel,
};
use crate::model::meta::{Document, EntityId, Meta};
use crate::reference::{AssetCollection, AssetRef, ReferenceResult};

/// Collections that own every shareable sub-entity.
///
/// Cloning a library clones the handles, not the entities.
#[derive(Clone, Default)]
pub struct AssetLibrary {
    pub diagrams: AssetCollection<Diagram>,
    pub runnable_models: AssetCollection<RunnableModel>,
    pub eval_assets: AssetCollection<EvalAsset>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the shareable parts of `model` into the library and returns the
    /// model in referenced form.
    ///
    /// A sub-entity whose `uuid` is already held replaces the stored one, so
    /// every model referencing it sees the newest copy.
    pub fn share(&self, model: CausalDecisionModel) -> SharedModel {
        SharedModel {
            schema: model.schema,
            meta: model.meta,
            diagrams: model
                .diagrams
                .into_iter()
                .map(|diagram| self.diagrams.insert(diagram))
                .collect(),
            io_values: model.io_values,
            controls: model.controls,
            runnable_models: model
                .runnable_models
                .into_iter()
                .map(|runnable| self.runnable_models.insert(runnable))
                .collect(),
            eval_assets: model
                .eval_assets
                .into_iter()
                .map(|asset| self.eval_assets.insert(asset))
                .collect(),
            addons: model.addons,
        }
    }

    /// Builds a referenced model around existing library entries.
    ///
    /// Nothing is looked up until the model is materialized.
    pub fn compose(
        &self,
        schema: impl Into<String>,
        meta: Meta,
        diagrams: &[EntityId],
        runnable_models: &[EntityId],
        eval_assets: &[EntityId],
    ) -> SharedModel {
        SharedModel {
            schema: schema.into(),
            meta,
            diagrams: refs(&self.diagrams, diagrams),
            io_values: Vec::new(),
            controls: Vec::new(),
            runnable_models: refs(&self.runnable_models, runnable_models),
            eval_assets: refs(&self.eval_assets, eval_assets),
            addons: None,
        }
    }
}

/// A model whose diagrams, runnable models and eval assets are references
/// into an `AssetLibrary`.
#[derive(Debug, Clone)]
pub struct SharedModel {
    pub schema: String,
    pub meta: Meta,
    pub diagrams: Vec<AssetRef<Diagram>>,
    pub io_values: Vec<InputOutputValue>,
    pub controls: Vec<Control>,
    pub runnable_models: Vec<AssetRef<RunnableModel>>,
    pub eval_assets: Vec<AssetRef<EvalAsset>>,
    pub addons: Option<Document>,
}

impl SharedModel {
    pub fn uuid(&self) -> EntityId {
        self.meta.uuid
    }

    /// Resolves every reference and returns the inline document.
    ///
    /// Fails on the first reference whose target is gone.
    pub fn materialize(&self) -> ReferenceResult<CausalDecisionModel> {
        Ok(CausalDecisionModel {
            schema: self.schema.clone(),
            meta: self.meta.clone(),
            diagrams: resolve_all(&self.diagrams)?,
            io_values: self.io_values.clone(),
            controls: self.controls.clone(),
            runnable_models: resolve_all(&self.runnable_models)?,
            eval_assets: resolve_all(&self.eval_assets)?,
            addons: self.addons.clone(),
        })
    }
}

fn refs<T: crate::graph::PersistedEntity>(
    collection: &AssetCollection<T>,
    uuids: &[EntityId],
) -> Vec<AssetRef<T>> {
    uuids.iter().map(|uuid| collection.reference(*uuid)).collect()
}

fn resolve_all<T: crate::graph::PersistedEntity + Clone>(
    references: &[AssetRef<T>],
) -> ReferenceResult<Vec<T>> {
    references
        .iter()
        .map(|reference| reference.resolve().map(|entity| (*entity).clone()))
        .collect()
}
