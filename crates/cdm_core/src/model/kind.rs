//! Entity kinds and ownership relations.
//!
//! A `Relation` is one owned-collection field of a parent kind. Its storage
//! label is persisted in `record_links.relation`, its wire field is the JSON
//! key the collection appears under.

use std::fmt::{Display, Formatter};

/// Kind of a persisted entity; stored in `records.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Model,
    Diagram,
    DiagramElement,
    DiagramDisplay,
    CausalDependency,
    InputOutputValue,
    Control,
    RunnableModel,
    EvalElement,
    EvalAsset,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        Self::Model,
        Self::Diagram,
        Self::DiagramElement,
        Self::DiagramDisplay,
        Self::CausalDependency,
        Self::InputOutputValue,
        Self::Control,
        Self::RunnableModel,
        Self::EvalElement,
        Self::EvalAsset,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Diagram => "diagram",
            Self::DiagramElement => "diagram_element",
            Self::DiagramDisplay => "diagram_display",
            Self::CausalDependency => "causal_dependency",
            Self::InputOutputValue => "input_output_value",
            Self::Control => "control",
            Self::RunnableModel => "runnable_model",
            Self::EvalElement => "eval_element",
            Self::EvalAsset => "eval_asset",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership edge from a parent kind to one of its owned collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    ModelDiagrams,
    ModelInputOutputValues,
    ModelControls,
    ModelRunnableModels,
    ModelEvalAssets,
    DiagramElements,
    DiagramDependencies,
    ElementDisplays,
    RunnableModelElements,
}

impl Relation {
    pub fn label(self) -> &'static str {
        match self {
            Self::ModelDiagrams => "model.diagrams",
            Self::ModelInputOutputValues => "model.input_output_values",
            Self::ModelControls => "model.controls",
            Self::ModelRunnableModels => "model.runnable_models",
            Self::ModelEvalAssets => "model.eval_assets",
            Self::DiagramElements => "diagram.elements",
            Self::DiagramDependencies => "diagram.dependencies",
            Self::ElementDisplays => "diagram_element.displays",
            Self::RunnableModelElements => "runnable_model.elements",
        }
    }

    /// JSON key of the owned collection on the parent document.
    pub fn field(self) -> &'static str {
        match self {
            Self::ModelDiagrams => "diagrams",
            Self::ModelInputOutputValues => "inputOutputValues",
            Self::ModelControls => "controls",
            Self::ModelRunnableModels => "runnableModels",
            Self::ModelEvalAssets => "evaluatableAssets",
            Self::DiagramElements => "elements",
            Self::DiagramDependencies => "dependencies",
            Self::ElementDisplays => "displays",
            Self::RunnableModelElements => "elements",
        }
    }

    pub fn child_kind(self) -> EntityKind {
        match self {
            Self::ModelDiagrams => EntityKind::Diagram,
            Self::ModelInputOutputValues => EntityKind::InputOutputValue,
            Self::ModelControls => EntityKind::Control,
            Self::ModelRunnableModels => EntityKind::RunnableModel,
            Self::ModelEvalAssets => EntityKind::EvalAsset,
            Self::DiagramElements => EntityKind::DiagramElement,
            Self::DiagramDependencies => EntityKind::CausalDependency,
            Self::ElementDisplays => EntityKind::DiagramDisplay,
            Self::RunnableModelElements => EntityKind::EvalElement,
        }
    }
}
