//! Write-time validation of model documents.
//!
//! # Responsibility
//! - Parse wire JSON into a typed document.
//! - Reject documents the store cannot version safely.
//!
//! # Invariants
//! - Every entity has a non-nil `uuid`.
//! - Sibling entities in one owned collection never share a `uuid`.
//! - `createdDate`/`updatedDate` are ISO-8601 when present.
//! - With `DependencyCheck::Enforce`, dependency endpoints name elements of
//!   the same diagram.

use crate::model::cdm::{CausalDecisionModel, Diagram};
use crate::model::kind::{EntityKind, Relation};
use crate::model::meta::{EntityId, Meta};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static ISO_TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$",
    )
    .expect("valid timestamp regex")
});

/// Whether dependency endpoints are checked against their diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyCheck {
    /// Reject dependencies whose `source`/`target` is not an element of the
    /// same diagram.
    #[default]
    Enforce,
    /// Accept any endpoint `uuid`.
    Skip,
}

/// Reasons a model document is rejected before any record is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Input is not a well-formed model document.
    Malformed(String),
    NilUuid(EntityKind),
    DuplicateUuid {
        relation: Relation,
        uuid: EntityId,
    },
    InvalidTimestamp {
        uuid: EntityId,
        field: &'static str,
        value: String,
    },
    DanglingDependency {
        dependency: EntityId,
        endpoint: EntityId,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed model document: {message}"),
            Self::NilUuid(kind) => write!(f, "{kind} has a nil uuid"),
            Self::DuplicateUuid { relation, uuid } => {
                write!(f, "duplicate uuid {uuid} in `{}`", relation.label())
            }
            Self::InvalidTimestamp { uuid, field, value } => {
                write!(f, "{field} `{value}` of {uuid} is not an ISO-8601 timestamp")
            }
            Self::DanglingDependency {
                dependency,
                endpoint,
            } => write!(
                f,
                "dependency {dependency} points at {endpoint}, which is not an element of its diagram"
            ),
        }
    }
}

impl Error for ModelValidationError {}

/// Parses a wire document. Does not run `validate_model`.
pub fn parse_model(text: &str) -> Result<CausalDecisionModel, ModelValidationError> {
    serde_json::from_str(text).map_err(|err| ModelValidationError::Malformed(err.to_string()))
}

/// Validates a whole model tree, first violation wins.
pub fn validate_model(
    model: &CausalDecisionModel,
    dependency_check: DependencyCheck,
) -> Result<(), ModelValidationError> {
    check_meta(EntityKind::Model, &model.meta)?;

    check_siblings(
        Relation::ModelDiagrams,
        model.diagrams.iter().map(|item| &item.meta),
    )?;
    for diagram in &model.diagrams {
        check_diagram(diagram, dependency_check)?;
    }

    check_siblings(
        Relation::ModelInputOutputValues,
        model.io_values.iter().map(|item| &item.meta),
    )?;
    for value in &model.io_values {
        check_meta(EntityKind::InputOutputValue, &value.meta)?;
    }

    check_siblings(
        Relation::ModelControls,
        model.controls.iter().map(|item| &item.meta),
    )?;
    for control in &model.controls {
        check_meta(EntityKind::Control, &control.meta)?;
    }

    check_siblings(
        Relation::ModelRunnableModels,
        model.runnable_models.iter().map(|item| &item.meta),
    )?;
    for runnable in &model.runnable_models {
        check_meta(EntityKind::RunnableModel, &runnable.meta)?;
        check_siblings(
            Relation::RunnableModelElements,
            runnable.elements.iter().map(|item| &item.meta),
        )?;
        for element in &runnable.elements {
            check_meta(EntityKind::EvalElement, &element.meta)?;
        }
    }

    check_siblings(
        Relation::ModelEvalAssets,
        model.eval_assets.iter().map(|item| &item.meta),
    )?;
    for asset in &model.eval_assets {
        check_meta(EntityKind::EvalAsset, &asset.meta)?;
    }

    Ok(())
}

fn check_diagram(
    diagram: &Diagram,
    dependency_check: DependencyCheck,
) -> Result<(), ModelValidationError> {
    check_meta(EntityKind::Diagram, &diagram.meta)?;

    check_siblings(
        Relation::DiagramElements,
        diagram.elements.iter().map(|item| &item.meta),
    )?;
    for element in &diagram.elements {
        check_meta(EntityKind::DiagramElement, &element.meta)?;
        check_siblings(
            Relation::ElementDisplays,
            element.displays.iter().map(|item| &item.meta),
        )?;
        for display in &element.displays {
            check_meta(EntityKind::DiagramDisplay, &display.meta)?;
        }
    }

    check_siblings(
        Relation::DiagramDependencies,
        diagram.dependencies.iter().map(|item| &item.meta),
    )?;
    for dependency in &diagram.dependencies {
        check_meta(EntityKind::CausalDependency, &dependency.meta)?;
        if dependency_check == DependencyCheck::Skip {
            continue;
        }
        for endpoint in [dependency.source, dependency.target] {
            if diagram.element(endpoint).is_none() {
                return Err(ModelValidationError::DanglingDependency {
                    dependency: dependency.meta.uuid,
                    endpoint,
                });
            }
        }
    }

    Ok(())
}

fn check_meta(kind: EntityKind, meta: &Meta) -> Result<(), ModelValidationError> {
    if meta.uuid.is_nil() {
        return Err(ModelValidationError::NilUuid(kind));
    }
    check_timestamp(meta.uuid, "createdDate", meta.created_date.as_deref())?;
    check_timestamp(meta.uuid, "updatedDate", meta.updated_date.as_deref())?;
    Ok(())
}

fn check_timestamp(
    uuid: EntityId,
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ModelValidationError> {
    match value {
        Some(text) if !text.is_empty() && !ISO_TIMESTAMP_RE.is_match(text) => {
            Err(ModelValidationError::InvalidTimestamp {
                uuid,
                field,
                value: text.to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn check_siblings<'a>(
    relation: Relation,
    metas: impl Iterator<Item = &'a Meta>,
) -> Result<(), ModelValidationError> {
    let mut seen = HashSet::new();
    for meta in metas {
        if !seen.insert(meta.uuid) {
            return Err(ModelValidationError::DuplicateUuid {
                relation,
                uuid: meta.uuid,
            });
        }
    }
    Ok(())
}
