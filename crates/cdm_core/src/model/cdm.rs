//! Inline document shape of a Causal Decision Model.
//!
//! # Responsibility
//! - Mirror the JSON wire document: owned collections are arrays keyed by
//!   position, never maps keyed by `uuid`.
//! - Keep every owned collection `#[serde(default)]` so a document missing a
//!   collection reads as an empty one. An explicit `null` list reads the
//!   same way.
//! - An empty-string or `null` `evaluatableAsset` reads as no asset.
//!
//! # Invariants
//! - Cross-entity links inside a document (`source`, `target`, `inputs`,
//!   `evaluatableAsset`, ...) are plain `uuid`s, not ownership.

use crate::model::meta::{Document, EntityId, Meta};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Root document: one causal decision model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CausalDecisionModel {
    #[serde(rename = "$schema", default)]
    pub schema: String,
    pub meta: Meta,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub diagrams: Vec<Diagram>,
    #[serde(
        rename = "inputOutputValues",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub io_values: Vec<InputOutputValue>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Control>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub runnable_models: Vec<RunnableModel>,
    #[serde(
        rename = "evaluatableAssets",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub eval_assets: Vec<EvalAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addons: Option<Document>,
}

impl CausalDecisionModel {
    /// Creates an empty model with the given schema tag.
    pub fn new(meta: Meta, schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            meta,
            diagrams: Vec::new(),
            io_values: Vec::new(),
            controls: Vec::new(),
            runnable_models: Vec::new(),
            eval_assets: Vec::new(),
            addons: None,
        }
    }

    pub fn uuid(&self) -> EntityId {
        self.meta.uuid
    }
}

/// One causal diagram: nodes plus directed dependencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub meta: Meta,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<DiagramElement>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<CausalDependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addons: Option<Document>,
}

impl Diagram {
    pub fn new(meta: Meta) -> Self {
        Self {
            meta,
            elements: Vec::new(),
            dependencies: Vec::new(),
            addons: None,
        }
    }

    /// Returns the element with `uuid`, if this diagram declares one.
    pub fn element(&self, uuid: EntityId) -> Option<&DiagramElement> {
        self.elements.iter().find(|element| element.meta.uuid == uuid)
    }
}

/// A node of the causal graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramElement {
    pub meta: Meta,
    /// Causal role such as `Lever`, `Outcome`, `External` or `Intermediate`.
    #[serde(default)]
    pub causal_type: String,
    /// Rendering position payload, typically `{"x": .., "y": ..}`.
    #[serde(default)]
    pub position: Document,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub displays: Vec<DiagramDisplay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addons: Option<Document>,
}

impl DiagramElement {
    pub fn new(meta: Meta, causal_type: impl Into<String>) -> Self {
        Self {
            meta,
            causal_type: causal_type.into(),
            position: Document::Null,
            displays: Vec::new(),
            addons: None,
        }
    }
}

/// Visual control attached to a diagram element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDisplay {
    pub meta: Meta,
    #[serde(default)]
    pub content: Document,
    #[serde(default)]
    pub display_type: String,
}

/// Directed edge `source -> target` between two elements of one diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalDependency {
    pub meta: Meta,
    pub source: EntityId,
    pub target: EntityId,
}

impl CausalDependency {
    pub fn new(meta: Meta, source: EntityId, target: EntityId) -> Self {
        Self {
            meta,
            source,
            target,
        }
    }
}

/// A value consumed or produced by evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputOutputValue {
    pub meta: Meta,
    #[serde(default)]
    pub data: Document,
}

/// Binds input/output values to the displays that drive or show them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub meta: Meta,
    #[serde(rename = "inputOutputValues", default, deserialize_with = "null_as_empty")]
    pub io_values: Vec<EntityId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub displays: Vec<EntityId>,
}

/// Executable arrangement of evaluatable elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnableModel {
    pub meta: Meta,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub elements: Vec<EvalElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addons: Option<Document>,
}

/// One function call inside a runnable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalElement {
    pub meta: Meta,
    /// `uuid`s of `InputOutputValue`s read by the function.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub inputs: Vec<EntityId>,
    /// `uuid`s of `InputOutputValue`s written by the function.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub outputs: Vec<EntityId>,
    #[serde(default)]
    pub function_name: String,
    #[serde(rename = "evaluatableAsset", default, deserialize_with = "blank_as_none")]
    pub eval_asset: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addons: Option<Document>,
}

/// Executable payload (script, endpoint, binary) used by eval elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalAsset {
    pub meta: Meta,
    #[serde(default)]
    pub eval_type: String,
    /// Opaque payload, e.g. `{"script": "...", "language": "javascript"}`.
    #[serde(default)]
    pub content: Document,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => Uuid::parse_str(raw.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::{Control, EvalElement, RunnableModel};
    use serde_json::json;
    use uuid::Uuid;

    fn meta() -> serde_json::Value {
        json!({ "uuid": Uuid::new_v4().to_string(), "name": "x" })
    }

    #[test]
    fn blank_eval_asset_reads_as_none() {
        for asset in [json!(""), json!(null)] {
            let element: EvalElement = serde_json::from_value(json!({
                "meta": meta(),
                "functionName": "add",
                "evaluatableAsset": asset,
            }))
            .unwrap();
            assert_eq!(element.eval_asset, None);
        }
    }

    #[test]
    fn eval_asset_uuid_is_parsed() {
        let asset = Uuid::new_v4();
        let element: EvalElement = serde_json::from_value(json!({
            "meta": meta(),
            "evaluatableAsset": asset.to_string(),
        }))
        .unwrap();
        assert_eq!(element.eval_asset, Some(asset));

        let bad = serde_json::from_value::<EvalElement>(json!({
            "meta": meta(),
            "evaluatableAsset": "not-a-uuid",
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn null_lists_read_as_empty() {
        let control: Control = serde_json::from_value(json!({
            "meta": meta(),
            "inputOutputValues": null,
            "displays": null,
        }))
        .unwrap();
        assert!(control.io_values.is_empty());
        assert!(control.displays.is_empty());

        let runnable: RunnableModel = serde_json::from_value(json!({
            "meta": meta(),
            "elements": [{ "meta": meta(), "inputs": null, "outputs": null }],
        }))
        .unwrap();
        assert!(runnable.elements[0].inputs.is_empty());
        assert!(runnable.elements[0].outputs.is_empty());
    }
}
