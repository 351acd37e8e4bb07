//! Sample "adder" model used for seeding and smoke tests.
//!
//! Two `Lever` inputs feed one `Outcome`; a runnable model sums the inputs
//! with a JavaScript `add` function. Every call mints fresh `uuid`s, so two
//! samples never collide in one store.

use crate::model::cdm::{
    CausalDecisionModel, CausalDependency, Control, Diagram, DiagramDisplay, DiagramElement,
    EvalAsset, EvalElement, InputOutputValue, RunnableModel,
};
use crate::model::meta::{EntityId, Meta};
use serde_json::json;
use uuid::Uuid;

pub const SAMPLE_SCHEMA: &str = "Placeholder";
const SAMPLE_CREATED_DATE: &str = "2025-04-29T12:31:37-04:00";
const ADD_SCRIPT_BASE64: &str = "KGZ1bmN0aW9uICgpIHsKICBjb25zdCBhZGQgPSBmdW5jdGlvbiAodmFscykgewogICAgbGV0IHN1bSA9IDA7CiAgICB2YWxzLmZvckVhY2goKHZhbCkgPT4gewogICAgICBzdW0gKz0gdmFsOwogICAgfSk7CiAgICByZXR1cm4gW3N1bV07CiAgfTsKCiAgcmV0dXJuIHsgZnVuY01hcDogeyAiYWRkIjogYWRkIH0gfTsKfSkoKTs=";

struct Slot {
    name: &'static str,
    causal_type: &'static str,
    position: (f64, f64),
    max: u32,
    value: u32,
    interactive: bool,
    data: serde_json::Value,
    io_uuid: EntityId,
    display_uuid: EntityId,
}

/// Builds the adder model with freshly minted identities.
pub fn sample_model() -> CausalDecisionModel {
    let slots = [
        Slot {
            name: "Sum Input 1",
            causal_type: "Lever",
            position: (87.5, 256.5),
            max: 50,
            value: 25,
            interactive: true,
            data: json!(30),
            io_uuid: Uuid::new_v4(),
            display_uuid: Uuid::new_v4(),
        },
        Slot {
            name: "Sum Input 2",
            causal_type: "Lever",
            position: (89.5, 439.5),
            max: 50,
            value: 25,
            interactive: true,
            data: json!(27),
            io_uuid: Uuid::new_v4(),
            display_uuid: Uuid::new_v4(),
        },
        Slot {
            name: "Sum Output",
            causal_type: "Outcome",
            position: (500.0, 348.0),
            max: 100,
            value: 50,
            interactive: false,
            data: serde_json::Value::Null,
            io_uuid: Uuid::new_v4(),
            display_uuid: Uuid::new_v4(),
        },
    ];
    let add_asset_uuid = Uuid::new_v4();

    let mut model_meta = Meta::fresh("Test Model");
    model_meta.summary =
        "Adds two lever inputs and shows the sum as an outcome.".to_string();
    model_meta.version = "0.1".to_string();
    model_meta.draft = true;
    model_meta.created_date = Some(SAMPLE_CREATED_DATE.to_string());
    let mut model = CausalDecisionModel::new(model_meta, SAMPLE_SCHEMA);

    let mut diagram_meta = Meta::fresh("Test Diagram");
    diagram_meta.created_date = Some(SAMPLE_CREATED_DATE.to_string());
    let mut diagram = Diagram::new(diagram_meta);

    for slot in &slots {
        // Elements share their IO value's uuid, so controls and eval elements
        // can point at either.
        let mut element = DiagramElement::new(Meta::new(slot.io_uuid, slot.name), slot.causal_type);
        element.position = json!({ "x": slot.position.0, "y": slot.position.1 });
        element.displays.push(DiagramDisplay {
            meta: Meta::new(
                slot.display_uuid,
                if slot.interactive { "" } else { "Sum:" },
            ),
            content: json!({
                "controlParameters": {
                    "min": 0,
                    "max": slot.max,
                    "step": 1,
                    "value": slot.value,
                    "isInteractive": slot.interactive
                }
            }),
            display_type: "controlRange".to_string(),
        });
        diagram.elements.push(element);

        model.io_values.push(InputOutputValue {
            meta: Meta::new(slot.io_uuid, slot.name.replace("Sum", "Add")),
            data: slot.data.clone(),
        });
        model.controls.push(Control {
            meta: Meta::fresh(format!("Control: {}", slot.name)),
            io_values: vec![slot.io_uuid],
            displays: vec![slot.display_uuid],
        });
    }

    let output = &slots[2];
    for input in &slots[..2] {
        diagram.dependencies.push(CausalDependency::new(
            Meta::fresh(format!("{} --> {}", input.name, output.name)),
            input.io_uuid,
            output.io_uuid,
        ));
    }
    model.diagrams.push(diagram);

    model.runnable_models.push(RunnableModel {
        meta: Meta::fresh("Test runnable model"),
        elements: vec![EvalElement {
            meta: Meta::fresh("Sum inputs"),
            inputs: vec![slots[0].io_uuid, slots[1].io_uuid],
            outputs: vec![output.io_uuid],
            function_name: "add".to_string(),
            eval_asset: Some(add_asset_uuid),
            addons: None,
        }],
        addons: None,
    });
    model.eval_assets.push(EvalAsset {
        meta: Meta::new(add_asset_uuid, "Add script"),
        eval_type: "Script".to_string(),
        content: json!({ "script": ADD_SCRIPT_BASE64, "language": "javascript" }),
    });

    model
}
