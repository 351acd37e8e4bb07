//! Identity and provenance envelope shared by every entity.
//!
//! # Invariants
//! - `uuid` is the logical identity; it is shared by all versions of an
//!   entity and is never rewritten by core.
//! - `version` is an author-supplied label and plays no part in ordering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable logical identifier of any entity.
pub type EntityId = Uuid;

/// Opaque, order-preserving JSON payload attached to some entities.
pub type Document = serde_json::Value;

/// Identity envelope attached to every addressable entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub uuid: EntityId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Document>,
    /// Free-text label such as `0.1`; not a sequence number.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub draft: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub creator: String,
    /// ISO-8601 timestamp text, stored as supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub updator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,
}

impl Meta {
    /// Creates an envelope for a caller-provided identity.
    pub fn new(uuid: EntityId, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an envelope with a freshly minted v4 identity.
    pub fn fresh(name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4(), name)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
