//! Non-owning, lazily resolved references to shared entities.
//!
//! # Responsibility
//! - Keep one owned copy of a shareable entity per `uuid` in an
//!   `AssetCollection`, and hand out `AssetRef`s into it.
//! - Provide the referenced model shape as an in-memory alternative to the
//!   inline documents the store persists.
//!
//! # Invariants
//! - Creating an `AssetRef` never reads its collection.
//! - An `AssetRef` whose target was removed, or whose collection was
//!   dropped, resolves to `ReferenceError::Unresolved`.

use crate::model::kind::EntityKind;
use crate::model::meta::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod asset_ref;
mod shared;

pub use asset_ref::{resolve, AssetCollection, AssetRef};
pub use shared::{AssetLibrary, SharedModel};

/// Reference resolution error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    Unresolved { kind: EntityKind, uuid: EntityId },
}

impl Display for ReferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolved { kind, uuid } => {
                write!(f, "{kind} reference does not resolve: {uuid}")
            }
        }
    }
}

impl Error for ReferenceError {}

pub type ReferenceResult<T> = Result<T, ReferenceError>;
