//! Causal Decision Model document types.
//!
//! # Responsibility
//! - Define the inline document shape read and written by the store.
//! - Name every persisted entity kind and the ownership edges between them.
//!
//! # Invariants
//! - Every addressable entity carries a `Meta` whose `uuid` never changes
//!   across versions.
//! - Opaque payloads (`addons`, `position`, `content`, ...) are passed
//!   through untouched and never interpreted by core.

pub mod cdm;
pub mod kind;
pub mod meta;
pub mod sample;
pub mod validation;
