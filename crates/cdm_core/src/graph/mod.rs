//! Document tree persistence: split a model into records on write, and
//! reassemble the nested tree from records on read.
//!
//! # Responsibility
//! - Map each entity kind onto one physical record plus ownership links.
//! - Walk owned collections depth-first in declared field order.
//!
//! # Invariants
//! - Only the root may be missing (`None`); a missing owned collection
//!   reads as empty.
//! - Each parent record owns its own child records; two parents holding the
//!   same child `uuid` materialize independent copies.

pub mod assembler;
pub mod entity;
pub mod writer;

pub use assembler::GraphAssembler;
pub use entity::PersistedEntity;
pub use writer::TreeWriter;
