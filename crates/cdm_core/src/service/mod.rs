//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, writer and assembler calls into the model
//!   store operations callers see.
//! - Keep transport layers decoupled from storage details.

pub mod model_store;
