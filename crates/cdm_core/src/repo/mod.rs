//! Repository layer: append-only physical records and ownership edges.
//!
//! # Responsibility
//! - Define the four storage access patterns the core relies on: record
//!   insert, query by `uuid`, query by owner, group-max by `uuid`.
//! - Isolate SQLite query details from assembly and facade logic.
//!
//! # Invariants
//! - Records are never updated in place; a new version is a new record.
//! - The current version of a `uuid` is its record with the greatest `seq`.

pub mod record_repo;
