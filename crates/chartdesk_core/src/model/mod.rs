//! Clinical intake domain model.
//!
//! # Responsibility
//! - Define the record/attachment pair persisted by the record store.
//! - Own the timestamp-derived record key and its ordering semantics.
//!
//! # Invariants
//! - A record key is assigned once at first save and never regenerated.
//! - Every persisted record owns exactly one non-empty attachment.

pub mod key;
pub mod record;
