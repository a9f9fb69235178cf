//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from the async store and seeder.
//!
//! # Invariants
//! - Repository APIs are synchronous and run on the caller's thread; async
//!   callers move them onto blocking threads.
//! - Repository APIs return semantic errors (`AttachmentMissing`,
//!   `InvalidData`) in addition to DB transport errors.

pub mod marker_repo;
pub mod record_repo;
