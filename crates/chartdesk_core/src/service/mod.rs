//! Core use-case services.
//!
//! # Responsibility
//! - Expose async record store and demo seeding entry points to UI callers.
//! - Keep UI layers decoupled from SQLite and blocking-thread details.

pub mod demo_data;
pub mod demo_seed;
pub mod record_store;
