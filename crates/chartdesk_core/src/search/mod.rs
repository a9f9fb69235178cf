//! Record listing query entry points.
//!
//! # Responsibility
//! - Derive the filtered, recency-ordered view shown by the UI.
//! - Keep result shaping inside core, free of persistent state.

pub mod filter;
