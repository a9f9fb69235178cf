//! Persisted process-wide markers.
//!
//! # Responsibility
//! - Store named one-shot flags outside the record collection.
//!
//! # Invariants
//! - Setting a marker is idempotent; the first `set_at` timestamp is kept.

use crate::repo::record_repo::RepoResult;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};

/// Marker recording that demo seeding has been attempted on this installation.
pub const DEMO_SEED_ATTEMPTED: &str = "demo_seed_attempted";

/// Returns whether the named marker has been set.
pub fn marker_is_set(conn: &Connection, name: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM app_markers WHERE name = ?1);",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Sets the named marker.
pub fn set_marker(conn: &Connection, name: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO app_markers (name, value, set_at) VALUES (?1, 'true', ?2);",
        params![name, Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)],
    )?;
    Ok(())
}
