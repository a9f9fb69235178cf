//! Timestamp-derived record identity.
//!
//! # Responsibility
//! - Generate record keys from the device clock.
//! - Resolve keys back into timestamps for recency ordering.
//!
//! # Invariants
//! - Generated keys are RFC 3339 UTC strings with millisecond precision.
//! - Keys that do not parse as timestamps are still valid identities; they only
//!   lose their recency ordering.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Unique identifier of a stored record.
///
/// Doubles as the creation/last-save marker of the record it identifies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    /// Wraps an existing key value without validation.
    ///
    /// Used for keys read back from storage or supplied by callers.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds a key for the given instant.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Builds a key from the current device clock.
    pub fn now() -> Self {
        Self::from_timestamp(Utc::now())
    }

    /// Resolves the key back into its timestamp, if it has one.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc))
    }

    /// Returns the next key one millisecond later.
    ///
    /// Returns `None` for keys that carry no timestamp.
    pub fn next_millisecond(&self) -> Option<Self> {
        self.timestamp()
            .map(|at| Self::from_timestamp(at + Duration::milliseconds(1)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::RecordKey;
    use chrono::{TimeZone, Utc};

    #[test]
    fn from_timestamp_uses_millisecond_rfc3339() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        let key = RecordKey::from_timestamp(at);
        assert_eq!(key.as_str(), "2026-10-16T09:30:00.000Z");
        assert_eq!(key.timestamp(), Some(at));
    }

    #[test]
    fn timestamp_is_none_for_free_text_keys() {
        assert!(RecordKey::new("legacy-1").timestamp().is_none());
        assert!(RecordKey::new("legacy-1").next_millisecond().is_none());
    }

    #[test]
    fn next_millisecond_advances_by_one_ms() {
        let key = RecordKey::new("2026-10-16T09:30:00.999Z");
        let next = key.next_millisecond().unwrap();
        assert_eq!(next.as_str(), "2026-10-16T09:30:01.000Z");
    }

    #[test]
    fn accepts_offset_timestamps() {
        let key = RecordKey::new("2026-10-16T11:30:00+02:00");
        let expected = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
        assert_eq!(key.timestamp(), Some(expected));
    }
}
