//! Free-text filter over record listings.
//!
//! # Responsibility
//! - Build one case-folded search corpus per record.
//! - Select records whose corpus contains the query and order them newest first.
//!
//! # Invariants
//! - Pure: never mutates a record and holds no state between calls.
//! - Only the empty query matches unconditionally; whitespace is significant.
//! - Records whose key has no timestamp sort after all timestamped records and
//!   keep their input order among themselves.

use crate::model::record::{PatientRecord, StoredRecord};
use std::cmp::Ordering;

/// Builds the lowercase text a query is matched against.
///
/// Fields are joined with single spaces; absent optional fields and empty
/// values are skipped.
pub fn search_corpus(record: &PatientRecord) -> String {
    let info = &record.personal_information;
    let mut parts: Vec<&str> = vec![
        info.first_name.as_str(),
        info.last_name.as_str(),
        info.medical_record_number.as_str(),
        info.date_of_birth.as_str(),
        info.gender.as_str(),
    ];

    if let Some(vitals) = record.vitals.as_ref() {
        parts.extend([
            vitals.blood_pressure.as_str(),
            vitals.heart_rate.as_str(),
            vitals.temperature.as_str(),
            vitals.respiratory_rate.as_str(),
        ]);
    }
    for allergy in &record.allergies {
        parts.extend([allergy.name.as_str(), allergy.severity.as_str()]);
    }
    for medication in &record.medications {
        parts.extend([
            medication.name.as_str(),
            medication.dosage.as_str(),
            medication.frequency.as_str(),
        ]);
    }
    parts.extend(record.diagnosis.iter().map(String::as_str));
    if let Some(notes) = record.notes.as_deref() {
        parts.push(notes);
    }

    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns whether `record` matches `query`.
pub fn matches_query(record: &PatientRecord, query: &str) -> bool {
    let needle = normalize_query(query);
    needle.is_empty() || search_corpus(record).contains(&needle)
}

/// Filters an owned listing and orders it by key timestamp, newest first.
pub fn filter_records(query: &str, listing: Vec<StoredRecord>) -> Vec<StoredRecord> {
    let needle = normalize_query(query);
    let mut matched = listing
        .into_iter()
        .filter(|stored| needle.is_empty() || search_corpus(&stored.record).contains(&needle))
        .collect::<Vec<_>>();
    matched.sort_by(|a, b| newest_first(&a.record, &b.record));
    matched
}

/// Borrowing variant of [`filter_records`] for callers that keep the listing.
pub fn filter_view<'a>(query: &str, listing: &'a [StoredRecord]) -> Vec<&'a StoredRecord> {
    let needle = normalize_query(query);
    let mut matched = listing
        .iter()
        .filter(|stored| needle.is_empty() || search_corpus(&stored.record).contains(&needle))
        .collect::<Vec<_>>();
    matched.sort_by(|a, b| newest_first(&a.record, &b.record));
    matched
}

fn normalize_query(query: &str) -> String {
    query.to_lowercase()
}

fn newest_first(a: &PatientRecord, b: &PatientRecord) -> Ordering {
    let a_at = a.key.as_ref().and_then(|key| key.timestamp());
    let b_at = b.key.as_ref().and_then(|key| key.timestamp());
    match (a_at, b_at) {
        (Some(a_at), Some(b_at)) => b_at.cmp(&a_at),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_records, filter_view, matches_query, search_corpus};
    use crate::model::key::RecordKey;
    use crate::model::record::{
        Allergy, Attachment, Medication, PatientRecord, PersonalInformation, Severity,
        StoredRecord, Vitals,
    };

    fn stored(key: Option<&str>, first_name: &str) -> StoredRecord {
        let mut record = PatientRecord::new(PersonalInformation {
            first_name: first_name.to_string(),
            last_name: "Smith".to_string(),
            ..PersonalInformation::default()
        });
        record.key = key.map(RecordKey::new);
        StoredRecord {
            record,
            attachment: Attachment::new("image/png", vec![0x89]).unwrap(),
        }
    }

    fn names(listing: &[StoredRecord]) -> Vec<&str> {
        listing
            .iter()
            .map(|s| s.record.personal_information.first_name.as_str())
            .collect()
    }

    #[test]
    fn corpus_skips_absent_and_empty_fields() {
        let record = PatientRecord::new(PersonalInformation {
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            ..PersonalInformation::default()
        });
        assert_eq!(search_corpus(&record), "john smith");
    }

    #[test]
    fn corpus_covers_every_searchable_field() {
        let mut record = PatientRecord::new(PersonalInformation {
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            date_of_birth: "1965-03-15".to_string(),
            gender: "Male".to_string(),
            medical_record_number: "MRN-10001".to_string(),
        });
        record.vitals = Some(Vitals {
            blood_pressure: "130/85 mmHg".to_string(),
            heart_rate: "72 bpm".to_string(),
            temperature: "98.6°F".to_string(),
            respiratory_rate: "16 breaths/min".to_string(),
        });
        record.push_allergy(Allergy::new("Penicillin", Severity::Severe));
        record.push_medication(Medication::new("Lisinopril", "10mg", "Once daily"));
        record.push_diagnosis("Hypertension");
        record.notes = Some("Annual check-up".to_string());
        record.summary = Some("summary-only-token".to_string());

        for query in [
            "mrn-10001",
            "1965-03",
            "male",
            "130/85",
            "72 bpm",
            "98.6",
            "breaths",
            "PENICILLIN",
            "penicillin severe",
            "lisinopril 10mg once daily",
            "hyperten",
            "annual check",
        ] {
            assert!(matches_query(&record, query), "query `{query}` should match");
        }
        assert!(!matches_query(&record, "summary-only-token"));
    }

    #[test]
    fn empty_query_keeps_all_and_sorts_newest_first() {
        let listing = vec![
            stored(Some("2026-01-01T00:00:00.000Z"), "first"),
            stored(Some("2026-03-01T00:00:00.000Z"), "third"),
            stored(Some("2026-02-01T00:00:00.000Z"), "second"),
        ];
        let result = filter_records("", listing);
        assert_eq!(names(&result), vec!["third", "second", "first"]);
    }

    #[test]
    fn unresolvable_keys_sort_last_in_input_order() {
        let listing = vec![
            stored(None, "unsaved"),
            stored(Some("not-a-time"), "legacy"),
            stored(Some("2026-01-01T00:00:00.000Z"), "dated"),
        ];
        let result = filter_records("", listing);
        assert_eq!(names(&result), vec!["dated", "unsaved", "legacy"]);
    }

    #[test]
    fn surrounding_whitespace_is_part_of_the_query() {
        let record = PatientRecord::new(PersonalInformation {
            first_name: "Johnson".to_string(),
            last_name: "Doe".to_string(),
            ..PersonalInformation::default()
        });
        assert!(matches_query(&record, "john"));
        assert!(!matches_query(&record, "john "));
        assert!(matches_query(&record, "johnson "));
        assert!(!matches_query(&record, " "));
        assert!(matches_query(&record, ""));
    }

    #[test]
    fn view_filters_without_taking_ownership() {
        let listing = vec![
            stored(Some("2026-01-01T00:00:00.000Z"), "Alice"),
            stored(Some("2026-02-01T00:00:00.000Z"), "Bob"),
        ];
        let view = filter_view("ALI", &listing);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].record.personal_information.first_name, "Alice");
        assert!(filter_view("appendicitis", &listing).is_empty());
        assert_eq!(listing.len(), 2);
    }
}
