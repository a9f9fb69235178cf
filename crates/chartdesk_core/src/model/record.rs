//! Patient record and attachment model.
//!
//! # Responsibility
//! - Define the structured intake record produced by extraction or manual entry.
//! - Provide ordered-sequence editing for allergies, medications and diagnoses.
//! - Define the binary document image bound 1:1 to a stored record.
//!
//! # Invariants
//! - `key` is `None` until the first save and immutable afterwards.
//! - Sequence edits only append at the end or remove at an index; removal out of
//!   range leaves the record unchanged.
//! - An `Attachment` never holds empty data.

use crate::model::key::RecordKey;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Reaction severity reported for one allergy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Unknown,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Unknown => "Unknown",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    /// Parses case-insensitively; surrounding whitespace is ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mild" => Ok(Self::Mild),
            "moderate" => Ok(Self::Moderate),
            "severe" => Ok(Self::Severe),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!(
                "unsupported severity `{other}`; expected Mild|Moderate|Severe|Unknown"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformation {
    pub first_name: String,
    pub last_name: String,
    /// Free text as captured, usually `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub gender: String,
    /// Medical record number. Not unique across records.
    pub medical_record_number: String,
}

/// Four free-text physiological readings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    pub blood_pressure: String,
    pub heart_rate: String,
    pub temperature: String,
    pub respiratory_rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergy {
    pub name: String,
    pub severity: Severity,
}

impl Allergy {
    pub fn new(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

impl Medication {
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        frequency: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            frequency: frequency.into(),
        }
    }
}

/// Structured clinical intake record.
///
/// Field names serialize in camelCase so extraction-service payloads decode
/// directly into this type. The key is carried as `savedAt`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Assigned by the record store on first save.
    #[serde(rename = "savedAt", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<RecordKey>,
    pub personal_information: PersonalInformation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<Vitals>,
    #[serde(default)]
    pub allergies: Vec<Allergy>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub diagnosis: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl PatientRecord {
    /// Creates an unsaved record with only personal information populated.
    pub fn new(personal_information: PersonalInformation) -> Self {
        Self {
            personal_information,
            ..Self::default()
        }
    }

    /// Returns `first last`, trimmed.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.personal_information.first_name, self.personal_information.last_name
        )
        .trim()
        .to_string()
    }

    /// Merges summary-service output into this in-memory record.
    ///
    /// Blank text clears the summary.
    pub fn apply_summary(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.summary = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
    }

    pub fn push_allergy(&mut self, allergy: Allergy) {
        self.allergies.push(allergy);
    }

    pub fn remove_allergy(&mut self, index: usize) -> Option<Allergy> {
        remove_at(&mut self.allergies, index)
    }

    pub fn push_medication(&mut self, medication: Medication) {
        self.medications.push(medication);
    }

    pub fn remove_medication(&mut self, index: usize) -> Option<Medication> {
        remove_at(&mut self.medications, index)
    }

    pub fn push_diagnosis(&mut self, diagnosis: impl Into<String>) {
        self.diagnosis.push(diagnosis.into());
    }

    pub fn remove_diagnosis(&mut self, index: usize) -> Option<String> {
        remove_at(&mut self.diagnosis, index)
    }
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    if index < items.len() {
        Some(items.remove(index))
    } else {
        None
    }
}

/// Rejected attachment input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    Empty,
}

impl Display for AttachmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "attachment data cannot be empty"),
        }
    }
}

impl Error for AttachmentError {}

/// Binary document image owned by exactly one record.
///
/// Contents are opaque; only non-emptiness is checked.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    media_type: String,
    bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AttachmentError> {
        if bytes.is_empty() {
            return Err(AttachmentError::Empty);
        }
        Ok(Self {
            media_type: media_type.into(),
            bytes,
        })
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl Debug for Attachment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One persisted (record, attachment) pair as returned by listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub record: PatientRecord,
    pub attachment: Attachment,
}

impl StoredRecord {
    pub fn key(&self) -> Option<&RecordKey> {
        self.record.key.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Allergy, Attachment, AttachmentError, Medication, PatientRecord, PersonalInformation,
        Severity,
    };

    fn sample() -> PatientRecord {
        PatientRecord::new(PersonalInformation {
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            ..PersonalInformation::default()
        })
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!(" SEVERE ".parse::<Severity>().unwrap(), Severity::Severe);
        assert_eq!("mild".parse::<Severity>().unwrap(), Severity::Mild);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn sequence_edits_append_and_remove_by_index() {
        let mut record = sample();
        record.push_allergy(Allergy::new("Penicillin", Severity::Severe));
        record.push_allergy(Allergy::new("Pollen", Severity::Mild));
        record.push_medication(Medication::new("Lisinopril", "10mg", "Once daily"));
        record.push_diagnosis("Hypertension");

        let removed = record.remove_allergy(0).unwrap();
        assert_eq!(removed.name, "Penicillin");
        assert_eq!(record.allergies.len(), 1);
        assert_eq!(record.allergies[0].name, "Pollen");

        assert!(record.remove_medication(3).is_none());
        assert_eq!(record.medications.len(), 1);
        assert_eq!(record.remove_diagnosis(0).as_deref(), Some("Hypertension"));
        assert!(record.diagnosis.is_empty());
    }

    #[test]
    fn apply_summary_clears_on_blank_text() {
        let mut record = sample();
        record.apply_summary("Stable, follow up in 6 months.");
        assert_eq!(
            record.summary.as_deref(),
            Some("Stable, follow up in 6 months.")
        );
        record.apply_summary("   ");
        assert!(record.summary.is_none());
    }

    #[test]
    fn display_name_joins_first_and_last() {
        assert_eq!(sample().display_name(), "Ada Byron");
    }

    #[test]
    fn attachment_rejects_empty_data() {
        assert_eq!(
            Attachment::new("image/png", Vec::new()).unwrap_err(),
            AttachmentError::Empty
        );
        let attachment = Attachment::new("image/png", vec![1, 2, 3]).unwrap();
        assert_eq!(attachment.len(), 3);
        assert!(!format!("{attachment:?}").contains("[1, 2, 3]"));
    }
}
