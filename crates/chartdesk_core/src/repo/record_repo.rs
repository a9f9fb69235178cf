//! Patient record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist (record, attachment) pairs keyed by `RecordKey`.
//! - Keep SQL details, child-table layout and key assignment inside core.
//!
//! # Invariants
//! - `put_record` writes the record row, its ordered child rows and its
//!   attachment in one immediate transaction; on any failure nothing changes.
//! - A record row never exists without an attachment row.
//! - Generated keys are unique: a taken key advances one millisecond until free.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::key::RecordKey;
use crate::model::record::{
    Allergy, Attachment, Medication, PatientRecord, PersonalInformation, Severity, StoredRecord,
    Vitals,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT
    r.record_key,
    r.first_name,
    r.last_name,
    r.date_of_birth,
    r.gender,
    r.medical_record_number,
    r.has_vitals,
    r.blood_pressure,
    r.heart_rate,
    r.temperature,
    r.respiratory_rate,
    r.notes,
    r.summary,
    a.media_type,
    a.bytes
FROM patient_records r
LEFT JOIN record_attachments a ON a.record_key = r.record_key
WHERE (?1 IS NULL OR r.record_key = ?1)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No attachment supplied and none stored for the key.
    AttachmentMissing(Option<RecordKey>),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::AttachmentMissing(Some(key)) => write!(f, "attachment missing for {key}"),
            Self::AttachmentMissing(None) => write!(f, "attachment missing for new record"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::AttachmentMissing(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for record/attachment pairs.
pub trait RecordRepository {
    /// Upserts one record with its attachment and returns the key used.
    ///
    /// With `attachment = None`, the attachment already stored under the
    /// record's key is kept; if there is none the write is rejected.
    fn put_record(
        &mut self,
        record: &PatientRecord,
        attachment: Option<&Attachment>,
    ) -> RepoResult<RecordKey>;
    /// Returns every stored pair in unspecified order.
    fn list_records(&self) -> RepoResult<Vec<StoredRecord>>;
    fn get_record(&self, key: &RecordKey) -> RepoResult<Option<StoredRecord>>;
    fn get_attachment(&self, key: &RecordKey) -> RepoResult<Option<Attachment>>;
    /// Deletes one pair. Returns whether a row existed.
    fn delete_record(&mut self, key: &RecordKey) -> RepoResult<bool>;
    fn count_records(&self) -> RepoResult<usize>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Wraps a migrated connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn put_record(
        &mut self,
        record: &PatientRecord,
        attachment: Option<&Attachment>,
    ) -> RepoResult<RecordKey> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let key = match record.key.as_ref() {
            Some(key) => key.clone(),
            None => next_free_key(&tx, RecordKey::now())?,
        };

        if attachment.is_none() {
            let has_stored = record.key.is_some() && attachment_exists(&tx, &key)?;
            if !has_stored {
                return Err(RepoError::AttachmentMissing(record.key.clone()));
            }
        }

        upsert_record_row(&tx, &key, record)?;
        replace_child_rows(&tx, &key, record)?;
        if let Some(attachment) = attachment {
            tx.execute(
                "INSERT INTO record_attachments (record_key, media_type, bytes)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (record_key) DO UPDATE SET
                    media_type = excluded.media_type,
                    bytes = excluded.bytes;",
                params![key.as_str(), attachment.media_type(), attachment.bytes()],
            )?;
        }

        tx.commit()?;
        Ok(key)
    }

    fn list_records(&self) -> RepoResult<Vec<StoredRecord>> {
        let tx = self.conn.unchecked_transaction()?;
        let records = load_records(&tx, None)?;
        tx.commit()?;
        Ok(records)
    }

    fn get_record(&self, key: &RecordKey) -> RepoResult<Option<StoredRecord>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut records = load_records(&tx, Some(key))?;
        tx.commit()?;
        Ok(records.pop())
    }

    fn get_attachment(&self, key: &RecordKey) -> RepoResult<Option<Attachment>> {
        let stored = self
            .conn
            .query_row(
                "SELECT media_type, bytes FROM record_attachments WHERE record_key = ?1;",
                [key.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?)),
            )
            .optional()?;

        match stored {
            Some((media_type, bytes)) => Ok(Some(decode_attachment(key, media_type, bytes)?)),
            None => Ok(None),
        }
    }

    fn delete_record(&mut self, key: &RecordKey) -> RepoResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        // Child and attachment rows cascade with the record row.
        let changed = tx.execute(
            "DELETE FROM patient_records WHERE record_key = ?1;",
            [key.as_str()],
        )?;
        tx.commit()?;
        Ok(changed > 0)
    }

    fn count_records(&self) -> RepoResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM patient_records;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative record count `{count}`")))
    }
}

fn next_free_key(tx: &Transaction<'_>, candidate: RecordKey) -> RepoResult<RecordKey> {
    let mut key = candidate;
    while record_exists(tx, &key)? {
        key = key.next_millisecond().ok_or_else(|| {
            RepoError::InvalidData(format!("generated key `{key}` is not a timestamp"))
        })?;
    }
    Ok(key)
}

fn record_exists(tx: &Transaction<'_>, key: &RecordKey) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM patient_records WHERE record_key = ?1);",
        [key.as_str()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn attachment_exists(tx: &Transaction<'_>, key: &RecordKey) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM record_attachments WHERE record_key = ?1);",
        [key.as_str()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn upsert_record_row(
    tx: &Transaction<'_>,
    key: &RecordKey,
    record: &PatientRecord,
) -> RepoResult<()> {
    let info = &record.personal_information;
    let vitals = record.vitals.as_ref();
    tx.execute(
        "INSERT INTO patient_records (
            record_key,
            first_name,
            last_name,
            date_of_birth,
            gender,
            medical_record_number,
            has_vitals,
            blood_pressure,
            heart_rate,
            temperature,
            respiratory_rate,
            notes,
            summary
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        ON CONFLICT (record_key) DO UPDATE SET
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            date_of_birth = excluded.date_of_birth,
            gender = excluded.gender,
            medical_record_number = excluded.medical_record_number,
            has_vitals = excluded.has_vitals,
            blood_pressure = excluded.blood_pressure,
            heart_rate = excluded.heart_rate,
            temperature = excluded.temperature,
            respiratory_rate = excluded.respiratory_rate,
            notes = excluded.notes,
            summary = excluded.summary;",
        params![
            key.as_str(),
            info.first_name.as_str(),
            info.last_name.as_str(),
            info.date_of_birth.as_str(),
            info.gender.as_str(),
            info.medical_record_number.as_str(),
            bool_to_int(vitals.is_some()),
            vitals.map(|v| v.blood_pressure.as_str()),
            vitals.map(|v| v.heart_rate.as_str()),
            vitals.map(|v| v.temperature.as_str()),
            vitals.map(|v| v.respiratory_rate.as_str()),
            record.notes.as_deref(),
            record.summary.as_deref(),
        ],
    )?;
    Ok(())
}

fn replace_child_rows(
    tx: &Transaction<'_>,
    key: &RecordKey,
    record: &PatientRecord,
) -> RepoResult<()> {
    for table in ["record_allergies", "record_medications", "record_diagnoses"] {
        tx.execute(
            &format!("DELETE FROM {table} WHERE record_key = ?1;"),
            [key.as_str()],
        )?;
    }

    for (position, allergy) in record.allergies.iter().enumerate() {
        tx.execute(
            "INSERT INTO record_allergies (record_key, position, name, severity)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                key.as_str(),
                position_to_db(position)?,
                allergy.name.as_str(),
                allergy.severity.as_str(),
            ],
        )?;
    }

    for (position, medication) in record.medications.iter().enumerate() {
        tx.execute(
            "INSERT INTO record_medications (record_key, position, name, dosage, frequency)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                key.as_str(),
                position_to_db(position)?,
                medication.name.as_str(),
                medication.dosage.as_str(),
                medication.frequency.as_str(),
            ],
        )?;
    }

    for (position, diagnosis) in record.diagnosis.iter().enumerate() {
        tx.execute(
            "INSERT INTO record_diagnoses (record_key, position, diagnosis)
             VALUES (?1, ?2, ?3);",
            params![key.as_str(), position_to_db(position)?, diagnosis.as_str()],
        )?;
    }

    Ok(())
}

fn load_records(conn: &Connection, key: Option<&RecordKey>) -> RepoResult<Vec<StoredRecord>> {
    let key_filter = key.map(RecordKey::as_str);
    let mut records = Vec::new();
    let mut index_by_key = HashMap::new();

    {
        let mut stmt = conn.prepare(&format!("{RECORD_SELECT_SQL};"))?;
        let mut rows = stmt.query([key_filter])?;
        while let Some(row) = rows.next()? {
            let stored = parse_record_row(row)?;
            index_by_key.insert(stored_key_text(&stored), records.len());
            records.push(stored);
        }
    }

    if records.is_empty() {
        return Ok(records);
    }

    {
        let mut stmt = conn.prepare(
            "SELECT record_key, name, severity
             FROM record_allergies
             WHERE (?1 IS NULL OR record_key = ?1)
             ORDER BY record_key ASC, position ASC;",
        )?;
        let mut rows = stmt.query([key_filter])?;
        while let Some(row) = rows.next()? {
            let owner: String = row.get("record_key")?;
            let severity_text: String = row.get("severity")?;
            let severity = severity_text.parse::<Severity>().map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid severity `{severity_text}` in record_allergies.severity"
                ))
            })?;
            let allergy = Allergy::new(row.get::<_, String>("name")?, severity);
            owner_of(&mut records, &index_by_key, &owner)?
                .allergies
                .push(allergy);
        }
    }

    {
        let mut stmt = conn.prepare(
            "SELECT record_key, name, dosage, frequency
             FROM record_medications
             WHERE (?1 IS NULL OR record_key = ?1)
             ORDER BY record_key ASC, position ASC;",
        )?;
        let mut rows = stmt.query([key_filter])?;
        while let Some(row) = rows.next()? {
            let owner: String = row.get("record_key")?;
            let medication = Medication::new(
                row.get::<_, String>("name")?,
                row.get::<_, String>("dosage")?,
                row.get::<_, String>("frequency")?,
            );
            owner_of(&mut records, &index_by_key, &owner)?
                .medications
                .push(medication);
        }
    }

    {
        let mut stmt = conn.prepare(
            "SELECT record_key, diagnosis
             FROM record_diagnoses
             WHERE (?1 IS NULL OR record_key = ?1)
             ORDER BY record_key ASC, position ASC;",
        )?;
        let mut rows = stmt.query([key_filter])?;
        while let Some(row) = rows.next()? {
            let owner: String = row.get("record_key")?;
            let diagnosis: String = row.get("diagnosis")?;
            owner_of(&mut records, &index_by_key, &owner)?
                .diagnosis
                .push(diagnosis);
        }
    }

    Ok(records)
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<StoredRecord> {
    let key = RecordKey::new(row.get::<_, String>("record_key")?);

    let vitals = match row.get::<_, i64>("has_vitals")? {
        0 => None,
        1 => Some(Vitals {
            blood_pressure: row.get::<_, Option<String>>("blood_pressure")?.unwrap_or_default(),
            heart_rate: row.get::<_, Option<String>>("heart_rate")?.unwrap_or_default(),
            temperature: row.get::<_, Option<String>>("temperature")?.unwrap_or_default(),
            respiratory_rate: row
                .get::<_, Option<String>>("respiratory_rate")?
                .unwrap_or_default(),
        }),
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid has_vitals value `{other}` in patient_records.has_vitals"
            )));
        }
    };

    let media_type: Option<String> = row.get("media_type")?;
    let bytes: Option<Vec<u8>> = row.get("bytes")?;
    let attachment = match (media_type, bytes) {
        (Some(media_type), Some(bytes)) => decode_attachment(&key, media_type, bytes)?,
        _ => {
            return Err(RepoError::InvalidData(format!(
                "record {key} has no attachment row"
            )));
        }
    };

    let record = PatientRecord {
        key: Some(key),
        personal_information: PersonalInformation {
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            date_of_birth: row.get("date_of_birth")?,
            gender: row.get("gender")?,
            medical_record_number: row.get("medical_record_number")?,
        },
        vitals,
        allergies: Vec::new(),
        medications: Vec::new(),
        diagnosis: Vec::new(),
        notes: row.get("notes")?,
        summary: row.get("summary")?,
    };

    Ok(StoredRecord { record, attachment })
}

fn decode_attachment(
    key: &RecordKey,
    media_type: String,
    bytes: Vec<u8>,
) -> RepoResult<Attachment> {
    Attachment::new(media_type, bytes).map_err(|err| {
        RepoError::InvalidData(format!("record {key} has unusable attachment: {err}"))
    })
}

fn owner_of<'a>(
    records: &'a mut [StoredRecord],
    index_by_key: &HashMap<String, usize>,
    owner: &str,
) -> RepoResult<&'a mut PatientRecord> {
    index_by_key
        .get(owner)
        .and_then(|index| records.get_mut(*index))
        .map(|stored| &mut stored.record)
        .ok_or_else(|| RepoError::InvalidData(format!("orphan child row for record `{owner}`")))
}

fn stored_key_text(stored: &StoredRecord) -> String {
    stored
        .key()
        .map(|key| key.as_str().to_string())
        .unwrap_or_default()
}

fn position_to_db(position: usize) -> RepoResult<i64> {
    i64::try_from(position)
        .map_err(|_| RepoError::InvalidData(format!("sequence position {position} out of range")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
