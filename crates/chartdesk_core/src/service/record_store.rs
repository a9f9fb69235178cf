//! Async record store.
//!
//! # Responsibility
//! - Expose put/list/delete over (record, attachment) pairs to UI callers.
//! - Map repository failures onto the caller-facing error taxonomy.
//!
//! # Invariants
//! - Every operation suspends until the storage engine acknowledges it; a `put`
//!   followed by `list_all` from the same flow observes the write.
//! - No operation retries internally.
//! - Conflicting writes to one key resolve last-write-wins.

use crate::db::StoreContext;
use crate::error::{StoreError, StoreResult};
use crate::model::key::RecordKey;
use crate::model::record::{Attachment, PatientRecord, StoredRecord};
use crate::repo::record_repo::{RecordRepository, SqliteRecordRepository};
use log::{debug, info, warn};
use std::time::Instant;

/// Durable keyed storage of record/attachment pairs.
#[derive(Clone)]
pub struct RecordStore {
    context: StoreContext,
}

impl RecordStore {
    pub fn new(context: StoreContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &StoreContext {
        &self.context
    }

    /// Upserts one record with its attachment.
    ///
    /// Assigns `record.key` from the current clock when it is missing and
    /// returns the key the pair is stored under. Passing `None` as attachment
    /// keeps the one already stored for the record's key.
    ///
    /// # Errors
    /// - `AttachmentMissing` when no attachment is supplied and none is stored.
    /// - `TransactionAborted` when the write fails; prior state is unchanged.
    /// - `StorageUnavailable` when the database cannot be opened.
    pub async fn put(
        &self,
        record: PatientRecord,
        attachment: Option<Attachment>,
    ) -> StoreResult<RecordKey> {
        let started_at = Instant::now();
        let had_key = record.key.is_some();
        let attachment_bytes = attachment.as_ref().map_or(0, Attachment::len);

        let result = self
            .context
            .run_blocking(move |conn| {
                SqliteRecordRepository::new(conn)
                    .put_record(&record, attachment.as_ref())
                    .map_err(StoreError::from)
            })
            .await;

        match &result {
            Ok(key) => info!(
                "event=record_put module=store status=ok key={} new={} attachment_bytes={} duration_ms={}",
                key,
                !had_key,
                attachment_bytes,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("record_put", err, started_at),
        }
        result
    }

    /// Returns every stored pair in unspecified order.
    ///
    /// Either the full set is returned or the call fails; never a partial list.
    pub async fn list_all(&self) -> StoreResult<Vec<StoredRecord>> {
        let started_at = Instant::now();
        let result = self
            .context
            .run_blocking(|conn| {
                SqliteRecordRepository::new(conn)
                    .list_records()
                    .map_err(StoreError::from)
            })
            .await;

        match &result {
            Ok(records) => debug!(
                "event=record_list module=store status=ok count={} duration_ms={}",
                records.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("record_list", err, started_at),
        }
        result
    }

    /// Loads one pair by key.
    pub async fn get(&self, key: &RecordKey) -> StoreResult<Option<StoredRecord>> {
        let key = key.clone();
        self.context
            .run_blocking(move |conn| {
                SqliteRecordRepository::new(conn)
                    .get_record(&key)
                    .map_err(StoreError::from)
            })
            .await
    }

    /// Loads only the attachment stored for `key`.
    pub async fn attachment(&self, key: &RecordKey) -> StoreResult<Option<Attachment>> {
        let key = key.clone();
        self.context
            .run_blocking(move |conn| {
                SqliteRecordRepository::new(conn)
                    .get_attachment(&key)
                    .map_err(StoreError::from)
            })
            .await
    }

    /// Removes the pair stored under `key`.
    ///
    /// Succeeds without effect when the key does not exist.
    pub async fn delete(&self, key: &RecordKey) -> StoreResult<()> {
        let started_at = Instant::now();
        let owned_key = key.clone();
        let result = self
            .context
            .run_blocking(move |conn| {
                SqliteRecordRepository::new(conn)
                    .delete_record(&owned_key)
                    .map_err(StoreError::from)
            })
            .await;

        match result {
            Ok(existed) => {
                info!(
                    "event=record_delete module=store status=ok key={} existed={} duration_ms={}",
                    key,
                    existed,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                log_failure("record_delete", &err, started_at);
                Err(err)
            }
        }
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.context
            .run_blocking(|conn| {
                SqliteRecordRepository::new(conn)
                    .count_records()
                    .map_err(StoreError::from)
            })
            .await
    }
}

fn log_failure(event: &str, err: &StoreError, started_at: Instant) {
    warn!(
        "event={} module=store status=error error_code={} duration_ms={} error={}",
        event,
        err.code(),
        started_at.elapsed().as_millis(),
        err
    );
}
