//! Caller-facing error taxonomy for record store and seeder operations.
//!
//! # Invariants
//! - No error is fatal to the process; callers may retry on a later action.
//! - `TransactionAborted` guarantees the prior state of the affected key is
//!   unchanged.
//! - Deleting a missing key is a success, so there is no not-found variant.

use crate::db::DbError;
use crate::model::key::RecordKey;
use crate::repo::record_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Storage engine could not be opened, configured or locked.
    StorageUnavailable(String),
    /// A read or write transaction failed and was rolled back.
    TransactionAborted(String),
    /// No attachment was supplied and none is stored for the key.
    AttachmentMissing(Option<RecordKey>),
    /// Persisted data could not be decoded into the domain model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(message) => write!(f, "storage unavailable: {message}"),
            Self::TransactionAborted(message) => write!(f, "transaction aborted: {message}"),
            Self::AttachmentMissing(Some(key)) => {
                write!(f, "no attachment supplied or stored for record {key}")
            }
            Self::AttachmentMissing(None) => {
                write!(f, "no attachment supplied for new record")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for StoreError {}

impl StoreError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::TransactionAborted(_) => "transaction_aborted",
            Self::AttachmentMissing(_) => "attachment_missing",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(value.to_string())
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => Self::TransactionAborted(err.to_string()),
            RepoError::AttachmentMissing(key) => Self::AttachmentMissing(key),
            RepoError::InvalidData(message) => Self::InvalidData(message),
        }
    }
}
