//! Core domain logic for ChartDesk.
//! This crate is the single source of truth for record storage invariants.
//!
//! Startup sequence for hosts:
//! 1. Build a [`CoreConfig`] and call [`init_logging_from_config`].
//! 2. Create a [`StoreContext`] and `init().await` it (opens and migrates).
//! 3. Run [`DemoSeeder::seed_if_needed`] once.
//! 4. Serve UI calls through [`RecordStore`] and [`filter_records`].

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::StoreContext;
pub use error::{StoreError, StoreResult};
pub use logging::{default_log_level, init_logging, init_logging_from_config, LoggingError};
pub use model::key::RecordKey;
pub use model::record::{
    Allergy, Attachment, AttachmentError, Medication, PatientRecord, PersonalInformation,
    Severity, StoredRecord, Vitals,
};
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult, SqliteRecordRepository};
pub use search::filter::{filter_records, filter_view, matches_query, search_corpus};
pub use service::demo_seed::{DemoSeeder, SeedFailure, SeedOutcome};
pub use service::record_store::RecordStore;
