//! One-time demo data seeding.
//!
//! # Responsibility
//! - Populate a fresh installation with the synthetic patient set.
//! - Persist the "seed attempted" marker so seeding never runs twice.
//!
//! # Invariants
//! - State moves `NotAttempted -> Seeding -> Attempted`; there is no way back.
//! - Seeders sharing a `StoreContext` never overlap: the marker check and the
//!   writes run under the context's seed lock.
//! - The marker is set after all writes were attempted, even when some failed.
//!   Partial seeding is reported, never retried.
//! - Seeded keys strictly decrease in emission order, so the first synthetic
//!   record is the most recent one.

use crate::error::{StoreError, StoreResult};
use crate::model::key::RecordKey;
use crate::model::record::PatientRecord;
use crate::repo::marker_repo::{marker_is_set, set_marker, DEMO_SEED_ATTEMPTED};
use crate::service::demo_data::{placeholder_image, synthetic_patients};
use crate::service::record_store::RecordStore;
use chrono::{Duration, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Gap between consecutive seeded record timestamps.
const DEFAULT_SPACING_MINUTES: i64 = 60;

/// One or more synthetic writes failed during a seed run.
///
/// Non-fatal: the marker is still set.
#[derive(Debug)]
pub struct SeedFailure {
    pub attempted: usize,
    pub failures: Vec<(RecordKey, StoreError)>,
}

impl Display for SeedFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} demo records failed to save",
            self.failures.len(),
            self.attempted
        )
    }
}

impl Error for SeedFailure {}

/// Result of [`DemoSeeder::seed_if_needed`].
#[derive(Debug)]
pub enum SeedOutcome {
    /// Marker was already set; nothing was written.
    AlreadyAttempted,
    /// Every synthetic record was written.
    Seeded { written: usize },
    /// Some writes failed; the marker was set anyway.
    Partial { written: usize, failure: SeedFailure },
}

impl SeedOutcome {
    pub fn written(&self) -> usize {
        match self {
            Self::AlreadyAttempted => 0,
            Self::Seeded { written } | Self::Partial { written, .. } => *written,
        }
    }
}

/// Seeds the record store with synthetic patients on first run.
#[derive(Clone)]
pub struct DemoSeeder {
    store: RecordStore,
    records: Arc<Vec<PatientRecord>>,
    spacing: Duration,
}

impl DemoSeeder {
    /// Seeder over the built-in synthetic patient set.
    pub fn new(store: RecordStore) -> Self {
        Self::with_records(store, synthetic_patients())
    }

    /// Seeder over a caller-provided record set.
    pub fn with_records(store: RecordStore, records: Vec<PatientRecord>) -> Self {
        Self {
            store,
            records: Arc::new(records),
            spacing: Duration::minutes(DEFAULT_SPACING_MINUTES),
        }
    }

    /// Overrides the gap between seeded timestamps. Non-positive gaps are ignored.
    pub fn with_spacing(mut self, spacing: Duration) -> Self {
        if spacing > Duration::zero() {
            self.spacing = spacing;
        }
        self
    }

    /// Seeds once per installation.
    ///
    /// # Errors
    /// - Returns the store error when the marker cannot be read (nothing is
    ///   written) or cannot be set after the writes.
    /// - Individual write failures are reported in `SeedOutcome::Partial`.
    pub async fn seed_if_needed(&self) -> StoreResult<SeedOutcome> {
        let context = self.store.context();
        let _running = context.seed_guard().await;

        let attempted = context
            .run_blocking(|conn| marker_is_set(conn, DEMO_SEED_ATTEMPTED).map_err(StoreError::from))
            .await?;
        if attempted {
            return Ok(SeedOutcome::AlreadyAttempted);
        }

        info!(
            "event=demo_seed module=seed status=start count={}",
            self.records.len()
        );
        let now = Utc::now();
        let mut written = 0;
        let mut failures = Vec::new();

        for (index, template) in self.records.iter().enumerate() {
            let key = RecordKey::from_timestamp(now - self.spacing * stagger_factor(index));
            match self.seed_one(template, key.clone()).await {
                Ok(()) => written += 1,
                Err(err) => {
                    warn!(
                        "event=demo_seed_record module=seed status=error key={} error_code={} error={}",
                        key,
                        err.code(),
                        err
                    );
                    failures.push((key, err));
                }
            }
        }

        context
            .run_blocking(|conn| set_marker(conn, DEMO_SEED_ATTEMPTED).map_err(StoreError::from))
            .await?;

        if failures.is_empty() {
            info!("event=demo_seed module=seed status=ok written={written}");
            return Ok(SeedOutcome::Seeded { written });
        }

        let failure = SeedFailure {
            attempted: self.records.len(),
            failures,
        };
        warn!(
            "event=demo_seed module=seed status=partial written={} failed={}",
            written,
            failure.failures.len()
        );
        Ok(SeedOutcome::Partial { written, failure })
    }

    async fn seed_one(&self, template: &PatientRecord, key: RecordKey) -> StoreResult<()> {
        let attachment = placeholder_image(
            &template.display_name(),
            &template.personal_information.medical_record_number,
        )
        .map_err(|_| StoreError::AttachmentMissing(Some(key.clone())))?;

        let mut record = template.clone();
        record.key = Some(key);
        self.store.put(record, Some(attachment)).await.map(|_| ())
    }
}

fn stagger_factor(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{DemoSeeder, SeedOutcome};
    use crate::db::StoreContext;
    use crate::service::record_store::RecordStore;

    #[tokio::test]
    async fn seeded_keys_decrease_in_emission_order() {
        let store = RecordStore::new(StoreContext::in_memory());
        let seeder = DemoSeeder::new(store.clone());

        let outcome = seeder.seed_if_needed().await.unwrap();
        assert!(matches!(outcome, SeedOutcome::Seeded { written: 20 }));

        let mut stored = store.list_all().await.unwrap();
        stored.sort_by(|a, b| {
            a.record.personal_information.medical_record_number
                .cmp(&b.record.personal_information.medical_record_number)
        });
        let stamps = stored
            .iter()
            .map(|s| s.key().and_then(|key| key.timestamp()).unwrap())
            .collect::<Vec<_>>();
        assert!(stamps.windows(2).all(|pair| pair[0] > pair[1]));
    }
}
