//! Explicit store initialization context.
//!
//! # Responsibility
//! - Own the single shared SQLite connection for the process lifetime.
//! - Run connection bootstrap and migrations once, as an explicit startup step.
//! - Move blocking SQLite work off async callers.
//!
//! # Invariants
//! - At most one connection is opened per context, however many clones exist.
//! - A failed open is not cached; the next call retries and reports
//!   `StorageUnavailable` until an open succeeds.
//! - Callers never close the connection; it lives until the last clone drops.
//! - One demo seed run at a time per context, across every seeder built on it.

use crate::config::CoreConfig;
use crate::db::{open_db, open_db_in_memory};
use crate::error::{StoreError, StoreResult};
use log::{info, warn};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard, OnceCell};

type SharedConnection = Arc<Mutex<Connection>>;

#[derive(Debug, Clone)]
enum DbLocation {
    File(PathBuf),
    Memory,
}

struct ContextInner {
    location: DbLocation,
    conn: OnceCell<SharedConnection>,
    seed_lock: AsyncMutex<()>,
}

/// Cloneable handle to the process-wide store connection.
///
/// Construction performs no IO. Call [`StoreContext::init`] at startup to open
/// and migrate the database; operations issued before that open it lazily.
#[derive(Clone)]
pub struct StoreContext {
    inner: Arc<ContextInner>,
}

impl StoreContext {
    pub fn new(config: &CoreConfig) -> Self {
        Self::with_location(DbLocation::File(config.db_path.clone()))
    }

    /// Context over a private in-memory database; contents vanish on drop.
    pub fn in_memory() -> Self {
        Self::with_location(DbLocation::Memory)
    }

    fn with_location(location: DbLocation) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                location,
                conn: OnceCell::new(),
                seed_lock: AsyncMutex::new(()),
            }),
        }
    }

    /// Opens the database and applies schema migrations.
    ///
    /// Idempotent once it has succeeded.
    ///
    /// # Errors
    /// - `StorageUnavailable` when the file cannot be created/opened, the schema
    ///   is newer than supported, or migration fails.
    pub async fn init(&self) -> StoreResult<()> {
        self.connection().await.map(|_| ())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.conn.initialized()
    }

    /// Serializes demo seed runs sharing this context.
    pub(crate) async fn seed_guard(&self) -> AsyncMutexGuard<'_, ()> {
        self.inner.seed_lock.lock().await
    }

    async fn connection(&self) -> StoreResult<SharedConnection> {
        let conn = self
            .inner
            .conn
            .get_or_try_init(|| open_shared(self.inner.location.clone()))
            .await?;
        Ok(Arc::clone(conn))
    }

    /// Runs one unit of SQLite work on a blocking thread.
    ///
    /// The caller suspends until the storage engine acknowledges completion or
    /// failure. Dropping the returned future does not abort the work.
    pub(crate) async fn run_blocking<T, F>(&self, operation: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = self.connection().await?;
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| {
                StoreError::StorageUnavailable("database mutex poisoned".to_string())
            })?;
            operation(&mut guard)
        })
        .await
        .map_err(|err| StoreError::TransactionAborted(format!("storage task failed: {err}")))?
    }
}

async fn open_shared(location: DbLocation) -> StoreResult<SharedConnection> {
    let opened = tokio::task::spawn_blocking(move || match location {
        DbLocation::File(path) => open_db(path),
        DbLocation::Memory => open_db_in_memory(),
    })
    .await
    .map_err(|err| StoreError::StorageUnavailable(format!("storage open task failed: {err}")))?;

    match opened {
        Ok(conn) => {
            info!("event=store_init module=store status=ok");
            Ok(Arc::new(Mutex::new(conn)))
        }
        Err(err) => {
            warn!(
                "event=store_init module=store status=error error_code=storage_unavailable error={}",
                err
            );
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StoreContext;
    use crate::config::CoreConfig;
    use crate::error::StoreError;

    #[tokio::test]
    async fn init_is_idempotent_and_shared_across_clones() {
        let context = StoreContext::in_memory();
        assert!(!context.is_initialized());

        context.init().await.unwrap();
        let clone = context.clone();
        clone.init().await.unwrap();
        assert!(context.is_initialized());

        context
            .run_blocking(|conn| {
                conn.execute_batch("INSERT INTO app_markers (name, value, set_at) VALUES ('probe', 'true', 'now');")
                    .map_err(|err| StoreError::TransactionAborted(err.to_string()))
            })
            .await
            .unwrap();
        let seen: i64 = clone
            .run_blocking(|conn| {
                conn.query_row("SELECT COUNT(*) FROM app_markers;", [], |row| row.get(0))
                    .map_err(|err| StoreError::TransactionAborted(err.to_string()))
            })
            .await
            .unwrap();
        assert_eq!(seen, 1);
    }

    #[tokio::test]
    async fn failed_open_is_retried_on_next_call() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let context = StoreContext::new(&CoreConfig::new(blocker.join("chartdesk.sqlite3")));

        let err = context.init().await.unwrap_err();
        assert!(matches!(err, StoreError::StorageUnavailable(_)));
        let err = context.init().await.unwrap_err();
        assert!(matches!(err, StoreError::StorageUnavailable(_)));
        assert!(!context.is_initialized());

        std::fs::remove_file(&blocker).unwrap();
        context.init().await.unwrap();
        assert!(context.is_initialized());
    }
}
