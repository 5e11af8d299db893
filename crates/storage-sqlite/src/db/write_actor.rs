//! Single-writer actor for SQLite mutations.
//!
//! All writes funnel through one dedicated OS thread holding at most one
//! connection at a time. Each submitted job runs inside an immediate
//! transaction, so a reconciliation plan applies atomically or not at all.

use std::sync::Arc;

use diesel::SqliteConnection;
use log::warn;
use tokio::sync::{mpsc, oneshot};

use leadmirror_core::errors::DatabaseError;
use leadmirror_core::{Error, Result};

use crate::errors::StorageError;

use super::DbPool;

type WriteJob = Box<dyn FnOnce(&DbPool) + Send>;

/// Distinguishes a domain failure inside a transaction closure from a
/// diesel-level failure, which diesel's transaction API must be able to
/// produce itself.
enum TxFailure {
    Domain(Error),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxFailure {
    fn from(err: diesel::result::Error) -> Self {
        Self::Diesel(err)
    }
}

/// Cloneable handle submitting write jobs to the actor thread.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::UnboundedSender<WriteJob>,
}

impl WriteHandle {
    /// Run a closure on the writer thread inside an immediate transaction.
    /// An `Err` return rolls the transaction back.
    pub async fn exec<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let wrapped: WriteJob = Box::new(move |pool: &DbPool| {
            let result = run_in_transaction(pool, job);
            let _ = reply_tx.send(result);
        });

        self.tx.send(wrapped).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Write actor is no longer running".to_string(),
            ))
        })?;

        reply_rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Write actor dropped the reply".to_string(),
            ))
        })?
    }
}

fn run_in_transaction<T, F>(pool: &DbPool, job: F) -> Result<T>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T>,
{
    let mut conn = pool.get().map_err(StorageError::from)?;
    conn.immediate_transaction(|conn| job(conn).map_err(TxFailure::Domain))
        .map_err(|failure| match failure {
            TxFailure::Domain(err) => err,
            TxFailure::Diesel(err) => StorageError::from(err).into(),
        })
}

/// Start the writer thread and return its handle.
pub fn spawn_writer(pool: Arc<DbPool>) -> WriteHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<WriteJob>();

    let spawned = std::thread::Builder::new()
        .name("sqlite-writer".to_string())
        .spawn(move || {
            while let Some(job) = rx.blocking_recv() {
                job(&pool);
            }
        });
    if let Err(err) = spawned {
        warn!("Failed to spawn sqlite writer thread: {err}");
    }

    WriteHandle { tx }
}
