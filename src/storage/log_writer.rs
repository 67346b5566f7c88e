//! Append-only JSON Lines writer.
//!
//! Every call serializes one record to a single compact line and writes it
//! while holding a writer-wide lock around open-write-flush. The file is
//! created if absent and never truncated, so any prefix of it is readable.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;

use crate::config::StorageConfig;

/// Errors that can occur while appending a record.
#[derive(Debug, Error)]
pub enum LogError {
    /// The sink could not be opened or written.
    #[error("log write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The blocking append task panicked or was cancelled.
    #[error("append task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Handle to an append-only log file.
///
/// Clones share the same lock, so all appends through one writer (and its
/// clones) are serialized.
#[derive(Clone)]
pub struct AppendLog {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    sync_on_write: bool,
    lock: Mutex<()>,
}

impl AppendLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_sync(path, false)
    }

    /// Create a writer that also fsyncs after every append when `sync_on_write` is set.
    pub fn with_sync(path: impl Into<PathBuf>, sync_on_write: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                sync_on_write,
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::with_sync(&config.log_path, config.sync_on_write)
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Append one record as a single line. Blocks on file I/O.
    pub fn append<T: Serialize>(&self, record: &T) -> Result<(), LogError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        // The guard protects no data, so a poisoned lock is still usable.
        let _guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)?;
        file.write_all(&line)?;
        file.flush()?;
        if self.inner.sync_on_write {
            file.sync_data()?;
        }
        Ok(())
    }

    /// Append from async code without blocking the runtime.
    pub async fn append_async<T>(&self, record: T) -> Result<(), LogError>
    where
        T: Serialize + Send + 'static,
    {
        let log = self.clone();
        tokio::task::spawn_blocking(move || log.append(&record)).await?
    }
}
