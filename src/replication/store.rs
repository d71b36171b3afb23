// src/replication/store.rs
// Document-store boundary for decoded tally records. The node only ever
// needs "open at startup" and "insert many per replication event"; the
// store's query surface stays on the other side of this trait.

use crate::replication::record::CandidateTally;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store write failed: {0}")]
    Write(#[from] std::io::Error),
    #[error("store encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait ReplicationSink: Send + Sync {
    /// Unconditional multi-insert. An empty batch is a valid no-op.
    /// A failed batch is reported to the caller; it is never retried here.
    async fn insert_many(&self, records: &[CandidateTally]) -> Result<(), StoreError>;
}

/// Append-only JSON-lines document store, one document per tally record.
pub struct JsonlStore {
    path: PathBuf,
    writer: Mutex<fs::File>,
}

impl JsonlStore {
    /// Open (create if absent) the store behind `uri`. Accepts a plain path
    /// or a `file://` URI. Failure here is a startup-fatal condition for the
    /// process; the caller decides whether to retry or abort.
    pub async fn open(uri: &str) -> std::io::Result<Self> {
        let path = PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri));
        if let Some(parent) = path.parent() {
            if parent != Path::new("") {
                fs::create_dir_all(parent).await?;
            }
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReplicationSink for JsonlStore {
    async fn insert_many(&self, records: &[CandidateTally]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut guard = self.writer.lock().await;
        for rec in records {
            let json = serde_json::to_string(rec)?;
            guard.write_all(json.as_bytes()).await?;
            guard.write_all(b"\n").await?;
        }
        guard.flush().await?;
        Ok(())
    }
}

/// In-memory sink recording every batch it receives. Used by integration
/// tests to observe call counts and delivered payloads.
pub struct MemorySink {
    batches: Mutex<Vec<Vec<CandidateTally>>>,
    fail_writes: bool,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            fail_writes: false,
        }
    }

    /// A sink whose every write fails, for exercising the error path.
    pub fn failing() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            fail_writes: true,
        }
    }

    pub async fn batches(&self) -> Vec<Vec<CandidateTally>> {
        self.batches.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.batches.lock().await.len()
    }
}

#[async_trait]
impl ReplicationSink for MemorySink {
    async fn insert_many(&self, records: &[CandidateTally]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write(std::io::Error::other(
                "simulated write failure",
            )));
        }
        if records.is_empty() {
            return Ok(());
        }
        self.batches.lock().await.push(records.to_vec());
        Ok(())
    }
}
