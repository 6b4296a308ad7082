//! Income ledger collaborator and a file-backed implementation.
//!
//! The core only ever asks `income_exists(txid)`; recording belongs to the
//! caller. [`FileLedger`] exists for the CLI, which has no database.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ledger file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the caller's record of processed deposits.
#[async_trait]
pub trait IncomeLedger: Send + Sync {
    async fn income_exists(&self, txid: &str) -> Result<bool, LedgerError>;
}

#[async_trait]
impl<F> IncomeLedger for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn income_exists(&self, txid: &str) -> Result<bool, LedgerError> {
        Ok(self(txid))
    }
}

/// A deposit the caller has already credited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedIncome {
    pub tag: String,
    /// Seconds since epoch.
    pub recorded_at: u64,
}

/// Thread-safe txid set persisted as JSON.
#[derive(Debug, Clone, Default)]
pub struct FileLedger {
    inner: Arc<DashMap<String, RecordedIncome>>,
    path: Option<PathBuf>,
}

impl FileLedger {
    /// In-memory ledger that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let ledger = Self {
            inner: Arc::new(DashMap::new()),
            path: Some(path.clone()),
        };

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let map: HashMap<String, RecordedIncome> = serde_json::from_reader(reader)?;
            for (txid, entry) in map {
                ledger.inner.insert(txid, entry);
            }
            tracing::info!(path = %path.display(), entries = ledger.inner.len(), "Loaded income ledger");
        }
        Ok(ledger)
    }

    /// Mark `txid` as credited to `tag`. Returns false if it was already recorded.
    pub fn record(&self, txid: &str, tag: &str) -> bool {
        let recorded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        match self.inner.entry(txid.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(RecordedIncome {
                    tag: tag.to_string(),
                    recorded_at,
                });
                true
            }
        }
    }

    pub fn get(&self, txid: &str) -> Option<RecordedIncome> {
        self.inner.get(txid).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Write all entries to the backing file, if any.
    pub fn save(&self) -> Result<(), LedgerError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let map: HashMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &map)?;
        tracing::debug!(path = %path.display(), entries = map.len(), "Saved income ledger");
        Ok(())
    }
}

#[async_trait]
impl IncomeLedger for FileLedger {
    async fn income_exists(&self, txid: &str) -> Result<bool, LedgerError> {
        Ok(self.inner.contains_key(txid))
    }
}
