//! Transaction manager
//!
//! Shared durability ledger: a registry of open transactions plus the
//! root of the local write-ahead directory. One instance is shared by
//! every durable sink in the process; it is dependency-injected rather
//! than looked up ambiently so tests can substitute their own.
//!
//! Registration, commit and rollback are safe under concurrent access
//! from multiple durable sinks; each transaction is logically owned by
//! exactly one sink for its lifetime.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use sluice_core::Event;

use crate::transaction::Transaction;

/// Bookkeeping for one open transaction
#[derive(Debug, Clone)]
struct TxRecord {
    bucket: String,
    event_kind: String,
    start_time: DateTime<Utc>,
}

/// Process-wide write-ahead ledger
pub struct TransactionManager {
    wal_dir: PathBuf,
    active: DashMap<String, TxRecord>,
}

impl TransactionManager {
    /// Create a manager rooted at the given write-ahead directory
    ///
    /// The directory is created if missing. Call [`Self::recover`]
    /// before normal operation to enumerate buffers left over from a
    /// prior process lifetime.
    pub fn new(wal_dir: impl Into<PathBuf>) -> io::Result<Arc<Self>> {
        let wal_dir = wal_dir.into();
        fs::create_dir_all(&wal_dir)?;
        info!(wal_dir = %wal_dir.display(), "transaction manager ready");
        Ok(Arc::new(Self {
            wal_dir,
            active: DashMap::new(),
        }))
    }

    /// Root of the local write-ahead directory
    pub fn wal_dir(&self) -> &Path {
        &self.wal_dir
    }

    /// Path of the local buffer for a transaction id
    pub fn buffer_path(&self, id: &str, file_ext: &str) -> PathBuf {
        self.wal_dir.join(format!("{}{}", id, file_ext))
    }

    /// Begin a new transaction and register it
    pub fn begin(self: &Arc<Self>, event_kind: &str, bucket: &str, file_ext: &str) -> Transaction {
        let tx = Transaction::new(Arc::clone(self), event_kind, bucket, file_ext);
        self.active.insert(
            tx.id().to_string(),
            TxRecord {
                bucket: bucket.to_string(),
                event_kind: event_kind.to_string(),
                start_time: tx.start_time(),
            },
        );
        debug!(tx = %tx.id(), bucket = %bucket, "transaction started");
        tx
    }

    /// Number of currently open transactions
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Check whether an id is registered as open
    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    /// Finalize a committed transaction: drop bookkeeping and release
    /// the local buffer
    pub(crate) fn commit_tx(&self, id: &str, file_ext: &str) {
        match self.active.remove(id) {
            Some((_, rec)) => {
                let held = Utc::now() - rec.start_time;
                debug!(tx = %id, bucket = %rec.bucket, kind = %rec.event_kind,
                    held_ms = held.num_milliseconds(), "transaction committed");
            }
            None => warn!(tx = %id, "commit for unregistered transaction"),
        }
        self.delete_buffer(id, file_ext);
    }

    /// Discard a rolled-back transaction's buffer
    ///
    /// Its content is considered lost at this layer; redelivery, if
    /// any, is the upstream source's acknowledgment contract.
    pub(crate) fn rollback_tx(&self, id: &str, file_ext: &str) {
        match self.active.remove(id) {
            Some((_, rec)) => {
                info!(tx = %id, bucket = %rec.bucket, kind = %rec.event_kind,
                    "transaction rolled back, buffered data discarded");
            }
            None => warn!(tx = %id, "rollback for unregistered transaction"),
        }
        self.delete_buffer(id, file_ext);
    }

    /// Delete a local buffer file
    ///
    /// Deletion failure never reverses a finalized transaction; it is
    /// reported as a leaked file for out-of-band cleanup.
    fn delete_buffer(&self, id: &str, file_ext: &str) {
        let path = self.buffer_path(id, file_ext);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(tx = %id, path = %path.display(), error = %e,
                    "leaked write-ahead buffer, clean up out of band");
            }
        }
    }

    /// Enumerate buffer files left over from a prior process lifetime
    ///
    /// Called on startup, before normal operation, so the caller can
    /// replay or discard each buffer. Buffers belonging to currently
    /// open transactions are skipped.
    pub fn recover(&self) -> io::Result<Vec<RecoveredBuffer>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.wal_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let (id, extension) = split_buffer_name(&name);
            if self.is_active(&id) {
                continue;
            }
            found.push(RecoveredBuffer {
                id,
                extension,
                path: entry.path(),
            });
        }
        found.sort_by(|a, b| a.id.cmp(&b.id));
        if !found.is_empty() {
            info!(count = found.len(), "found leftover write-ahead buffers");
        }
        Ok(found)
    }
}

/// Split a buffer file name into transaction id and extension
///
/// Ids contain exactly one dot (the tiebreaker separator), so the
/// extension starts at the second dot if present.
fn split_buffer_name(name: &str) -> (String, String) {
    let mut dots = name.match_indices('.').map(|(i, _)| i);
    let _first = dots.next();
    match dots.next() {
        Some(second) => (name[..second].to_string(), name[second..].to_string()),
        None => (name.to_string(), String::new()),
    }
}

/// A write-ahead buffer left behind by a prior process lifetime
#[derive(Debug, Clone)]
pub struct RecoveredBuffer {
    /// Transaction id the buffer belonged to
    pub id: String,

    /// Buffer file extension (including the leading dot), if any
    pub extension: String,

    /// Location of the buffer file
    pub path: PathBuf,
}

impl RecoveredBuffer {
    /// Decode the buffered event frames for replay
    pub fn read_events(&self) -> sluice_core::Result<Vec<Event>> {
        let mut bytes = Bytes::from(fs::read(&self.path)?);
        let mut events = Vec::new();
        while let Some(event) = Event::decode(&mut bytes)? {
            events.push(event);
        }
        Ok(events)
    }

    /// Discard the buffer without replaying it
    pub fn discard(self) -> io::Result<()> {
        fs::remove_file(&self.path)
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;
