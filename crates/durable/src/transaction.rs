//! Write-ahead transactions
//!
//! A [`Transaction`] represents one unit of write-ahead-buffered,
//! not-yet-acknowledged data. Its identifier is formatted so that
//! lexicographic and chronological sorting are identical, even for
//! transactions created within the same millisecond:
//!
//! ```text
//! yyyyMMdd-HHmmssSSS+zzzz.nnnnnnnnnnnn
//! ```
//!
//! where the trailing component is a strictly monotonic
//! nanosecond-resolution tiebreaker.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::manager::TransactionManager;

/// Timestamp layout for transaction ids, millisecond precision
const ID_TIME_FORMAT: &str = "%Y%m%d-%H%M%S%3f%z";

/// Strictly increasing nanosecond counter
///
/// Seeded from a monotonic clock so the tiebreaker tracks real time,
/// bumped by at least one on every call so two transactions created in
/// the same nanosecond still order correctly.
fn next_nano() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    static LAST: AtomicU64 = AtomicU64::new(0);

    let now = START.get_or_init(Instant::now).elapsed().as_nanos() as u64;
    let mut prev = LAST.load(Ordering::Relaxed);
    loop {
        let next = prev.max(now) + 1;
        match LAST.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => prev = observed,
        }
    }
}

/// Create a unique, sortable transaction id
pub(crate) fn generate_id(now: DateTime<Utc>) -> String {
    format!("{}.{:012}", now.format(ID_TIME_FORMAT), next_nano())
}

/// One unit of write-ahead-buffered work between creation and
/// commit/rollback
///
/// Created by [`TransactionManager::begin`]. Either `commit` or
/// `rollback` is terminal: the transaction is never reopened or
/// reused, and calling the other operation afterward changes nothing.
pub struct Transaction {
    id: String,
    bucket: String,
    file_ext: String,
    event_kind: String,
    start_time: DateTime<Utc>,
    open: bool,
    manager: Arc<TransactionManager>,
}

impl Transaction {
    pub(crate) fn new(
        manager: Arc<TransactionManager>,
        event_kind: &str,
        bucket: &str,
        file_ext: &str,
    ) -> Self {
        let start_time = Utc::now();
        Self {
            id: generate_id(start_time),
            bucket: bucket.to_string(),
            file_ext: file_ext.to_string(),
            event_kind: event_kind.to_string(),
            start_time,
            open: true,
            manager,
        }
    }

    /// Unique, sortable identifier; also the local buffer file stem
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Destination bucket path this transaction is headed for
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// File extension of the local buffer
    pub fn file_ext(&self) -> &str {
        &self.file_ext
    }

    /// Concrete event kind carried by this transaction
    pub fn event_kind(&self) -> &str {
        &self.event_kind
    }

    /// Time this transaction was started
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// True if neither `commit` nor `rollback` has been called
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Path of the local write-ahead buffer for this transaction
    pub fn buffer_path(&self) -> PathBuf {
        self.manager.buffer_path(&self.id, &self.file_ext)
    }

    /// Finalize the transaction after its data is durably placed
    /// downstream; releases the local buffer
    pub fn commit(&mut self) {
        if !self.open {
            debug!(tx = %self.id, "commit on finalized transaction ignored");
            return;
        }
        self.open = false;
        self.manager.commit_tx(&self.id, &self.file_ext);
    }

    /// Abandon the transaction; the local buffer is discarded and its
    /// content is not redelivered by this layer
    pub fn rollback(&mut self) {
        if !self.open {
            debug!(tx = %self.id, "rollback on finalized transaction ignored");
            return;
        }
        self.open = false;
        self.manager.rollback_tx(&self.id, &self.file_ext);
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
#[path = "transaction_test.rs"]
mod transaction_test;
