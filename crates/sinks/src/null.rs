//! Null sink - counts and discards all events
//!
//! Useful for benchmarking the pipeline without I/O overhead and as a
//! terminal stage while validating a pipeline description.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use sluice_core::{Event, Result, Sink, Status, StatusCell};

/// Sink that discards every event it receives
#[derive(Default)]
pub struct NullSink {
    status: StatusCell,
    events: AtomicU64,
    bytes: AtomicU64,
}

impl NullSink {
    /// Create a new null sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Events discarded so far
    pub fn events_received(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }

    /// Payload bytes discarded so far
    pub fn bytes_received(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Sink for NullSink {
    async fn open(&self) -> Result<()> {
        self.status.set(Status::Opening);
        self.status.set(Status::Flowing);
        Ok(())
    }

    async fn append(&self, event: Event) -> Result<()> {
        self.events.fetch_add(1, Ordering::Relaxed);
        self.bytes
            .fetch_add(event.body().len() as u64, Ordering::Relaxed);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.status.set(Status::Closing);
        info!(
            events = self.events_received(),
            bytes = self.bytes_received(),
            "null sink closed"
        );
        self.status.set(Status::Closed);
        Ok(())
    }

    fn status(&self) -> Status {
        self.status.get()
    }
}

#[cfg(test)]
#[path = "null_test.rs"]
mod null_test;
