//! Console sink
//!
//! Debug sink that prints every event to stdout. Not meant for
//! production throughput; handy when bringing up a new source.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use sluice_core::{Event, Result, Sink, Status, StatusCell};

/// Sink that prints events to stdout
#[derive(Default)]
pub struct ConsoleSink {
    status: StatusCell,
    events: AtomicU64,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events printed so far
    pub fn events_received(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Sink for ConsoleSink {
    async fn open(&self) -> Result<()> {
        self.status.set(Status::Opening);
        self.status.set(Status::Flowing);
        Ok(())
    }

    async fn append(&self, event: Event) -> Result<()> {
        let n = self.events.fetch_add(1, Ordering::Relaxed);
        println!(
            "[{}] #{} ({} bytes) {}",
            event.kind(),
            n,
            event.body().len(),
            String::from_utf8_lossy(event.body()),
        );
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.status.set(Status::Closing);
        self.status.set(Status::Closed);
        Ok(())
    }

    fn status(&self) -> Status {
        self.status.get()
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod console_test;
