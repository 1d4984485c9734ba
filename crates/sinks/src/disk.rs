//! Durable disk sink
//!
//! Terminal sink that write-ahead-buffers every accepted event under
//! the transaction manager's local directory, then promotes the buffer
//! to its destination bucket on close:
//!
//! ```text
//! open()    begin transaction, create <wal>/<tx-id>.evt
//! append()  encode frame, write to the local buffer
//! close()   flush + fsync, copy buffer to <bucket>.evt, commit
//! ```
//!
//! Only a successful promotion commits; a flush or copy failure rolls
//! the transaction back and the error propagates to the caller. The
//! destination path comes from a chrono-token template, so a rolling
//! decorator upstream yields one dated output file per rotation.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::BytesMut;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use sluice_core::{
    expand_bucket_template, Bucketed, Event, Result, Sink, StageError, Status, StatusCell,
};
use sluice_durable::{Transaction, TransactionManager};
use sluice_pipeline::PipelineError;

/// Suffix shared by local buffers and promoted destination files
const FILE_EXT: &str = ".evt";

/// Per-open-cycle state; replaced wholesale on each open
struct OpenState {
    tx: Transaction,
    writer: BufWriter<File>,
    events: u64,
}

/// Terminal sink writing framed events to bucketed files
pub struct DiskSink {
    template: String,
    event_kind: String,
    manager: Arc<TransactionManager>,
    status: StatusCell,
    state: Mutex<Option<OpenState>>,
}

impl DiskSink {
    /// Create a disk sink targeting a chrono-token path template
    pub fn new(
        template: impl Into<String>,
        event_kind: impl Into<String>,
        manager: Arc<TransactionManager>,
    ) -> Self {
        Self {
            template: template.into(),
            event_kind: event_kind.into(),
            manager,
            status: StatusCell::new(),
            state: Mutex::new(None),
        }
    }

    /// Create from pipeline-description arguments
    ///
    /// `args[0]` is the destination path template (required); `args[1]`
    /// optionally overrides the event kind recorded on transactions.
    pub fn from_args(
        args: &[String],
        manager: Arc<TransactionManager>,
    ) -> sluice_pipeline::Result<Self> {
        let template = args
            .first()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PipelineError::build("disk", "requires a destination path template"))?;
        let event_kind = args.get(1).map(String::as_str).unwrap_or("event");
        Ok(Self::new(template, event_kind, manager))
    }

    /// Events written during the current open cycle
    pub fn events_buffered(&self) -> u64 {
        self.state.lock().as_ref().map_or(0, |s| s.events)
    }
}

impl Bucketed for DiskSink {
    fn file_ext(&self) -> &'static str {
        FILE_EXT
    }

    fn next_bucket(&self) -> String {
        expand_bucket_template(&self.template)
    }
}

#[async_trait]
impl Sink for DiskSink {
    /// Begin a transaction and create its local write-ahead buffer
    async fn open(&self) -> Result<()> {
        self.status.set(Status::Opening);

        let bucket = self.next_bucket();
        let mut tx = self.manager.begin(&self.event_kind, &bucket, FILE_EXT);
        let file = match File::create(tx.buffer_path()) {
            Ok(file) => file,
            Err(e) => {
                tx.rollback();
                self.status.set(Status::Error);
                return Err(StageError::Io(e));
            }
        };
        debug!(tx = %tx.id(), bucket = %bucket, "write-ahead buffer opened");

        *self.state.lock() = Some(OpenState {
            tx,
            writer: BufWriter::new(file),
            events: 0,
        });
        self.status.set(Status::Flowing);
        Ok(())
    }

    /// Frame the event and write it to the local buffer
    async fn append(&self, event: Event) -> Result<()> {
        let mut guard = self.state.lock();
        let state = guard
            .as_mut()
            .ok_or(StageError::NotFlowing(self.status.get()))?;

        let mut frame = BytesMut::with_capacity(event.frame_len());
        event.encode(&mut frame);
        state.writer.write_all(&frame)?;
        state.events += 1;
        Ok(())
    }

    /// Flush the buffer, promote it to the destination bucket, commit
    ///
    /// Any failure between flush and promotion rolls the transaction
    /// back; the buffered data is discarded at this layer.
    async fn close(&self) -> Result<()> {
        self.status.set(Status::Closing);

        let state = self.state.lock().take();
        let Some(OpenState {
            mut tx,
            mut writer,
            events,
        }) = state
        else {
            self.status.set(Status::Closed);
            return Ok(());
        };

        let finalized = flush_and_sync(&mut writer).and_then(|_| {
            let dest = format!("{}{}", tx.bucket(), FILE_EXT);
            promote(&tx.buffer_path(), Path::new(&dest)).map(|_| dest)
        });
        drop(writer);

        match finalized {
            Ok(dest) => {
                tx.commit();
                info!(events, dest = %dest, "buffer promoted to destination");
                self.status.set(Status::Closed);
                Ok(())
            }
            Err(e) => {
                warn!(tx = %tx.id(), error = %e, "buffer promotion failed, rolling back");
                tx.rollback();
                self.status.set(Status::Error);
                Err(StageError::Io(e))
            }
        }
    }

    fn status(&self) -> Status {
        self.status.get()
    }
}

fn flush_and_sync(writer: &mut BufWriter<File>) -> io::Result<()> {
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Copy the finished buffer to its destination, creating parents
fn promote(buffer: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::copy(buffer, dest)?;
    Ok(())
}

#[cfg(test)]
#[path = "disk_test.rs"]
mod disk_test;
