//! Source/Sink capability contracts
//!
//! The polymorphic interface every pipeline stage implements. Methods
//! take `&self`: stages are driven concurrently (appends from the
//! upstream task, close from a rotation or closer task), so mutable
//! state lives behind interior mutability the same way the disk sinks
//! handle it.

use async_trait::async_trait;

use crate::{Event, Result, Status};

/// A pipeline stage that consumes events
///
/// A sink either stores the event (terminal) or forwards it to its
/// downstream sink. Decorators obtain their downstream from the
/// residual factory handed to them at construction.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Prepare resources that must not yet be live
    ///
    /// Anything long-lived or blocking belongs in [`Sink::open`].
    fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Acquire resources and transition to `Flowing`
    async fn open(&self) -> Result<()>;

    /// Consume one event
    ///
    /// Must only be called while the status is `Flowing`; violating
    /// this is a caller bug, not a recoverable condition.
    async fn append(&self, event: Event) -> Result<()>;

    /// Release all resources, even from the `Error` state
    async fn close(&self) -> Result<()>;

    /// Current lifecycle state
    fn status(&self) -> Status;
}

/// A pipeline stage that originates events
///
/// Sources are responsible for building and opening their sink chain
/// as part of `open()`, via the factory injected at construction.
#[async_trait]
pub trait Source: Send + Sync {
    /// Prepare resources that must not yet be live
    ///
    /// E.g. bind a listening socket without accepting; accepting
    /// belongs in [`Source::open`].
    fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Start producing events
    async fn open(&self) -> Result<()>;

    /// Stop producing and release resources
    async fn close(&self) -> Result<()>;

    /// Current lifecycle state
    fn status(&self) -> Status;

    /// Concrete event kind this source emits
    ///
    /// Terminal sinks use this to choose a compatible serialization.
    fn event_kind(&self) -> &str;
}

/// Contract for destination-format writers that target bucket paths
///
/// A bucketed sink writes complete output units to a templated path.
/// The rotation and transaction layers only need the suffix it wants
/// appended and the next path it will target; the byte layout of the
/// output unit is the writer's own business.
pub trait Bucketed {
    /// File suffix appended to a generated bucket path (e.g. `.bin`)
    fn file_ext(&self) -> &'static str;

    /// Compute the next bucket path this writer will target
    ///
    /// Templates may carry chrono time tokens (`%Y`, `%H`, ...) which
    /// are expanded against the current wall clock.
    fn next_bucket(&self) -> String;
}

/// Expand chrono time tokens in a bucket path template
pub fn expand_bucket_template(template: &str) -> String {
    chrono::Local::now().format(template).to_string()
}
