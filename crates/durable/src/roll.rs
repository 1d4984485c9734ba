//! Rotating sink
//!
//! A decorator sink that owns a single live downstream sink and
//! periodically replaces it with a freshly built one, retiring the old
//! one asynchronously once it has drained.
//!
//! # Rotation protocol
//!
//! ```text
//! [rotation task] build+open replacement
//!        |
//!        v
//!   ArcSwap(old -> new)      appends after the swap hit the new sink;
//!        |                   an append already in flight holds its own
//!        v                   Arc to the old sink and completes there
//!   grace delay (500ms)
//!        |
//!        v
//!   [closer task] old.close()   off the accept path
//! ```
//!
//! The swap-then-asynchronously-drain-and-close split is the point:
//! acceptance of new events never pauses for the old sink's close I/O,
//! while the old sink gets a bounded window to finish outstanding
//! writes.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sluice_core::{
    Event, Result, RollConfig, Sink, StageError, Status, StatusCell, DEFAULT_ROLL_INTERVAL_SECS,
};
use sluice_pipeline::SinkFactory;

/// Smallest alignment granularity for even boundaries, in ms
const MIN_BOUNDARY_MS: u64 = 30_000;

/// Window granted to in-flight appends against a retired sink before
/// its close task starts
const ROTATION_GRACE: Duration = Duration::from_millis(500);

/// Sized slot for the live downstream
///
/// `arc_swap` needs a sized pointee, so the trait object rides inside.
struct Downstream(Arc<dyn Sink>);

/// State shared between the sink facade, the rotation task and any
/// in-flight append
struct RollShared {
    interval: Duration,
    even_boundaries: bool,
    grace: Duration,
    factory: Arc<SinkFactory>,
    downstream: ArcSwapOption<Downstream>,
    status: StatusCell,
}

impl RollShared {
    /// Pin the current downstream for the duration of one call
    fn current(&self) -> Option<Arc<dyn Sink>> {
        self.downstream.load_full().map(|d| Arc::clone(&d.0))
    }

    fn swap_in(&self, sink: Arc<dyn Sink>) -> Option<Arc<dyn Sink>> {
        self.downstream
            .swap(Some(Arc::new(Downstream(sink))))
            .map(|d| Arc::clone(&d.0))
    }

    fn take(&self) -> Option<Arc<dyn Sink>> {
        self.downstream.swap(None).map(|d| Arc::clone(&d.0))
    }
}

/// Sink decorator that rolls its downstream on a wall-clock interval
pub struct RollSink {
    shared: Arc<RollShared>,
    cancel: CancellationToken,
    roll_task: Mutex<Option<JoinHandle<()>>>,
}

impl RollSink {
    /// Create a rolling sink over a downstream factory
    ///
    /// Even-boundary alignment only takes effect when the interval is
    /// a multiple of 30 seconds. A zero interval falls back to the
    /// default.
    pub fn new(interval: Duration, even_boundaries: bool, factory: Arc<SinkFactory>) -> Self {
        Self::with_options(interval, even_boundaries, ROTATION_GRACE, factory)
    }

    /// Create with an explicit drain grace window (tests rotate fast)
    pub fn with_options(
        interval: Duration,
        even_boundaries: bool,
        grace: Duration,
        factory: Arc<SinkFactory>,
    ) -> Self {
        // A zero interval would never bound output: it busy-rotates,
        // and with alignment it underflows the sleep calculation.
        let interval = if interval.is_zero() {
            warn!(
                default = DEFAULT_ROLL_INTERVAL_SECS,
                "zero roll interval, using default"
            );
            Duration::from_secs(DEFAULT_ROLL_INTERVAL_SECS)
        } else {
            interval
        };
        let interval_ms = interval.as_millis() as u64;
        Self {
            shared: Arc::new(RollShared {
                interval,
                even_boundaries: even_boundaries && interval_ms % MIN_BOUNDARY_MS == 0,
                grace,
                factory,
                downstream: ArcSwapOption::const_empty(),
                status: StatusCell::new(),
            }),
            cancel: CancellationToken::new(),
            roll_task: Mutex::new(None),
        }
    }

    /// Create from pipeline-description arguments
    ///
    /// `args[0]`, if present, is the interval in seconds; an
    /// unparseable value falls back to the default.
    pub fn from_args(args: &[String], config: &RollConfig, factory: Arc<SinkFactory>) -> Self {
        let secs = match args.first() {
            None => config.interval_secs,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(arg = %raw, default = config.interval_secs,
                    "unparseable roll interval, using default");
                config.interval_secs
            }),
        };
        Self::new(Duration::from_secs(secs), config.even_boundaries, factory)
    }

    /// Configured roll interval
    pub fn interval(&self) -> Duration {
        self.shared.interval
    }
}

#[async_trait]
impl Sink for RollSink {
    /// Build and open the initial downstream, then start the rotation
    /// task
    async fn open(&self) -> Result<()> {
        self.shared.status.set(Status::Opening);

        let sink = self.shared.factory.build_and_open().await.map_err(|e| {
            self.shared.status.set(Status::Error);
            StageError::open(e.to_string())
        })?;
        self.shared.swap_in(sink);

        // The rotation task gates on status; Flowing must be visible
        // before the spawn, or a task polled immediately on another
        // worker exits without ever rotating.
        self.shared.status.set(Status::Flowing);

        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        *self.roll_task.lock() = Some(tokio::spawn(rotation_loop(shared, cancel)));

        Ok(())
    }

    /// Forward to the current downstream
    ///
    /// The load pins the downstream for the duration of this call, so
    /// an append racing a swap still completes against the sink it
    /// started on.
    async fn append(&self, event: Event) -> Result<()> {
        let sink = self.shared.current().ok_or(StageError::NoDownstream)?;
        sink.append(event).await
    }

    /// Stop rotating, then close the current downstream synchronously
    ///
    /// The rotation task is cancelled and joined before the downstream
    /// is closed, so a rotation caught mid-swap finishes first and its
    /// replacement sink is the one that gets closed.
    async fn close(&self) -> Result<()> {
        debug!("close()");
        self.shared.status.set(Status::Closing);

        self.cancel.cancel();
        let task = self.roll_task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "rotation task did not shut down cleanly");
            }
        }

        let mut result = Ok(());
        if let Some(sink) = self.shared.take() {
            result = sink.close().await;
        }

        self.shared.status.set(Status::Closed);
        result
    }

    fn status(&self) -> Status {
        self.shared.status.get()
    }
}

/// Periodic rotation driver; one per rolling sink
///
/// Runs only while the sink is flowing. Cancellation while sleeping is
/// the intended shutdown path, not a fault.
async fn rotation_loop(shared: Arc<RollShared>, cancel: CancellationToken) {
    while shared.status.is_flowing() {
        let sleep_ms = compute_sleep(
            chrono::Utc::now().timestamp_millis(),
            shared.interval.as_millis() as u64,
            shared.even_boundaries,
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("rotation task cancelled while waiting for next rotation");
                return;
            }
            _ = tokio::time::sleep(Duration::from_millis(sleep_ms)) => {}
        }

        if !shared.status.is_flowing() {
            debug!("woke up and no longer FLOWING, quitting rotation task");
            return;
        }

        if let Err(e) = rotate(&shared).await {
            // The still-live downstream keeps serving; only rotation stops
            warn!(error = %e, "rotation failed, rotation task exiting");
            return;
        }
    }
}

/// Perform one rotation: build the replacement, swap it in, then
/// drain and close the retired sink off the accept path
async fn rotate(shared: &Arc<RollShared>) -> sluice_pipeline::Result<()> {
    info!("rotating sink");

    // Build and open the replacement before touching the live sink
    let new_sink = shared.factory.build_and_open().await?;

    shared.status.set(Status::Opening);
    let old_sink = shared.swap_in(new_sink);

    // Give appends that loaded the old sink a window to complete
    tokio::time::sleep(shared.grace).await;

    if let Some(old_sink) = old_sink {
        tokio::spawn(async move {
            if let Err(e) = old_sink.close().await {
                warn!(error = %e, "failed to close retired sink");
            } else {
                debug!("retired sink closed");
            }
        });
    }

    shared.status.set(Status::Flowing);
    debug!("rotation complete");
    Ok(())
}

/// Compute how long to sleep before the next rotation, taking even
/// wall-clock boundaries into account
///
/// With alignment enabled, rotation instants land on multiples of the
/// granularity `r` (60s when the interval divides evenly into minutes,
/// else 30s) instead of drifting relative to process start. Waking too
/// close behind a boundary skips ahead to the next one.
fn compute_sleep(now_ms: i64, interval_ms: u64, even_boundaries: bool) -> u64 {
    if !even_boundaries {
        return interval_ms;
    }

    let r = if interval_ms % 60_000 == 0 {
        60_000
    } else {
        MIN_BOUNDARY_MS
    };
    let m = (now_ms as u64 + interval_ms) % r;
    let t = interval_ms - m;

    if m < r * 2 / 3 || interval_ms == MIN_BOUNDARY_MS {
        t
    } else {
        t + r
    }
}

#[cfg(test)]
#[path = "roll_test.rs"]
mod roll_test;
