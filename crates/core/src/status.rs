//! Stage lifecycle state machine
//!
//! Every source and sink exposes one [`Status`], driven through
//! `Closed -> Opening -> Flowing -> Closing -> Closed`. `Error` is
//! reachable from any state. Only the owning stage mutates its status;
//! concurrent readers (the rotation task, a closer task) observe it
//! through a [`StatusCell`].

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    /// Not open; initial and final state
    Closed = 0,
    /// Acquiring resources inside `open()`
    Opening = 1,
    /// Accepting appends
    Flowing = 2,
    /// Releasing resources inside `close()`
    Closing = 3,
    /// A fault occurred; `close()` must still release resources
    Error = 4,
}

impl Status {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Status::Closed,
            1 => Status::Opening,
            2 => Status::Flowing,
            3 => Status::Closing,
            _ => Status::Error,
        }
    }

    /// Human-readable name, matching the log vocabulary
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Closed => "CLOSED",
            Status::Opening => "OPENING",
            Status::Flowing => "FLOWING",
            Status::Closing => "CLOSING",
            Status::Error => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomically readable status slot owned by a stage
///
/// Safe to read from a concurrent rotation or closer task while the
/// owning control flow drives transitions.
#[derive(Debug)]
pub struct StatusCell(AtomicU8);

impl StatusCell {
    /// New cell starting at [`Status::Closed`]
    pub const fn new() -> Self {
        Self(AtomicU8::new(Status::Closed as u8))
    }

    /// Current status (lock-free load)
    #[inline]
    pub fn get(&self) -> Status {
        Status::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Transition to a new status
    #[inline]
    pub fn set(&self, status: Status) {
        self.0.store(status as u8, Ordering::Release);
    }

    /// True while the stage accepts appends
    #[inline]
    pub fn is_flowing(&self) -> bool {
        self.get() == Status::Flowing
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "status_test.rs"]
mod status_test;
