//! Stage error types
//!
//! Runtime errors raised by sources and sinks. Configuration and build
//! errors live in the pipeline crate; these cover open/append/close.

use thiserror::Error;

use crate::Status;

/// Result type for stage operations
pub type Result<T> = std::result::Result<T, StageError>;

/// Errors raised while operating a source or sink
#[derive(Debug, Error)]
pub enum StageError {
    /// Failed to acquire resources during `open()`
    #[error("open failed: {0}")]
    Open(String),

    /// A downstream write failed
    #[error("append failed: {0}")]
    Append(String),

    /// Failed to release resources during `close()`
    #[error("close failed: {0}")]
    Close(String),

    /// Append called while the stage was not flowing (caller bug)
    #[error("stage is {0}, not FLOWING")]
    NotFlowing(Status),

    /// Decorator has no live downstream sink
    #[error("no downstream sink attached")]
    NoDownstream,

    /// Malformed event frame encountered while decoding
    #[error("corrupt event frame: {0}")]
    CorruptFrame(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StageError {
    /// Create an open error
    pub fn open(msg: impl Into<String>) -> Self {
        Self::Open(msg.into())
    }

    /// Create an append error
    pub fn append(msg: impl Into<String>) -> Self {
        Self::Append(msg.into())
    }

    /// Create a close error
    pub fn close(msg: impl Into<String>) -> Self {
        Self::Close(msg.into())
    }
}
