//! Pipeline error types
//!
//! Configuration errors abort startup; build and open errors are hard
//! failures of the stage they name, not retryable conditions.

use thiserror::Error;

use sluice_core::StageError;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while parsing or building a pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed pipeline description
    #[error("invalid pipeline description: {0}")]
    Config(String),

    /// Identifier not present in the registry
    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    /// A component constructor failed
    #[error("failed to build '{kind}': {message}")]
    Build { kind: String, message: String },

    /// A freshly built component failed to open
    #[error("failed to open '{kind}'")]
    Open {
        kind: String,
        #[source]
        source: StageError,
    },
}

impl PipelineError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a build error for a component kind
    pub fn build(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Build {
            kind: kind.into(),
            message: msg.into(),
        }
    }
}
