//! Sluice - Pipeline
//!
//! Turns a textual pipeline description into a live, chainable sequence
//! of components.
//!
//! # Architecture
//!
//! ```text
//! "roll(30) > disk('/data/%Y%m%d')"
//!        |  parse
//!        v
//! [StageSpec, StageSpec]            (builder chain)
//!        |  build
//!        v
//! roll sink ── residual SinkFactory ──> disk sink (built on demand)
//! ```
//!
//! # Key Design
//!
//! - **String-keyed registry**: component kinds resolve against a table
//!   of constructor closures populated at startup, so pipelines are
//!   config-driven without recompiling the engine.
//! - **Residual factories**: building a multi-entry chain constructs
//!   only the head and hands it a factory over the remaining entries.
//!   The head defers materializing its successor to whoever owns it
//!   (the rotation engine, or `build_and_open` during open).
//! - **Typed failures**: malformed descriptions and unknown kinds fail
//!   parsing; a constructor failure surfaces as a distinct build error,
//!   never a silently swallowed null.

mod error;
mod factory;
mod parser;
mod registry;

pub use error::{PipelineError, Result};
pub use factory::{SinkFactory, SourceFactory};
pub use parser::{format_chain, parse, StageSpec};
pub use registry::{SinkArgs, SinkConstructor, SinkRegistry, SourceArgs, SourceConstructor, SourceRegistry};
