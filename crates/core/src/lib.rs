//! Sluice - Core
//!
//! Shared plumbing for the sluice event-shipping pipeline: the status
//! state machine, the opaque `Event` payload and its frame codec, and
//! the capability contracts every pipeline stage implements.
//!
//! # Architecture
//!
//! ```text
//! [Source] --Event--> [Sink] --Event--> [Sink] --Event--> [store]
//!    |                   |                 |
//!    +-- Status          +-- Status        +-- Status
//! ```
//!
//! Every stage owns exactly one [`Status`], mutated only by itself and
//! readable by anyone (the rotation engine, a closer task, an operator
//! endpoint). Events are opaque to the core: a declared kind plus a
//! byte payload, so terminal sinks can pick a compatible on-disk
//! representation without the core interpreting contents.

mod config;
mod error;
mod event;
mod status;
mod traits;

pub use config::{PipelineConfig, RollConfig, DEFAULT_ROLL_INTERVAL_SECS};
pub use error::{Result, StageError};
pub use event::Event;
pub use status::{Status, StatusCell};
pub use traits::{expand_bucket_template, Bucketed, Sink, Source};
