//! Sluice - Sinks
//!
//! Built-in sinks and the default component registry.
//!
//! # Available Sinks
//!
//! | Kind      | Purpose                                  | Terminal |
//! |-----------|------------------------------------------|----------|
//! | `null`    | Count and discard (benchmark/testing)    | Yes      |
//! | `console` | Human-readable debug output              | Yes      |
//! | `disk`    | Durable bucketed storage via write-ahead | Yes      |
//! | `roll`    | Time-boxed rotation of its downstream    | No       |
//!
//! # Example
//!
//! ```ignore
//! use sluice_sinks::default_registry;
//! use sluice_pipeline::SinkFactory;
//!
//! let registry = default_registry(&manager, &config.roll);
//! let factory = SinkFactory::parse(
//!     "roll(30) > disk('/data/events/%Y-%m-%d/%H%M%S')",
//!     registry,
//! )?;
//! let sink = factory.build_and_open().await?;
//! ```

use std::sync::Arc;

use sluice_core::RollConfig;
use sluice_durable::{RollSink, TransactionManager};
use sluice_pipeline::{PipelineError, SinkRegistry};

pub mod console;
pub mod disk;
pub mod null;

pub use console::ConsoleSink;
pub use disk::DiskSink;
pub use null::NullSink;

/// Build a registry with all built-in sinks registered
///
/// The transaction manager is shared by every durable sink built
/// through this registry; the roll configuration supplies the default
/// interval and the even-boundary flag.
pub fn default_registry(manager: &Arc<TransactionManager>, roll: &RollConfig) -> Arc<SinkRegistry> {
    let mut registry = SinkRegistry::new();

    registry.register("null", |args| {
        if args.downstream.is_some() {
            return Err(PipelineError::build("null", "null sink must be terminal"));
        }
        Ok(Arc::new(NullSink::new()))
    });

    registry.register("console", |args| {
        if args.downstream.is_some() {
            return Err(PipelineError::build("console", "console sink must be terminal"));
        }
        Ok(Arc::new(ConsoleSink::new()))
    });

    let roll_config = roll.clone();
    registry.register("roll", move |args| {
        let downstream = args
            .downstream
            .ok_or_else(|| PipelineError::build("roll", "roll requires a downstream sink"))?;
        Ok(Arc::new(RollSink::from_args(&args.args, &roll_config, downstream)))
    });

    let manager = Arc::clone(manager);
    registry.register("disk", move |args| {
        if args.downstream.is_some() {
            return Err(PipelineError::build("disk", "disk sink must be terminal"));
        }
        DiskSink::from_args(&args.args, Arc::clone(&manager)).map(|s| Arc::new(s) as _)
    });

    Arc::new(registry)
}
