//! Component factories
//!
//! A [`SinkFactory`] owns an ordered builder chain. Building a
//! multi-entry chain constructs only the head and attaches a residual
//! factory over the remaining entries as the head's downstream-sink
//! supplier, so the head can materialize its own successor later
//! without re-parsing the description. Residual factories own
//! independent copies of their entries and never mutate the parent's.

use std::sync::Arc;

use sluice_core::{Sink, Source};
use tracing::debug;

use crate::parser::{self, StageSpec};
use crate::registry::{SinkArgs, SinkRegistry, SourceArgs, SourceRegistry};
use crate::{PipelineError, Result};

/// Factory for a sink chain
pub struct SinkFactory {
    entries: Vec<StageSpec>,
    registry: Arc<SinkRegistry>,
}

impl SinkFactory {
    /// Parse a sink chain description and resolve every kind against
    /// the registry
    ///
    /// Unresolved identifiers or malformed segments are configuration
    /// errors: the pipeline does not start.
    pub fn parse(description: &str, registry: Arc<SinkRegistry>) -> Result<Self> {
        let entries = parser::parse(description)?;
        for entry in &entries {
            if !registry.contains(&entry.kind) {
                return Err(PipelineError::UnknownComponent(entry.kind.clone()));
            }
        }
        Ok(Self { entries, registry })
    }

    /// Create a factory over an already-validated builder chain
    pub fn from_entries(entries: Vec<StageSpec>, registry: Arc<SinkRegistry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(PipelineError::config("sink chain must have at least one entry"));
        }
        Ok(Self { entries, registry })
    }

    /// The builder chain this factory will construct
    pub fn entries(&self) -> &[StageSpec] {
        &self.entries
    }

    /// Build the head of the chain
    ///
    /// With one entry left, the constructed sink is terminal. With
    /// more, the head receives a residual factory over entries 2..N
    /// as its downstream supplier; the head does not open its
    /// downstream itself.
    pub fn build(&self) -> Result<Arc<dyn Sink>> {
        let head = &self.entries[0];

        let downstream = if self.entries.len() > 1 {
            Some(Arc::new(Self::from_entries(
                self.entries[1..].to_vec(),
                Arc::clone(&self.registry),
            )?))
        } else {
            None
        };

        debug!(kind = %head.kind, remaining = self.entries.len() - 1, "building sink");

        let constructor = self
            .registry
            .get(&head.kind)
            .ok_or_else(|| PipelineError::UnknownComponent(head.kind.clone()))?;

        constructor(SinkArgs {
            args: head.args.clone(),
            downstream,
        })
    }

    /// Build the head of the chain and open it
    ///
    /// This is how a decorator materializes its successor: the
    /// rotation engine calls this for every replacement sink.
    pub async fn build_and_open(&self) -> Result<Arc<dyn Sink>> {
        let kind = self.entries[0].kind.clone();
        let sink = self.build()?;
        sink.open()
            .await
            .map_err(|source| PipelineError::Open { kind, source })?;
        Ok(sink)
    }
}

/// Factory for a source
///
/// Sources are never chained: the description must be a single
/// segment. The sink factory the source will feed is injected at
/// build time.
pub struct SourceFactory {
    spec: StageSpec,
    registry: Arc<SourceRegistry>,
}

impl SourceFactory {
    /// Parse a source description and resolve it against the registry
    pub fn parse(description: &str, registry: Arc<SourceRegistry>) -> Result<Self> {
        let mut entries = parser::parse(description)?;
        if entries.len() != 1 {
            return Err(PipelineError::config(format!(
                "source description must be a single segment, got {}",
                entries.len()
            )));
        }
        let spec = entries.remove(0);
        if !registry.contains(&spec.kind) {
            return Err(PipelineError::UnknownComponent(spec.kind));
        }
        Ok(Self { spec, registry })
    }

    /// The parsed source entry
    pub fn spec(&self) -> &StageSpec {
        &self.spec
    }

    /// Build the source, injecting the sink chain it will feed
    pub fn build(&self, sink_factory: Arc<SinkFactory>) -> Result<Arc<dyn Source>> {
        debug!(kind = %self.spec.kind, "building source");

        let constructor = self
            .registry
            .get(&self.spec.kind)
            .ok_or_else(|| PipelineError::UnknownComponent(self.spec.kind.clone()))?;

        constructor(SourceArgs {
            args: self.spec.args.clone(),
            sink_factory,
        })
    }
}

#[cfg(test)]
#[path = "factory_test.rs"]
mod factory_test;
