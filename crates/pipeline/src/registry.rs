//! Component registries
//!
//! Late-bound, config-driven selection of component implementations:
//! a registration table mapping lowercase identifiers to constructor
//! closures, populated at startup and resolved once during parsing.
//! Equivalent to a plugin table, not runtime reflection.

use std::collections::HashMap;
use std::sync::Arc;

use sluice_core::{Sink, Source};

use crate::{Result, SinkFactory};

/// Everything a sink constructor receives
pub struct SinkArgs {
    /// Ordered constructor arguments from the pipeline description
    pub args: Vec<String>,

    /// Residual factory over the remaining chain entries
    ///
    /// `Some` for decorators with a downstream, `None` for the
    /// terminal entry. A decorator that requires a downstream should
    /// fail its build when this is absent.
    pub downstream: Option<Arc<SinkFactory>>,
}

/// Constructor closure for a sink kind
pub type SinkConstructor = Box<dyn Fn(SinkArgs) -> Result<Arc<dyn Sink>> + Send + Sync>;

/// Everything a source constructor receives
pub struct SourceArgs {
    /// Ordered constructor arguments from the pipeline description
    pub args: Vec<String>,

    /// Factory for the sink chain this source will feed
    pub sink_factory: Arc<SinkFactory>,
}

/// Constructor closure for a source kind
pub type SourceConstructor = Box<dyn Fn(SourceArgs) -> Result<Arc<dyn Source>> + Send + Sync>;

/// Registry of sink constructors keyed by lowercase identifier
#[derive(Default)]
pub struct SinkRegistry {
    constructors: HashMap<String, SinkConstructor>,
}

impl SinkRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink constructor under an identifier
    ///
    /// Identifiers are case-folded; registering the same identifier
    /// twice replaces the earlier constructor.
    pub fn register(
        &mut self,
        kind: &str,
        constructor: impl Fn(SinkArgs) -> Result<Arc<dyn Sink>> + Send + Sync + 'static,
    ) {
        self.constructors
            .insert(kind.to_ascii_lowercase(), Box::new(constructor));
    }

    /// Check if a kind is registered
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(&kind.to_ascii_lowercase())
    }

    /// Look up a constructor
    pub(crate) fn get(&self, kind: &str) -> Option<&SinkConstructor> {
        self.constructors.get(kind)
    }

    /// Registered identifiers
    pub fn kinds(&self) -> Vec<&str> {
        self.constructors.keys().map(|k| k.as_str()).collect()
    }
}

/// Registry of source constructors keyed by lowercase identifier
#[derive(Default)]
pub struct SourceRegistry {
    constructors: HashMap<String, SourceConstructor>,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source constructor under an identifier
    pub fn register(
        &mut self,
        kind: &str,
        constructor: impl Fn(SourceArgs) -> Result<Arc<dyn Source>> + Send + Sync + 'static,
    ) {
        self.constructors
            .insert(kind.to_ascii_lowercase(), Box::new(constructor));
    }

    /// Check if a kind is registered
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(&kind.to_ascii_lowercase())
    }

    /// Look up a constructor
    pub(crate) fn get(&self, kind: &str) -> Option<&SourceConstructor> {
        self.constructors.get(kind)
    }

    /// Registered identifiers
    pub fn kinds(&self) -> Vec<&str> {
        self.constructors.keys().map(|k| k.as_str()).collect()
    }
}
