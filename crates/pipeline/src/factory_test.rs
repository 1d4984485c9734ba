//! Tests for sink and source factories

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use sluice_core::{Event, Sink, Source, StageError, Status, StatusCell};

use crate::{PipelineError, SinkArgs, SinkFactory, SinkRegistry, SourceRegistry};

use super::SourceFactory;

/// Minimal sink that records how it was constructed
struct ProbeSink {
    status: StatusCell,
}

#[async_trait]
impl Sink for ProbeSink {
    async fn open(&self) -> sluice_core::Result<()> {
        self.status.set(Status::Flowing);
        Ok(())
    }

    async fn append(&self, _event: Event) -> sluice_core::Result<()> {
        Ok(())
    }

    async fn close(&self) -> sluice_core::Result<()> {
        self.status.set(Status::Closed);
        Ok(())
    }

    fn status(&self) -> Status {
        self.status.get()
    }
}

/// Registry whose "probe" sink captures its build-time arguments
fn probe_registry(captured: Arc<Mutex<Vec<SinkArgs>>>) -> Arc<SinkRegistry> {
    let mut registry = SinkRegistry::new();
    registry.register("probe", move |args| {
        captured.lock().push(args);
        Ok(Arc::new(ProbeSink {
            status: StatusCell::new(),
        }))
    });
    registry.register("broken", |_args| {
        Err(PipelineError::build("broken", "constructor refused"))
    });
    Arc::new(registry)
}

#[test]
fn test_build_consumes_head_and_leaves_residual() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let registry = probe_registry(Arc::clone(&captured));

    let factory = SinkFactory::parse("probe(a) > probe(b) > probe(c)", registry).unwrap();
    factory.build().unwrap();

    let captured = captured.lock();
    assert_eq!(captured.len(), 1, "only the head is constructed");
    assert_eq!(captured[0].args, vec!["a"]);

    let residual = captured[0]
        .downstream
        .as_ref()
        .expect("head of a 3-entry chain gets a residual factory");
    let entries = residual.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].args, vec!["b"]);
    assert_eq!(entries[1].args, vec!["c"]);
}

#[test]
fn test_residual_does_not_mutate_parent() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let registry = probe_registry(Arc::clone(&captured));

    let factory = SinkFactory::parse("probe > probe", registry).unwrap();
    factory.build().unwrap();
    factory.build().unwrap();

    // Parent chain is untouched; both builds saw the same residual
    assert_eq!(factory.entries().len(), 2);
    let captured = captured.lock();
    assert_eq!(captured[1].downstream.as_ref().unwrap().entries().len(), 1);
}

#[test]
fn test_terminal_entry_gets_no_downstream() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let registry = probe_registry(Arc::clone(&captured));

    let factory = SinkFactory::parse("probe", registry).unwrap();
    factory.build().unwrap();

    assert!(captured.lock()[0].downstream.is_none());
}

#[test]
fn test_from_entries_rejects_empty_chain() {
    let registry = probe_registry(Arc::new(Mutex::new(Vec::new())));
    assert!(matches!(
        SinkFactory::from_entries(vec![], registry),
        Err(PipelineError::Config(_))
    ));
}

#[test]
fn test_from_entries_builds_like_parse() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let registry = probe_registry(Arc::clone(&captured));

    let entries = crate::parse("probe(a) > probe(b)").unwrap();
    let factory = SinkFactory::from_entries(entries, registry).unwrap();
    factory.build().unwrap();

    let captured = captured.lock();
    assert_eq!(captured[0].args, vec!["a"]);
    assert_eq!(
        captured[0].downstream.as_ref().unwrap().entries()[0].args,
        vec!["b"]
    );
}

#[test]
fn test_unknown_kind_fails_parse() {
    let registry = probe_registry(Arc::new(Mutex::new(Vec::new())));
    match SinkFactory::parse("probe > hdfs(/data)", registry) {
        Err(PipelineError::UnknownComponent(kind)) => assert_eq!(kind, "hdfs"),
        other => panic!("expected UnknownComponent, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_constructor_failure_is_build_error() {
    let registry = probe_registry(Arc::new(Mutex::new(Vec::new())));
    let factory = SinkFactory::parse("broken", registry).unwrap();
    match factory.build() {
        Err(PipelineError::Build { kind, .. }) => assert_eq!(kind, "broken"),
        other => panic!("expected Build error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_build_and_open_yields_flowing_sink() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let registry = probe_registry(captured);

    let factory = SinkFactory::parse("probe", registry).unwrap();
    let sink = factory.build_and_open().await.unwrap();
    assert_eq!(sink.status(), Status::Flowing);
}

/// Minimal source that records the entries of its attached sink factory
struct ProbeSource {
    status: StatusCell,
    chain_len: usize,
}

#[async_trait]
impl Source for ProbeSource {
    async fn open(&self) -> sluice_core::Result<()> {
        if self.chain_len == 0 {
            return Err(StageError::open("no sink chain"));
        }
        self.status.set(Status::Flowing);
        Ok(())
    }

    async fn close(&self) -> sluice_core::Result<()> {
        self.status.set(Status::Closed);
        Ok(())
    }

    fn status(&self) -> Status {
        self.status.get()
    }

    fn event_kind(&self) -> &str {
        "probe_event"
    }
}

#[test]
fn test_source_factory_rejects_chained_description() {
    let mut registry = SourceRegistry::new();
    registry.register("gen", |_args| {
        Ok(Arc::new(ProbeSource {
            status: StatusCell::new(),
            chain_len: 0,
        }))
    });
    assert!(matches!(
        SourceFactory::parse("gen > gen", Arc::new(registry)),
        Err(PipelineError::Config(_))
    ));
}

#[test]
fn test_source_factory_injects_sink_factory() {
    let mut sources = SourceRegistry::new();
    sources.register("gen", |args| {
        Ok(Arc::new(ProbeSource {
            status: StatusCell::new(),
            chain_len: args.sink_factory.entries().len(),
        }))
    });

    let sinks = probe_registry(Arc::new(Mutex::new(Vec::new())));
    let sink_factory = Arc::new(SinkFactory::parse("probe > probe", sinks).unwrap());

    let source_factory = SourceFactory::parse("gen(42)", Arc::new(sources)).unwrap();
    assert_eq!(source_factory.spec().args, vec!["42"]);

    let source = source_factory.build(sink_factory).unwrap();
    assert_eq!(source.event_kind(), "probe_event");
}
