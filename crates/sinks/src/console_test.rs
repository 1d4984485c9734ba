//! Tests for the console sink

use sluice_core::{Event, Sink, Status};

use super::ConsoleSink;

#[tokio::test]
async fn test_lifecycle_and_count() {
    let sink = ConsoleSink::new();
    assert_eq!(sink.status(), Status::Closed);

    sink.open().await.unwrap();
    assert_eq!(sink.status(), Status::Flowing);

    sink.append(Event::new("line", &b"first"[..])).await.unwrap();
    sink.append(Event::new("line", vec![0xff, 0xfe])).await.unwrap();
    assert_eq!(sink.events_received(), 2);

    sink.close().await.unwrap();
    assert_eq!(sink.status(), Status::Closed);
}
