//! Tests for pipeline configuration

use super::PipelineConfig;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.sink, "null");
    assert_eq!(config.roll.interval_secs, 30);
    assert!(!config.roll.even_boundaries);
    assert_eq!(config.roll.interval(), Duration::from_secs(30));
}

#[test]
fn test_from_toml() {
    let doc = r#"
        source = "http(0.0.0.0:8080)"
        sink = "roll(60) > disk('/data/%Y%m%d')"
        wal_dir = "/tmp/wal"

        [roll]
        interval_secs = 60
        even_boundaries = true
    "#;

    let config = PipelineConfig::from_toml(doc).unwrap();
    assert_eq!(config.source, "http(0.0.0.0:8080)");
    assert_eq!(config.wal_dir.to_str().unwrap(), "/tmp/wal");
    assert_eq!(config.roll.interval_secs, 60);
    assert!(config.roll.even_boundaries);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let config = PipelineConfig::from_toml(r#"sink = "console""#).unwrap();
    assert_eq!(config.sink, "console");
    assert_eq!(config.roll.interval_secs, 30);
}
