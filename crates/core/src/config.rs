//! Pipeline configuration
//!
//! Configuration surface consumed by the core: the source and sink
//! pipeline descriptions, the roll interval, the even-boundary
//! alignment flag, and the write-ahead directory root.
//!
//! # Example
//!
//! ```toml
//! source = "http(0.0.0.0:8080)"
//! sink = "roll(30) > disk('/data/events/%Y-%m-%d/%H%M%S')"
//! wal_dir = "/var/lib/sluice/wal"
//!
//! [roll]
//! interval_secs = 30
//! even_boundaries = true
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default roll interval in seconds
pub const DEFAULT_ROLL_INTERVAL_SECS: u64 = 30;

/// Rotation engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    /// Seconds between rotations
    pub interval_secs: u64,

    /// Align rotation instants to even wall-clock boundaries
    ///
    /// Only meaningful when the interval is a multiple of 30 seconds.
    pub even_boundaries: bool,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_ROLL_INTERVAL_SECS,
            even_boundaries: false,
        }
    }
}

impl RollConfig {
    /// Roll interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Top-level pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source description (single segment, never chained)
    pub source: String,

    /// Sink chain description, e.g. `roll(30) > disk('/data/%Y%m%d')`
    pub sink: String,

    /// Root of the local write-ahead directory
    pub wal_dir: PathBuf,

    /// Rotation settings
    pub roll: RollConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            sink: "null".into(),
            wal_dir: PathBuf::from("wal"),
            roll: RollConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse configuration from a TOML document
    pub fn from_toml(doc: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(doc)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
