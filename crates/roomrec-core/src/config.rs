// ── Runtime configuration ──
//
// Built by the binary from `roomrec-config`; core never reads files or
// environment variables itself.

use std::path::PathBuf;
use std::time::Duration;

use roomrec_api::TransportConfig;
use url::Url;

use crate::model::RecorderFeature;
use crate::monitor::DEFAULT_POLL_INTERVAL;

/// What every room records and where.
#[derive(Debug, Clone)]
pub struct RecordSettings {
    pub output_dir: PathBuf,
    pub features: RecorderFeature,
    /// Stream kept before a clip request.
    pub clip_past: Duration,
    /// Stream kept after a clip request.
    pub clip_future: Duration,
}

impl RecordSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            features: RecorderFeature::default(),
            clip_past: Duration::from_secs(20),
            clip_future: Duration::from_secs(10),
        }
    }
}

/// Configuration for a [`Recorder`](crate::Recorder).
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Base URL of the live API.
    pub api_base: Url,
    pub transport: TransportConfig,
    /// Time between two live-status polls.
    pub poll_interval: Duration,
    pub record: RecordSettings,
}

impl RecorderConfig {
    pub fn new(api_base: Url, record: RecordSettings) -> Self {
        Self {
            api_base,
            transport: TransportConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            record,
        }
    }
}
