//! Configuration for roomrec.
//!
//! One TOML file merged with `ROOMREC_*` environment variables, translated
//! into `roomrec_core::RecorderConfig`. The binary layers its CLI flags on
//! top of the loaded [`Config`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use roomrec_api::{DEFAULT_API_BASE, DEFAULT_USER_AGENT, TransportConfig};
use roomrec_core::{RecordSettings, RecorderConfig, RecorderFeature};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Live API root.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// User agent for API and stream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Where recordings are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// `record`, `clip` or `record_and_clip`.
    #[serde(default)]
    pub features: RecorderFeature,

    /// Seconds of stream a clip keeps before the request.
    #[serde(default = "default_clip_past")]
    pub clip_past: u64,

    /// Seconds of stream a clip keeps after the request.
    #[serde(default = "default_clip_future")]
    pub clip_future: u64,

    /// Seconds between live-status polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Rooms recorded when none are given on the command line.
    #[serde(default)]
    pub rooms: Vec<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
            output_dir: default_output_dir(),
            features: RecorderFeature::default(),
            clip_past: default_clip_past(),
            clip_future: default_clip_future(),
            poll_interval: default_poll_interval(),
            rooms: Vec::new(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("recordings")
}
fn default_clip_past() -> u64 {
    20
}
fn default_clip_future() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    30
}

impl Config {
    /// Validate and convert into the runtime configuration.
    pub fn to_recorder_config(&self) -> Result<RecorderConfig, ConfigError> {
        let api_base: url::Url = self.api_base.parse().map_err(|_| ConfigError::Validation {
            field: "api_base".into(),
            reason: format!("invalid URL: {}", self.api_base),
        })?;

        if self.poll_interval == 0 {
            return Err(ConfigError::Validation {
                field: "poll_interval".into(),
                reason: "must be at least one second".into(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "user_agent".into(),
                reason: "must not be empty".into(),
            });
        }

        let transport = TransportConfig {
            user_agent: self.user_agent.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout),
            ..TransportConfig::default()
        };

        let record = RecordSettings {
            output_dir: self.output_dir.clone(),
            features: self.features,
            clip_past: Duration::from_secs(self.clip_past),
            clip_future: Duration::from_secs(self.clip_future),
        };

        Ok(RecorderConfig {
            api_base,
            transport,
            poll_interval: Duration::from_secs(self.poll_interval),
            record,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "roomrec", "roomrec").map_or_else(
        || PathBuf::from(".roomrec").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the default path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file yields the
/// defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ROOMREC_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
