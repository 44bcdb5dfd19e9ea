//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use roomrec_config::ConfigError;
use roomrec_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the live API at {url}: {reason}")]
    #[diagnostic(
        code(roomrec::connection_failed),
        help("Check your network connection, or point --api-base at a reachable server.")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("The live API did not answer in time")]
    #[diagnostic(code(roomrec::timeout))]
    Timeout,

    // ── Rooms ────────────────────────────────────────────────────────

    #[error("Room {room_id} does not exist")]
    #[diagnostic(
        code(roomrec::room_not_found),
        help("Use the number at the end of the room's live.bilibili.com URL.")
    )]
    RoomNotFound { room_id: u64 },

    #[error("No rooms to record")]
    #[diagnostic(
        code(roomrec::no_rooms),
        help(
            "Pass room ids on the command line: roomrec record 1017\n\
             Or list them under `rooms` in {path}"
        )
    )]
    NoRooms { path: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(roomrec::api_error))]
    Api { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(roomrec::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(roomrec::config),
        help("Config file: {path}")
    )]
    Config { message: String, path: String },

    // ── Other ────────────────────────────────────────────────────────

    #[error("I/O error: {0}")]
    #[diagnostic(code(roomrec::io))]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    #[diagnostic(code(roomrec::internal))]
    Internal(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::RoomNotFound { .. } => exit_code::NOT_FOUND,
            Self::NoRooms { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::Config { .. } => exit_code::CONFIG,
            Self::Api { .. } | Self::Io(_) | Self::Internal(_) => exit_code::GENERAL,
        }
    }

    pub fn from_config(err: ConfigError, path: &std::path::Path) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config {
                message: other.to_string(),
                path: path.display().to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::RoomNotFound { room_id } => Self::RoomNotFound { room_id },
            CoreError::StreamUnavailable { room_id } => Self::Api {
                message: format!("no stream available for room {room_id}"),
            },
            CoreError::Api { message, .. } => Self::Api { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<roomrec_api::Error> for CliError {
    fn from(err: roomrec_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let not_found: CliError = CoreError::RoomNotFound { room_id: 1 }.into();
        let timeout: CliError = CoreError::Timeout.into();

        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err = CliError::from_config(
            ConfigError::Validation {
                field: "poll_interval".into(),
                reason: "must be at least one second".into(),
            },
            std::path::Path::new("/etc/roomrec.toml"),
        );

        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
