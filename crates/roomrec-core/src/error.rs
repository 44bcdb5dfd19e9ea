// ── Core error types ──
//
// User-facing errors from roomrec-core. Consumers never see HTTP status
// codes or JSON parse failures directly. The `From<roomrec_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach live API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Live API timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Room not found: {room_id}")]
    RoomNotFound { room_id: u64 },

    #[error("No stream available for room {room_id}")]
    StreamUnavailable { room_id: u64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Envelope `code` from the live API, when there was one.
        code: Option<i64>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<roomrec_api::Error> for CoreError {
    fn from(err: roomrec_api::Error) -> Self {
        match err {
            roomrec_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            roomrec_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            roomrec_api::Error::ClientBuild(reason) => CoreError::Config {
                message: format!("HTTP client setup failed: {reason}"),
            },
            roomrec_api::Error::Status { status, url } => CoreError::Api {
                message: format!("HTTP {status} from {url}"),
                code: None,
                status: Some(status),
            },
            roomrec_api::Error::Api { code, message } => CoreError::Api {
                message,
                code: Some(code),
                status: None,
            },
            roomrec_api::Error::NoStreamUrl { room_id } => {
                CoreError::StreamUnavailable { room_id }
            }
            roomrec_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

/// Failure reported by a stream processor.
///
/// Processor failures never abort teardown: they are logged where they
/// happen and the remaining release steps still run.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("processor I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("processor already disposed")]
    Disposed,
}
