use thiserror::Error;

/// Top-level error type for the `roomrec-api` crate.
///
/// Covers every failure mode of the live API surface: transport, the
/// `{code, msg, data}` envelope, and stream requests.
/// `roomrec-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The server answered with a status the endpoint does not accept.
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    // ── Live API ────────────────────────────────────────────────────
    /// Non-zero `code` in the API envelope.
    #[error("Live API error (code {code}): {message}")]
    Api { code: i64, message: String },

    /// The play-url endpoint returned no candidate stream addresses.
    #[error("No stream URL available for room {room_id}")]
    NoStreamUrl { room_id: u64 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Status { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the API error code, if available.
    pub fn api_error_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_status_is_detected() {
        let err = Error::Status {
            status: 404,
            url: "https://example.invalid/live.flv".into(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn server_errors_are_not_not_found() {
        let err = Error::Status {
            status: 502,
            url: "https://example.invalid/live.flv".into(),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn api_code_is_exposed() {
        let err = Error::Api {
            code: 60004,
            message: "room does not exist".into(),
        };
        assert_eq!(err.api_error_code(), Some(60004));
        assert_eq!(
            err.to_string(),
            "Live API error (code 60004): room does not exist"
        );
    }
}
