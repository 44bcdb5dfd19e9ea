// Shared transport configuration for building reqwest::Client instances.
//
// The JSON API client and the stream client share timeout, redirect and
// user-agent settings through this module, avoiding duplicated builder logic.

use std::time::Duration;

use reqwest::redirect::Policy;

/// Browser-like user agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Maximum number of redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent string. The stream CDN rejects non-browser agents.
    pub user_agent: String,
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Whole-request timeout for JSON endpoints. Never applied to the
    /// live stream, which is expected to stay open for hours.
    pub request_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.clone())
            .redirect(Policy::limited(MAX_REDIRECTS))
            // Keep the explicit Referer across redirects instead of
            // replacing it with the redirecting URL.
            .referer(false);

        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::ClientBuild(e.to_string()))
    }

    /// Same settings, but without a whole-request timeout.
    ///
    /// Used by the stream client, whose response body is read for as long
    /// as the broadcast lasts.
    pub fn for_streaming(&self) -> Self {
        Self {
            request_timeout: None,
            ..self.clone()
        }
    }
}
