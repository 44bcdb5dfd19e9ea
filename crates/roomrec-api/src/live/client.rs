// Live API HTTP client
//
// Wraps `reqwest::Client` with URL construction against a configurable base
// and `{code, msg, data}` envelope unwrapping. Endpoint methods live in
// sibling modules as inherent methods so this file stays about transport.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::live::models::LiveResponse;
use crate::transport::TransportConfig;

/// Production API root.
pub const DEFAULT_API_BASE: &str = "https://api.live.bilibili.com/";

/// Raw HTTP client for the live platform's JSON API.
///
/// All methods return the unwrapped `data` payload. A non-zero envelope
/// `code` becomes [`Error::Api`] before the caller sees anything.
#[derive(Clone)]
pub struct LiveClient {
    http: reqwest::Client,
    base_url: Url,
}

impl LiveClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. [`DEFAULT_API_BASE`].
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an endpoint path onto the base URL.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request with query parameters and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Parse the `{ code, data }` envelope, returning `data` on success
    /// or an `Error::Api` if `code != 0`.
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        let envelope: LiveResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if envelope.code != 0 {
            return Err(Error::Api {
                code: envelope.code,
                message: envelope.message(),
            });
        }

        serde_json::from_value(envelope.data).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
