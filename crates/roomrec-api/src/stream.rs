// Live stream HTTP client
//
// Issues the FLV stream request with the exact header set the CDN checks.
// The response is handed back untouched so the caller decides what a
// non-200 status means for its retry policy.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, ORIGIN, REFERER};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Site the CDN expects in `Referer` and `Origin`.
pub const LIVE_SITE: &str = "https://live.bilibili.com";

/// HTTP client for the raw live stream.
#[derive(Clone)]
pub struct StreamClient {
    http: reqwest::Client,
}

impl StreamClient {
    /// Build a stream client. The request timeout from `transport` is
    /// dropped; only the connect timeout applies.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.for_streaming().build_client()?;
        Ok(Self { http })
    }

    /// Wrap a pre-built `reqwest::Client`. It must follow redirects and
    /// carry the desired user agent.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Headers sent with every stream request besides the user agent.
    pub fn stream_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(REFERER, HeaderValue::from_static(LIVE_SITE));
        headers.insert(ORIGIN, HeaderValue::from_static(LIVE_SITE));
        headers
    }

    /// `GET` the stream URL and return the response headers-first.
    ///
    /// Redirects are followed by the client. Any status is returned as
    /// `Ok`; only transport failures are errors.
    pub async fn open(&self, url: &Url) -> Result<reqwest::Response, Error> {
        debug!(url = %url, "opening live stream");

        let resp = self
            .http
            .get(url.clone())
            .headers(Self::stream_headers())
            .send()
            .await
            .map_err(Error::Transport)?;

        debug!(status = %resp.status(), final_url = %resp.url(), "stream response");
        Ok(resp)
    }
}
