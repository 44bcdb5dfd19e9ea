// ── Stream sources ──
//
// Collaborator seams for everything the controller fetches over the
// network: room metadata, the per-attempt stream URL, and the stream
// itself. `LiveClient` and `StreamClient` provide the production
// implementations.

use std::fmt;
use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use url::Url;

use roomrec_api::{LiveClient, StreamClient};

use crate::error::CoreError;
use crate::model::RoomIdentity;

/// The readable body of an accepted stream request.
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

// ── Resolver traits ──────────────────────────────────────────────

/// Resolves a public room id into its identity.
#[async_trait]
pub trait RoomMetadataResolver: Send + Sync {
    async fn resolve_room(&self, room_id: u64) -> Result<RoomIdentity, CoreError>;
}

/// Resolves the current playable stream URL. URLs expire, so this is
/// asked again on every connect.
#[async_trait]
pub trait StreamUrlResolver: Send + Sync {
    async fn stream_url(&self, real_room_id: u64) -> Result<Url, CoreError>;
}

/// Answers "is this room broadcasting right now?".
#[async_trait]
pub trait LiveStatusSource: Send + Sync {
    async fn is_live(&self, real_room_id: u64) -> Result<bool, CoreError>;
}

// ── Connector ────────────────────────────────────────────────────

/// An accepted stream request.
pub struct Connected {
    /// Final URL after redirects.
    pub url: Url,
    pub stream: ByteStream,
}

impl fmt::Debug for Connected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connected").field("url", &self.url).finish_non_exhaustive()
    }
}

/// Why a connect attempt produced no stream.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The stream URL could not be resolved.
    #[error("could not resolve stream url: {0}")]
    Resolve(#[source] CoreError),

    /// The server answered with something other than 200.
    #[error("stream request rejected with HTTP {status}")]
    Rejected { status: u16 },

    /// DNS, TLS, timeout or any other failure before a response arrived.
    #[error("stream request failed: {0}")]
    Transport(String),
}

impl ConnectError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { status: 404 })
    }
}

/// Opens the live stream at a URL.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<Connected, ConnectError>;
}

/// [`StreamConnector`] over HTTP.
#[derive(Clone)]
pub struct HttpConnector {
    client: StreamClient,
}

impl HttpConnector {
    pub fn new(client: StreamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StreamConnector for HttpConnector {
    async fn connect(&self, url: &Url) -> Result<Connected, ConnectError> {
        let resp = self
            .client
            .open(url)
            .await
            .map_err(|e| ConnectError::Transport(e.to_string()))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            // Dropping the response here closes it.
            return Err(ConnectError::Rejected {
                status: status.as_u16(),
            });
        }

        let final_url = resp.url().clone();
        let body = resp.bytes_stream().map_err(io::Error::other);
        Ok(Connected {
            url: final_url,
            stream: Box::pin(StreamReader::new(body)),
        })
    }
}

// ── LiveClient adapters ──────────────────────────────────────────

#[async_trait]
impl RoomMetadataResolver for LiveClient {
    async fn resolve_room(&self, room_id: u64) -> Result<RoomIdentity, CoreError> {
        let info = self.room_info(room_id).await.map_err(|e| {
            if e.api_error_code().is_some() || e.is_not_found() {
                CoreError::RoomNotFound { room_id }
            } else {
                CoreError::from(e)
            }
        })?;
        let streamer_name = self.anchor_name(info.room_id).await?;

        Ok(RoomIdentity {
            room_id,
            real_room_id: info.room_id,
            streamer_name,
        })
    }
}

#[async_trait]
impl StreamUrlResolver for LiveClient {
    async fn stream_url(&self, real_room_id: u64) -> Result<Url, CoreError> {
        Ok(self.play_url(real_room_id).await?)
    }
}

#[async_trait]
impl LiveStatusSource for LiveClient {
    async fn is_live(&self, real_room_id: u64) -> Result<bool, CoreError> {
        Ok(LiveClient::is_live(self, real_room_id).await?)
    }
}
