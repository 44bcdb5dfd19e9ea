// roomrec-api: Async Rust client for the live platform's room and stream endpoints

pub mod error;
pub mod live;
pub mod stream;
pub mod transport;

pub use error::Error;
pub use live::models::{AnchorInfo, PlayUrl, RoomInfo, StreamCandidate};
pub use live::{DEFAULT_API_BASE, LiveClient};
pub use stream::{LIVE_SITE, StreamClient};
pub use transport::{DEFAULT_USER_AGENT, TransportConfig};
