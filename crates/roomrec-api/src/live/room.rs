// Live API room endpoints
//
// Room metadata, anchor name and play-url lookups. Only the play-url call
// is made per connect attempt; the others run once per room.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::live::client::LiveClient;
use crate::live::models::{AnchorInRoom, PlayUrl, RoomInfo};

/// Quality selector for `playUrl`. 4 is the original-quality stream.
const PLAY_QUALITY: &str = "4";

impl LiveClient {
    /// Fetch room metadata by public (short or long) room id.
    ///
    /// `GET room/v1/Room/get_info?id={room_id}`
    pub async fn room_info(&self, room_id: u64) -> Result<RoomInfo, Error> {
        let url = self.api_url("room/v1/Room/get_info")?;
        debug!(room_id, "fetching room info");
        self.get(url, &[("id", room_id.to_string())]).await
    }

    /// Fetch the anchor's display name.
    ///
    /// `GET live_user/v1/UserInfo/get_anchor_in_room?roomid={real_room_id}`
    pub async fn anchor_name(&self, real_room_id: u64) -> Result<String, Error> {
        let url = self.api_url("live_user/v1/UserInfo/get_anchor_in_room")?;
        debug!(real_room_id, "fetching anchor info");
        let anchor: AnchorInRoom = self
            .get(url, &[("roomid", real_room_id.to_string())])
            .await?;
        Ok(anchor.info.uname)
    }

    /// Resolve the current FLV stream address.
    ///
    /// `GET room/v1/Room/playUrl?cid={real_room_id}&quality=4&platform=web`
    ///
    /// Addresses are signed and expire, so callers should resolve a fresh
    /// one for every connect attempt.
    pub async fn play_url(&self, real_room_id: u64) -> Result<Url, Error> {
        let url = self.api_url("room/v1/Room/playUrl")?;
        debug!(real_room_id, "resolving play url");
        let play: PlayUrl = self
            .get(
                url,
                &[
                    ("cid", real_room_id.to_string()),
                    ("quality", PLAY_QUALITY.to_string()),
                    ("platform", "web".to_string()),
                ],
            )
            .await?;

        let candidate = play
            .durl
            .into_iter()
            .min_by_key(|c| c.order.unwrap_or(i32::MAX))
            .ok_or(Error::NoStreamUrl {
                room_id: real_room_id,
            })?;

        Ok(Url::parse(&candidate.url)?)
    }

    /// Whether the room is broadcasting right now.
    pub async fn is_live(&self, real_room_id: u64) -> Result<bool, Error> {
        Ok(self.room_info(real_room_id).await?.is_live())
    }
}
