// Live API response types
//
// Models for the live platform's JSON API. All responses are wrapped in the
// `LiveResponse` envelope. Fields use `#[serde(default)]` liberally because
// the API omits fields depending on room state.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard live API response envelope.
///
/// Every endpoint wraps its payload:
/// ```json
/// { "code": 0, "msg": "ok", "message": "ok", "data": { ... } }
/// ```
/// `data` is kept raw until `code` has been checked, because failed calls
/// send `[]` or `{}` in its place.
#[derive(Debug, Deserialize)]
pub struct LiveResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl LiveResponse {
    /// Best available human-readable message.
    pub fn message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("code={}", self.code))
    }
}

// ── Room ─────────────────────────────────────────────────────────────

/// Room object from `room/v1/Room/get_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    /// Internal ("real") room id. Stream and status endpoints only accept this.
    pub room_id: u64,
    /// Public short id, `0` when the room has none.
    #[serde(default)]
    pub short_id: u64,
    /// Anchor's user id.
    #[serde(default)]
    pub uid: u64,
    /// 0 = offline, 1 = live, 2 = replay rotation.
    #[serde(default)]
    pub live_status: i32,
    #[serde(default)]
    pub title: String,
}

impl RoomInfo {
    /// Whether the room is broadcasting right now.
    pub fn is_live(&self) -> bool {
        self.live_status == 1
    }
}

// ── Anchor ───────────────────────────────────────────────────────────

/// Payload of `live_user/v1/UserInfo/get_anchor_in_room`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnchorInRoom {
    pub info: AnchorInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorInfo {
    #[serde(default)]
    pub uid: u64,
    pub uname: String,
}

// ── Play URL ─────────────────────────────────────────────────────────

/// Payload of `room/v1/Room/playUrl`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayUrl {
    #[serde(default)]
    pub current_quality: Option<i32>,
    #[serde(default)]
    pub durl: Vec<StreamCandidate>,
}

/// One candidate CDN address for the FLV stream.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamCandidate {
    pub url: String,
    #[serde(default)]
    pub order: Option<i32>,
}
