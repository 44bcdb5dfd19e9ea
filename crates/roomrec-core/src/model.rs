// ── Domain model ──
//
// Room identity, acquisition triggers, feature selection and the
// serializable snapshot handed to UI consumers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── Trigger ──────────────────────────────────────────────────────

/// Why an acquisition attempt was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Trigger {
    /// A user asked for an immediate check.
    Manual,
    /// An external API call asked for a check.
    ApiTriggered,
    /// A delayed, self-scheduled recheck after a failed or ended attempt.
    ApiRecheck,
    /// The live-status monitor saw the room broadcasting.
    StatusChanged,
}

impl Trigger {
    /// Rechecks never schedule another recheck when they fail.
    pub fn is_recheck(self) -> bool {
        matches!(self, Self::ApiRecheck)
    }

    /// Raised by the monitor on its own rather than at someone's request.
    /// These only start attempts while the room is being monitored.
    pub fn is_automatic(self) -> bool {
        matches!(self, Self::StatusChanged | Self::ApiRecheck)
    }

    /// A recheck that reaches a live stream continues as an ordinary
    /// API-triggered session.
    pub fn normalized(self) -> Self {
        match self {
            Self::ApiRecheck => Self::ApiTriggered,
            other => other,
        }
    }
}

// ── RoomIdentity ─────────────────────────────────────────────────

/// Who a room belongs to, as resolved by the metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomIdentity {
    /// Public room id, as typed by users (may be a short id).
    pub room_id: u64,
    /// Internal id used by the stream and status endpoints.
    pub real_room_id: u64,
    /// Anchor display name.
    pub streamer_name: String,
}

// ── RecorderFeature ──────────────────────────────────────────────

/// Which outputs a processor should produce.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecorderFeature {
    /// Write the full stream to disk only.
    Record,
    /// Keep a rolling buffer for clips only.
    Clip,
    /// Both.
    #[default]
    RecordAndClip,
}

impl RecorderFeature {
    pub fn records(self) -> bool {
        matches!(self, Self::Record | Self::RecordAndClip)
    }

    pub fn clips(self) -> bool {
        matches!(self, Self::Clip | Self::RecordAndClip)
    }
}

// ── AcquisitionState ─────────────────────────────────────────────

/// Where the room's acquisition state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AcquisitionState {
    #[default]
    Idle,
    Connecting,
    Streaming,
    /// Resources are being released.
    Draining,
    /// A delayed recheck was requested from the monitor.
    Retrying,
}

// ── RoomSnapshot ─────────────────────────────────────────────────

/// Point-in-time view of every observable property of a room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSnapshot {
    pub room_id: u64,
    pub real_room_id: u64,
    pub streamer_name: String,
    pub is_monitoring: bool,
    pub is_recording: bool,
    pub download_speed_kibps: f64,
    pub has_processor: bool,
    pub state: AcquisitionState,
}
