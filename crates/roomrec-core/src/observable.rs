// ── Observable room properties ──
//
// Every externally visible room value lives in an `Observable<T>` backed by
// a `watch` channel. Writes that do not change the value are dropped; writes
// that do change it broadcast the property name on the room's event channel
// synchronously, on whichever task performed the write.

use std::sync::Arc;

use strum::{AsRefStr, Display};
use tokio::sync::{broadcast, watch};

use crate::model::{AcquisitionState, RoomIdentity, RoomSnapshot};
use crate::processor::ProcessorHandle;

const PROPERTY_CHANNEL_SIZE: usize = 256;

/// Name of a room property whose value just changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum RoomProperty {
    RoomId,
    RealRoomId,
    StreamerName,
    IsMonitoring,
    IsRecording,
    DownloadSpeedKiBps,
    Processor,
    State,
}

/// A single observable value.
pub(crate) struct Observable<T> {
    name: RoomProperty,
    value: watch::Sender<T>,
}

impl<T: PartialEq> Observable<T> {
    fn new(name: RoomProperty, initial: T) -> Self {
        let (value, _) = watch::channel(initial);
        Self { name, value }
    }

    /// Store `new` and notify listeners. Returns `true` if the value changed.
    fn set(&self, new: T, events: &broadcast::Sender<RoomProperty>) -> bool {
        let changed = self.value.send_if_modified(|current| {
            if *current == new {
                false
            } else {
                *current = new;
                true
            }
        });
        if changed {
            // No subscribers is fine.
            let _ = events.send(self.name);
        }
        changed
    }

    fn subscribe(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }
}

impl<T: Clone> Observable<T> {
    fn get(&self) -> T {
        self.value.borrow().clone()
    }
}

/// All observable state of one room.
///
/// Shared between the room controller and its attempt task. Only the
/// attempt task and the controller's teardown path write to it.
pub(crate) struct RoomState {
    events: broadcast::Sender<RoomProperty>,
    room_id: Observable<u64>,
    real_room_id: Observable<u64>,
    streamer_name: Observable<String>,
    is_monitoring: Observable<bool>,
    is_recording: Observable<bool>,
    download_speed_kibps: Observable<f64>,
    processor: Observable<Option<ProcessorHandle>>,
    state: Observable<AcquisitionState>,
}

impl RoomState {
    pub(crate) fn new(identity: &RoomIdentity) -> Arc<Self> {
        let (events, _) = broadcast::channel(PROPERTY_CHANNEL_SIZE);
        Arc::new(Self {
            events,
            room_id: Observable::new(RoomProperty::RoomId, identity.room_id),
            real_room_id: Observable::new(RoomProperty::RealRoomId, identity.real_room_id),
            streamer_name: Observable::new(
                RoomProperty::StreamerName,
                identity.streamer_name.clone(),
            ),
            is_monitoring: Observable::new(RoomProperty::IsMonitoring, false),
            is_recording: Observable::new(RoomProperty::IsRecording, false),
            download_speed_kibps: Observable::new(RoomProperty::DownloadSpeedKiBps, 0.0),
            processor: Observable::new(RoomProperty::Processor, None),
            state: Observable::new(RoomProperty::State, AcquisitionState::Idle),
        })
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<RoomProperty> {
        self.events.subscribe()
    }

    // ── Identity ─────────────────────────────────────────────────

    pub(crate) fn room_id(&self) -> u64 {
        self.room_id.get()
    }

    pub(crate) fn real_room_id(&self) -> u64 {
        self.real_room_id.get()
    }

    pub(crate) fn streamer_name(&self) -> String {
        self.streamer_name.get()
    }

    pub(crate) fn identity(&self) -> RoomIdentity {
        RoomIdentity {
            room_id: self.room_id(),
            real_room_id: self.real_room_id(),
            streamer_name: self.streamer_name(),
        }
    }

    /// Apply a refreshed identity. Returns `true` if anything changed.
    pub(crate) fn set_identity(&self, identity: RoomIdentity) -> bool {
        let a = self.room_id.set(identity.room_id, &self.events);
        let b = self.real_room_id.set(identity.real_room_id, &self.events);
        let c = self.streamer_name.set(identity.streamer_name, &self.events);
        a || b || c
    }

    // ── Activity ─────────────────────────────────────────────────

    pub(crate) fn is_monitoring(&self) -> bool {
        self.is_monitoring.get()
    }

    pub(crate) fn set_monitoring(&self, monitoring: bool) {
        self.is_monitoring.set(monitoring, &self.events);
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.is_recording.get()
    }

    pub(crate) fn set_recording(&self, recording: bool) {
        self.is_recording.set(recording, &self.events);
    }

    pub(crate) fn download_speed_kibps(&self) -> f64 {
        self.download_speed_kibps.get()
    }

    pub(crate) fn set_download_speed_kibps(&self, speed: f64) {
        self.download_speed_kibps.set(speed, &self.events);
    }

    pub(crate) fn processor(&self) -> Option<ProcessorHandle> {
        self.processor.get()
    }

    pub(crate) fn set_processor(&self, processor: Option<ProcessorHandle>) {
        self.processor.set(processor, &self.events);
    }

    pub(crate) fn acquisition_state(&self) -> AcquisitionState {
        self.state.get()
    }

    pub(crate) fn set_acquisition_state(&self, state: AcquisitionState) {
        self.state.set(state, &self.events);
    }

    pub(crate) fn watch_acquisition_state(&self) -> watch::Receiver<AcquisitionState> {
        self.state.subscribe()
    }

    pub(crate) fn watch_recording(&self) -> watch::Receiver<bool> {
        self.is_recording.subscribe()
    }

    pub(crate) fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id(),
            real_room_id: self.real_room_id(),
            streamer_name: self.streamer_name(),
            is_monitoring: self.is_monitoring(),
            is_recording: self.is_recording(),
            download_speed_kibps: self.download_speed_kibps(),
            has_processor: self.processor.value.borrow().is_some(),
            state: self.acquisition_state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> RoomIdentity {
        RoomIdentity {
            room_id: 1017,
            real_room_id: 21_452_505,
            streamer_name: "streamer".into(),
        }
    }

    fn drain(rx: &mut broadcast::Receiver<RoomProperty>) -> Vec<RoomProperty> {
        let mut seen = Vec::new();
        while let Ok(prop) = rx.try_recv() {
            seen.push(prop);
        }
        seen
    }

    #[test]
    fn same_value_writes_are_silent() {
        let state = RoomState::new(&identity());
        let mut rx = state.subscribe();

        state.set_recording(false);
        state.set_download_speed_kibps(0.0);
        state.set_acquisition_state(AcquisitionState::Idle);

        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn changes_notify_once_per_change() {
        let state = RoomState::new(&identity());
        let mut rx = state.subscribe();

        state.set_recording(true);
        state.set_recording(true);
        state.set_monitoring(true);
        state.set_recording(false);

        assert_eq!(
            drain(&mut rx),
            vec![
                RoomProperty::IsRecording,
                RoomProperty::IsMonitoring,
                RoomProperty::IsRecording
            ]
        );
    }

    #[test]
    fn identity_refresh_reports_only_changed_fields() {
        let state = RoomState::new(&identity());
        let mut rx = state.subscribe();

        let changed = state.set_identity(RoomIdentity {
            streamer_name: "renamed".into(),
            ..identity()
        });

        assert!(changed);
        assert_eq!(drain(&mut rx), vec![RoomProperty::StreamerName]);
        assert_eq!(state.streamer_name(), "renamed");
        assert!(!state.set_identity(state.identity()));
    }

    #[test]
    fn property_names_render() {
        assert_eq!(RoomProperty::DownloadSpeedKiBps.as_ref(), "DownloadSpeedKiBps");
        assert_eq!(RoomProperty::IsRecording.to_string(), "IsRecording");
    }
}
