// ── Room controller ──
//
// Public face of one room. Owns the room's observable state, forwards the
// monitor's events into the acquisition state machine, and keeps at most
// one attempt alive at a time.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::acquisition::{AttemptContext, AttemptOutcome, ProcessorSettings, run_attempt};
use crate::config::RecordSettings;
use crate::error::CoreError;
use crate::model::{AcquisitionState, RoomIdentity, RoomSnapshot, Trigger};
use crate::monitor::{LiveStatusMonitor, StatusChanged};
use crate::observable::{RoomProperty, RoomState};
use crate::processor::{ProcessorFactory, ProcessorHandle, RecordInfo, RecordPaths};
use crate::source::{RoomMetadataResolver, StreamConnector, StreamUrlResolver};

/// Collaborators a room needs besides its monitor.
#[derive(Clone)]
pub struct RoomDependencies {
    pub metadata: Arc<dyn RoomMetadataResolver>,
    pub urls: Arc<dyn StreamUrlResolver>,
    pub connector: Arc<dyn StreamConnector>,
    pub processors: Arc<dyn ProcessorFactory>,
}

/// Controller for a single live room.
///
/// Cheaply cloneable via `Arc<RoomInner>`. Dropping the last clone cancels
/// the running attempt and the event forwarding task.
#[derive(Clone)]
pub struct RoomController {
    inner: Arc<RoomInner>,
}

impl fmt::Debug for RoomController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomController")
            .field("room_id", &self.room_id())
            .finish_non_exhaustive()
    }
}

struct RoomInner {
    state: Arc<RoomState>,
    settings: RecordSettings,
    deps: RoomDependencies,
    monitor: Arc<dyn LiveStatusMonitor>,
    paths: RwLock<Arc<dyn RecordPaths>>,
    current: AsyncMutex<Option<Attempt>>,
    cancel: CancellationToken,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

/// The in-flight attempt. Its token is never reused by a later attempt.
struct Attempt {
    id: Uuid,
    trigger: Trigger,
    cancel: CancellationToken,
    task: JoinHandle<AttemptOutcome>,
}

impl RoomController {
    /// Resolve the room's identity and wire it to the monitor built by
    /// `make_monitor`. Does not start monitoring.
    pub async fn create<F>(
        room_id: u64,
        settings: RecordSettings,
        deps: RoomDependencies,
        make_monitor: F,
    ) -> Result<Self, CoreError>
    where
        F: FnOnce(&RoomIdentity) -> Arc<dyn LiveStatusMonitor>,
    {
        let identity = deps.metadata.resolve_room(room_id).await?;
        info!(
            room_id,
            real_room_id = identity.real_room_id,
            streamer = %identity.streamer_name,
            "room resolved"
        );

        let monitor = make_monitor(&identity);
        let paths: Arc<dyn RecordPaths> =
            Arc::new(RecordInfo::new(settings.output_dir.clone(), &identity));
        let events = monitor.subscribe();

        let inner = Arc::new(RoomInner {
            state: RoomState::new(&identity),
            settings,
            deps,
            monitor,
            paths: RwLock::new(paths),
            current: AsyncMutex::new(None),
            cancel: CancellationToken::new(),
            forwarder: Mutex::new(None),
        });

        let handle = tokio::spawn(forward_events(
            Arc::downgrade(&inner),
            events,
            inner.cancel.clone(),
        ));
        *inner.forwarder.lock() = Some(handle);

        Ok(Self { inner })
    }

    // ── Monitoring ───────────────────────────────────────────────

    /// Start the monitor. Returns whether monitoring is now enabled.
    pub fn start(&self) -> bool {
        let started = self.inner.monitor.start();
        if started {
            self.inner.state.set_monitoring(true);
            info!(room_id = self.room_id(), "monitoring started");
        } else {
            debug!(room_id = self.room_id(), "monitor refused to start");
        }
        started
    }

    pub fn stop(&self) {
        self.inner.monitor.stop();
        self.inner.state.set_monitoring(false);
        info!(room_id = self.room_id(), "monitoring stopped");
    }

    // ── Recording ────────────────────────────────────────────────

    /// Ask the monitor for an immediate check; a live room then starts an
    /// attempt with [`Trigger::Manual`].
    pub fn start_record(&self) {
        self.inner.monitor.check(Trigger::Manual);
    }

    /// Cancel the running attempt, if any, and wait until its resources
    /// are released.
    pub async fn stop_record(&self) -> Option<AttemptOutcome> {
        let mut current = self.inner.current.lock().await;
        let attempt = current.take()?;

        debug!(room_id = self.room_id(), attempt = %attempt.id, "stopping attempt");
        attempt.cancel.cancel();
        reap(attempt).await
    }

    /// Wait for the running attempt to finish on its own.
    ///
    /// Triggers arriving meanwhile are dropped, as they would be while the
    /// attempt runs.
    pub async fn join_attempt(&self) -> Option<AttemptOutcome> {
        let mut current = self.inner.current.lock().await;
        let attempt = current.take()?;
        reap(attempt).await
    }

    /// Start an attempt for `trigger` unless one is still running.
    ///
    /// Returns `true` if a new attempt was spawned. Monitor events go
    /// through the same path, except that `StatusChanged` and `ApiRecheck`
    /// events are dropped while monitoring is off.
    pub async fn on_status_changed(&self, trigger: Trigger) -> bool {
        self.begin_attempt(trigger, false).await
    }

    async fn begin_attempt(&self, trigger: Trigger, from_monitor: bool) -> bool {
        let mut current = self.inner.current.lock().await;

        // Checked under the lock so a trigger racing `shutdown` cannot
        // slip in after `stop_record` has run.
        if from_monitor && trigger.is_automatic() && !self.is_monitoring() {
            debug!(room_id = self.room_id(), %trigger, "not monitoring, trigger dropped");
            return false;
        }

        if let Some(attempt) = current.as_ref() {
            if !attempt.task.is_finished() {
                debug!(
                    room_id = self.room_id(),
                    %trigger,
                    running = %attempt.trigger,
                    "already recording, trigger ignored"
                );
                return false;
            }
        }
        if let Some(finished) = current.take() {
            reap(finished).await;
        }

        let id = Uuid::new_v4();
        let cancel = self.inner.cancel.child_token();
        let task = tokio::spawn(run_attempt(
            self.inner.attempt_context(),
            id,
            trigger,
            cancel.clone(),
        ));
        *current = Some(Attempt {
            id,
            trigger,
            cancel,
            task,
        });
        true
    }

    /// Ask the current processor for a clip. No-op without one.
    pub fn clip(&self) {
        let Some(processor) = self.inner.state.processor() else {
            debug!(room_id = self.room_id(), "clip requested while idle");
            return;
        };
        if let Err(e) = processor.lock().clip() {
            warn!(room_id = self.room_id(), error = %e, "clip failed");
        }
    }

    /// Stop monitoring, then stop recording.
    pub async fn shutdown(&self) {
        self.stop();
        self.stop_record().await;
    }

    /// Look the room up again and publish any identity change. Later
    /// attempts write under the refreshed name.
    ///
    /// The internal id is fixed for the controller's lifetime: the monitor
    /// was built for it. A different id from the lookup is logged and
    /// ignored.
    pub async fn refresh_room_info(&self) -> Result<bool, CoreError> {
        let mut identity = self
            .inner
            .deps
            .metadata
            .resolve_room(self.room_id())
            .await?;

        let real_room_id = self.real_room_id();
        if identity.real_room_id != real_room_id {
            warn!(
                room_id = self.room_id(),
                real_room_id,
                resolved = identity.real_room_id,
                "internal room id changed, keeping the monitored one"
            );
            identity.real_room_id = real_room_id;
        }

        *self.inner.paths.write() = Arc::new(RecordInfo::new(
            self.inner.settings.output_dir.clone(),
            &identity,
        ));
        Ok(self.inner.state.set_identity(identity))
    }

    // ── Observables ──────────────────────────────────────────────

    pub fn room_id(&self) -> u64 {
        self.inner.state.room_id()
    }

    pub fn real_room_id(&self) -> u64 {
        self.inner.state.real_room_id()
    }

    pub fn streamer_name(&self) -> String {
        self.inner.state.streamer_name()
    }

    pub fn is_monitoring(&self) -> bool {
        self.inner.state.is_monitoring()
    }

    pub fn is_recording(&self) -> bool {
        self.inner.state.is_recording()
    }

    /// Last published download speed in KiB/s.
    pub fn download_speed_kibps(&self) -> f64 {
        self.inner.state.download_speed_kibps()
    }

    /// The running attempt's processor.
    pub fn processor(&self) -> Option<ProcessorHandle> {
        self.inner.state.processor()
    }

    /// Current state of the acquisition state machine.
    pub fn state(&self) -> watch::Receiver<AcquisitionState> {
        self.inner.state.watch_acquisition_state()
    }

    pub fn watch_recording(&self) -> watch::Receiver<bool> {
        self.inner.state.watch_recording()
    }

    /// Name of every property as it changes. Dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomProperty> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        self.inner.state.snapshot()
    }
}

impl RoomInner {
    fn attempt_context(&self) -> AttemptContext {
        AttemptContext {
            state: Arc::clone(&self.state),
            urls: Arc::clone(&self.deps.urls),
            connector: Arc::clone(&self.deps.connector),
            processors: Arc::clone(&self.deps.processors),
            paths: Arc::clone(&self.paths.read()),
            monitor: Arc::clone(&self.monitor),
            settings: ProcessorSettings {
                features: self.settings.features,
                clip_past: self.settings.clip_past,
                clip_future: self.settings.clip_future,
            },
        }
    }
}

impl Drop for RoomInner {
    fn drop(&mut self) {
        self.monitor.stop();
        // Attempt tokens are children of this one.
        self.cancel.cancel();
        if let Some(handle) = self.forwarder.get_mut().take() {
            handle.abort();
        }
    }
}

async fn reap(attempt: Attempt) -> Option<AttemptOutcome> {
    match attempt.task.await {
        Ok(outcome) => {
            debug!(attempt = %outcome.id, end = ?outcome.end, "attempt finished");
            Some(outcome)
        }
        Err(e) => {
            warn!(attempt = %attempt.id, error = %e, "attempt task failed");
            None
        }
    }
}

// ── Background task ──────────────────────────────────────────────

/// Forward monitor events into the room. Holds only a weak reference so
/// the room can be dropped while the task waits.
async fn forward_events(
    room: Weak<RoomInner>,
    mut events: broadcast::Receiver<StatusChanged>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Ok(StatusChanged { trigger }) => {
                let Some(inner) = room.upgrade() else { break };
                RoomController { inner }.begin_attempt(trigger, true).await;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "monitor events lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
