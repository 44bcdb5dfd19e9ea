// ── Polling live-status monitor ──
//
// Asks a `LiveStatusSource` on a fixed interval and emits `StatusChanged`
// on every poll that finds the room live. Repeats are harmless: the room
// controller drops triggers that arrive while an attempt is running.
//
// One-off checks belong to the current monitoring session. `stop()` ends
// the session, so a recheck scheduled before it never reports.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{LiveStatusMonitor, StatusChanged};
use crate::model::Trigger;
use crate::source::LiveStatusSource;

const EVENT_CHANNEL_SIZE: usize = 16;

/// Default time between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// [`LiveStatusMonitor`] that polls the live API.
pub struct PollingMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    real_room_id: u64,
    source: Arc<dyn LiveStatusSource>,
    interval: Duration,
    events: broadcast::Sender<StatusChanged>,
    /// Token of the running poll loop, if any.
    polling: Mutex<Option<CancellationToken>>,
    /// Parent of pending `check` / `check_after_delay` tasks. Replaced on
    /// every `stop()`.
    session: Mutex<CancellationToken>,
    /// Parent of every task this monitor spawns.
    cancel: CancellationToken,
}

impl PollingMonitor {
    pub fn new(
        real_room_id: u64,
        source: Arc<dyn LiveStatusSource>,
        interval: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        Self {
            inner: Arc::new(MonitorInner {
                real_room_id,
                source,
                interval,
                events,
                polling: Mutex::new(None),
                session: Mutex::new(cancel.child_token()),
                cancel,
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.polling.lock().is_some()
    }
}

impl Drop for PollingMonitor {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}

impl LiveStatusMonitor for PollingMonitor {
    fn start(&self) -> bool {
        let mut polling = self.inner.polling.lock();
        if polling.is_some() {
            return false;
        }

        let token = self.inner.cancel.child_token();
        tokio::spawn(poll_task(Arc::clone(&self.inner), token.clone()));
        *polling = Some(token);
        debug!(room_id = self.inner.real_room_id, "monitor started");
        true
    }

    fn stop(&self) {
        let pending = std::mem::replace(
            &mut *self.inner.session.lock(),
            self.inner.cancel.child_token(),
        );
        pending.cancel();

        if let Some(token) = self.inner.polling.lock().take() {
            token.cancel();
            debug!(room_id = self.inner.real_room_id, "monitor stopped");
        }
    }

    fn check(&self, trigger: Trigger) {
        let inner = Arc::clone(&self.inner);
        let session = inner.session.lock().clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = session.cancelled() => {}
                () = inner.check_and_emit(trigger) => {}
            }
        });
    }

    fn check_after_delay(&self, delay: Duration) {
        let inner = Arc::clone(&self.inner);
        let session = inner.session.lock().clone();
        debug!(room_id = inner.real_room_id, delay_secs = delay.as_secs(), "recheck scheduled");
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = session.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }
            tokio::select! {
                biased;
                () = session.cancelled() => {}
                () = inner.check_and_emit(Trigger::ApiRecheck) => {}
            }
        });
    }

    fn subscribe(&self) -> broadcast::Receiver<StatusChanged> {
        self.inner.events.subscribe()
    }
}

impl MonitorInner {
    async fn check_and_emit(&self, trigger: Trigger) {
        match self.source.is_live(self.real_room_id).await {
            Ok(true) => {
                trace!(room_id = self.real_room_id, %trigger, "room is live");
                let _ = self.events.send(StatusChanged { trigger });
            }
            Ok(false) => trace!(room_id = self.real_room_id, %trigger, "room is offline"),
            Err(e) => warn!(room_id = self.real_room_id, error = %e, "live status check failed"),
        }
    }
}

// ── Background task ──────────────────────────────────────────────

async fn poll_task(inner: Arc<MonitorInner>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(inner.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = inner.check_and_emit(Trigger::StatusChanged) => {}
                }
            }
        }
    }
}
