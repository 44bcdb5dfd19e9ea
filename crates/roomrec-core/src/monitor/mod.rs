// ── Live-status monitor contract ──
//
// The controller never asks the network whether a room is live. It reacts
// to `StatusChanged` events from a monitor and, after a failed or ended
// attempt, asks that monitor to look again later.

mod polling;

use std::time::Duration;

use tokio::sync::broadcast;

use crate::model::Trigger;

pub use polling::{DEFAULT_POLL_INTERVAL, PollingMonitor};

/// The monitor saw the room broadcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChanged {
    pub trigger: Trigger,
}

/// Watches one room's live status.
///
/// Every method returns immediately; checks run in the background and
/// report through [`subscribe`](Self::subscribe).
pub trait LiveStatusMonitor: Send + Sync {
    /// Begin periodic monitoring. Returns `false` if it could not be
    /// started (for example because it is already running).
    fn start(&self) -> bool;

    /// Stop periodic monitoring and drop every check that has not
    /// reported yet.
    fn stop(&self);

    /// Check right away and emit `trigger` if the room is live.
    fn check(&self, trigger: Trigger);

    /// Check once after `delay`, emitting [`Trigger::ApiRecheck`].
    fn check_after_delay(&self, delay: Duration);

    fn subscribe(&self) -> broadcast::Receiver<StatusChanged>;
}
