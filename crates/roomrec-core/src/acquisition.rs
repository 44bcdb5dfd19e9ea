// ── Acquisition state machine ──
//
// One attempt: Connecting → Streaming → Draining → (Retrying →) Idle.
// Every failure is an `AttemptEnd` value; `recheck_delay` turns it into
// the retry decision. Nothing inside an attempt propagates to the
// controller's public operations.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::error::ProcessorError;
use crate::model::{AcquisitionState, RecorderFeature, Trigger};
use crate::monitor::LiveStatusMonitor;
use crate::observable::RoomState;
use crate::processor::{ProcessorFactory, ProcessorHandle, RecordPaths};
use crate::session::SessionResources;
use crate::source::{ConnectError, Connected, StreamConnector, StreamUrlResolver};

/// Wait before asking the monitor to look again after a failed or ended
/// attempt.
pub const RETRY_DELAY: Duration = Duration::from_secs(15);

/// Bytes requested per stream read.
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

/// How an attempt finished.
#[derive(Debug)]
pub enum AttemptEnd {
    /// No stream was obtained: URL lookup, transport or status failure.
    ConnectFailed(ConnectError),
    /// The server closed the stream.
    StreamEnded,
    /// The attempt was stopped on request.
    Cancelled,
    ReadFailed(io::Error),
    /// The processor could not be created or refused data.
    SinkFailed(ProcessorError),
}

impl AttemptEnd {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result of a finished attempt.
#[derive(Debug)]
pub struct AttemptOutcome {
    pub id: Uuid,
    /// Effective trigger; a recheck that connected is reported as
    /// [`Trigger::ApiTriggered`].
    pub trigger: Trigger,
    pub end: AttemptEnd,
    /// Delay handed to the monitor, if a recheck was scheduled.
    pub recheck: Option<Duration>,
}

/// Retry decision for an attempt started by `trigger` that ended with `end`.
///
/// Recheck-driven attempts never reschedule themselves, and neither do
/// attempts stopped on request. Everything else waits [`RETRY_DELAY`].
pub fn recheck_delay(trigger: Trigger, end: &AttemptEnd) -> Option<Duration> {
    if trigger.is_recheck() || end.is_cancelled() {
        None
    } else {
        Some(RETRY_DELAY)
    }
}

/// Per-attempt processor settings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProcessorSettings {
    pub(crate) features: RecorderFeature,
    pub(crate) clip_past: Duration,
    pub(crate) clip_future: Duration,
}

/// Everything an attempt task needs, captured when it starts.
pub(crate) struct AttemptContext {
    pub(crate) state: Arc<RoomState>,
    pub(crate) urls: Arc<dyn StreamUrlResolver>,
    pub(crate) connector: Arc<dyn StreamConnector>,
    pub(crate) processors: Arc<dyn ProcessorFactory>,
    pub(crate) paths: Arc<dyn RecordPaths>,
    pub(crate) monitor: Arc<dyn LiveStatusMonitor>,
    pub(crate) settings: ProcessorSettings,
}

impl AttemptContext {
    fn open_processor(&self) -> Result<ProcessorHandle, ProcessorError> {
        let mut processor = self
            .processors
            .initialize(Arc::clone(&self.paths), self.settings.features)?;
        processor.set_clip_future_length(self.settings.clip_future);
        processor.set_clip_past_length(self.settings.clip_past);
        Ok(ProcessorHandle::new(processor))
    }
}

/// Run one attempt to completion. Resources are released before this
/// returns, whatever the outcome.
pub(crate) async fn run_attempt(
    ctx: AttemptContext,
    id: Uuid,
    trigger: Trigger,
    cancel: CancellationToken,
) -> AttemptOutcome {
    let span = info_span!("attempt", room_id = ctx.state.room_id(), attempt = %id);
    drive(ctx, id, trigger, cancel).instrument(span).await
}

async fn drive(
    ctx: AttemptContext,
    id: Uuid,
    mut trigger: Trigger,
    cancel: CancellationToken,
) -> AttemptOutcome {
    info!(%trigger, "starting attempt");
    ctx.state.set_acquisition_state(AcquisitionState::Connecting);
    let mut session = SessionResources::new(Arc::clone(&ctx.state));

    let end = match connect(&ctx, &cancel).await {
        Err(end) => end,
        Ok(connected) => {
            trigger = trigger.normalized();
            match ctx.open_processor() {
                Err(e) => AttemptEnd::SinkFailed(e),
                Ok(processor) => {
                    info!(url = %connected.url, "stream connected");
                    session.attach(connected.stream, processor);
                    ctx.state.set_acquisition_state(AcquisitionState::Streaming);
                    stream_loop(&mut session, &cancel).await
                }
            }
        }
    };

    ctx.state.set_acquisition_state(AcquisitionState::Draining);
    session.release();
    log_end(&end);

    let recheck = recheck_delay(trigger, &end);
    if let Some(delay) = recheck {
        ctx.state.set_acquisition_state(AcquisitionState::Retrying);
        ctx.monitor.check_after_delay(delay);
    }
    ctx.state.set_acquisition_state(AcquisitionState::Idle);

    AttemptOutcome {
        id,
        trigger,
        end,
        recheck,
    }
}

async fn connect(ctx: &AttemptContext, cancel: &CancellationToken) -> Result<Connected, AttemptEnd> {
    let real_room_id = ctx.state.real_room_id();
    let open = async {
        let url = ctx
            .urls
            .stream_url(real_room_id)
            .await
            .map_err(ConnectError::Resolve)?;
        ctx.connector.connect(&url).await
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(AttemptEnd::Cancelled),
        result = open => result.map_err(AttemptEnd::ConnectFailed),
    }
}

async fn stream_loop(session: &mut SessionResources, cancel: &CancellationToken) -> AttemptEnd {
    let mut buf = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let read = tokio::select! {
            biased;
            () = cancel.cancelled() => Ok(0),
            read = session.read(&mut buf) => read,
        };

        let n = match read {
            Ok(n) => n,
            Err(e) => return AttemptEnd::ReadFailed(e),
        };

        session.record_read(n);

        if n == 0 {
            return if cancel.is_cancelled() {
                AttemptEnd::Cancelled
            } else {
                AttemptEnd::StreamEnded
            };
        }

        if let Err(e) = session.forward(&buf[..n]) {
            return AttemptEnd::SinkFailed(e);
        }
    }
}

fn log_end(end: &AttemptEnd) {
    match end {
        AttemptEnd::ConnectFailed(e) if e.is_not_found() => {
            warn!("stream url returned 404, room may have just gone offline");
        }
        AttemptEnd::ConnectFailed(ConnectError::Rejected { status }) => {
            warn!(status, "stream request rejected");
        }
        AttemptEnd::ConnectFailed(e) => warn!(error = %e, "connect failed"),
        AttemptEnd::StreamEnded => info!("stream ended"),
        AttemptEnd::Cancelled => info!("recording stopped on request"),
        AttemptEnd::ReadFailed(e) => warn!(error = %e, "stream read failed"),
        AttemptEnd::SinkFailed(e) => error!(error = %e, "processor failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> AttemptEnd {
        AttemptEnd::ConnectFailed(ConnectError::Rejected { status: 404 })
    }

    #[test]
    fn recheck_trigger_never_reschedules() {
        for end in [rejected(), AttemptEnd::StreamEnded, AttemptEnd::Cancelled] {
            assert_eq!(recheck_delay(Trigger::ApiRecheck, &end), None, "{end:?}");
        }
    }

    #[test]
    fn other_triggers_reschedule_after_fifteen_seconds() {
        for trigger in [Trigger::Manual, Trigger::ApiTriggered, Trigger::StatusChanged] {
            assert_eq!(recheck_delay(trigger, &rejected()), Some(RETRY_DELAY));
            assert_eq!(recheck_delay(trigger, &AttemptEnd::StreamEnded), Some(RETRY_DELAY));
            assert_eq!(
                recheck_delay(trigger, &AttemptEnd::ReadFailed(io::Error::other("reset"))),
                Some(RETRY_DELAY)
            );
        }
        assert_eq!(RETRY_DELAY, Duration::from_secs(15));
    }

    #[test]
    fn stop_request_suppresses_recheck() {
        assert_eq!(recheck_delay(Trigger::Manual, &AttemptEnd::Cancelled), None);
    }
}
