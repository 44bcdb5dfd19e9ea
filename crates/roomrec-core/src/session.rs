// ── Session resources ──
//
// Everything one attempt acquires after a successful connect: the open
// stream, the processor and the speed sampler. `release()` is the only way
// `is_recording` returns to false, and it runs on every exit path (the
// `Drop` impl covers panics and aborted tasks).

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::error::ProcessorError;
use crate::observable::RoomState;
use crate::processor::ProcessorHandle;
use crate::sampler::{SpeedSampler, to_kibps};
use crate::source::ByteStream;

pub(crate) struct SessionResources {
    state: Arc<RoomState>,
    sampler: SpeedSampler,
    stream: Option<ByteStream>,
    processor: Option<ProcessorHandle>,
    released: bool,
}

impl SessionResources {
    pub(crate) fn new(state: Arc<RoomState>) -> Self {
        Self {
            state,
            sampler: SpeedSampler::new(),
            stream: None,
            processor: None,
            released: false,
        }
    }

    /// Take ownership of an accepted stream and its processor, and publish
    /// the session as recording.
    pub(crate) fn attach(&mut self, stream: ByteStream, processor: ProcessorHandle) {
        self.stream = Some(stream);
        self.processor = Some(processor.clone());
        self.sampler.reset();
        self.released = false;
        self.state.set_processor(Some(processor));
        self.state.set_recording(true);
    }

    /// Read the next chunk. Returns `Ok(0)` once the stream is gone.
    pub(crate) async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.stream.as_mut() {
            Some(stream) => stream.read(buf).await,
            None => Ok(0),
        }
    }

    /// Feed a read's byte count to the sampler, publishing a new speed if
    /// one is due.
    pub(crate) fn record_read(&mut self, bytes: usize) {
        if let Some(rate) = self.sampler.record(bytes) {
            self.state.set_download_speed_kibps(to_kibps(rate));
        }
    }

    /// Hand a chunk to the processor.
    pub(crate) fn forward(&self, chunk: &[u8]) -> Result<(), ProcessorError> {
        match &self.processor {
            Some(processor) => processor.lock().add_bytes(chunk),
            None => Err(ProcessorError::Disposed),
        }
    }

    /// Tear everything down. Every step runs even if an earlier one failed.
    pub(crate) fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Some(processor) = self.processor.take() {
            let mut guard = processor.lock();
            if let Err(e) = guard.finalize_file() {
                warn!(error = %e, "failed to finalize stream file");
            }
            if let Err(e) = guard.dispose() {
                warn!(error = %e, "failed to dispose processor");
            }
        }
        self.state.set_processor(None);

        // Dropping the stream closes the response body and its connection.
        self.stream = None;

        self.sampler.reset();
        self.state.set_download_speed_kibps(0.0);

        self.state.set_recording(false);
        debug!("session resources released");
    }
}

impl Drop for SessionResources {
    fn drop(&mut self) {
        self.release();
    }
}
