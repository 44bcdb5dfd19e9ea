// ── Stream processor contract ──
//
// The controller treats a processor as an opaque byte sink: it creates
// one per attempt, pushes every chunk into it, and finalizes and disposes
// it when the attempt ends. Demuxing, file layout and clip cutting are the
// processor's business.

mod paths;
mod raw;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::error::ProcessorError;
use crate::model::RecorderFeature;

pub use paths::RecordInfo;
pub use raw::{RawFileProcessor, RawFileProcessorFactory};

/// Where a processor should put its output.
pub trait RecordPaths: Send + Sync {
    /// Path for a new full-stream file.
    fn stream_file_path(&self) -> PathBuf;

    /// Path for a new clip file.
    fn clip_file_path(&self) -> PathBuf;
}

/// A byte sink for one acquisition attempt.
pub trait StreamProcessor: Send {
    /// How much stream to keep after a clip request.
    fn set_clip_future_length(&mut self, length: Duration);

    /// How much already-received stream a clip includes.
    fn set_clip_past_length(&mut self, length: Duration);

    /// Consume the next slice of the raw stream.
    fn add_bytes(&mut self, chunk: &[u8]) -> Result<(), ProcessorError>;

    /// Cut a clip around the current position.
    fn clip(&mut self) -> Result<(), ProcessorError>;

    /// Flush and close any partial output.
    fn finalize_file(&mut self) -> Result<(), ProcessorError>;

    /// Release everything the processor holds. Called exactly once, after
    /// [`finalize_file`](Self::finalize_file).
    fn dispose(&mut self) -> Result<(), ProcessorError>;
}

/// Builds a fresh processor for every attempt.
pub trait ProcessorFactory: Send + Sync {
    fn initialize(
        &self,
        paths: Arc<dyn RecordPaths>,
        features: RecorderFeature,
    ) -> Result<Box<dyn StreamProcessor>, ProcessorError>;
}

/// Shared reference to the current attempt's processor.
///
/// The read loop feeds it while the controller may call
/// [`clip`](StreamProcessor::clip) on it from another task. Two handles
/// are equal only if they point at the same processor.
#[derive(Clone)]
pub struct ProcessorHandle {
    inner: Arc<Mutex<Box<dyn StreamProcessor>>>,
}

impl ProcessorHandle {
    pub fn new(processor: Box<dyn StreamProcessor>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(processor)),
        }
    }

    /// Lock the processor. Never hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn StreamProcessor>> {
        self.inner.lock()
    }
}

impl PartialEq for ProcessorHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ProcessorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorHandle")
            .field("ptr", &Arc::as_ptr(&self.inner))
            .finish()
    }
}
