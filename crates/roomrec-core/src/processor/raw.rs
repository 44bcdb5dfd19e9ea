// ── Pass-through file processor ──
//
// Writes the stream verbatim to disk. It does not look inside the bytes:
// clips are cut on chunk boundaries by arrival time, with the first chunk
// of the stream (which carries the container header) prepended so players
// can open them.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{ProcessorFactory, RecordPaths, StreamProcessor};
use crate::error::ProcessorError;
use crate::model::RecorderFeature;

/// Builds [`RawFileProcessor`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFileProcessorFactory;

impl ProcessorFactory for RawFileProcessorFactory {
    fn initialize(
        &self,
        paths: Arc<dyn RecordPaths>,
        features: RecorderFeature,
    ) -> Result<Box<dyn StreamProcessor>, ProcessorError> {
        Ok(Box::new(RawFileProcessor::new(paths, features)))
    }
}

/// A clip still receiving data until `until`.
struct OpenClip {
    path: PathBuf,
    writer: BufWriter<File>,
    until: Instant,
}

/// Dumps the raw stream into one file per attempt, and cuts clips from
/// the last `clip_past` of data plus the next `clip_future`.
///
/// Files are opened lazily, so attempts that end before any data arrives
/// leave nothing behind.
pub struct RawFileProcessor {
    paths: Arc<dyn RecordPaths>,
    features: RecorderFeature,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    bytes_written: u64,
    clip_past: Duration,
    clip_future: Duration,
    /// First chunk of the stream.
    header: Option<Vec<u8>>,
    /// Chunks received within the last `clip_past`, oldest first.
    recent: VecDeque<(Instant, Vec<u8>)>,
    clips: Vec<OpenClip>,
    disposed: bool,
}

impl RawFileProcessor {
    pub fn new(paths: Arc<dyn RecordPaths>, features: RecorderFeature) -> Self {
        Self {
            paths,
            features,
            writer: None,
            current_path: None,
            bytes_written: 0,
            clip_past: Duration::ZERO,
            clip_future: Duration::ZERO,
            header: None,
            recent: VecDeque::new(),
            clips: Vec::new(),
            disposed: false,
        }
    }

    /// File currently being written, if any.
    pub fn current_path(&self) -> Option<&PathBuf> {
        self.current_path.as_ref()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn clip_lengths(&self) -> (Duration, Duration) {
        (self.clip_past, self.clip_future)
    }

    /// Clips that are still collecting data.
    pub fn open_clips(&self) -> Vec<&Path> {
        self.clips.iter().map(|c| c.path.as_path()).collect()
    }

    /// [`add_bytes`](StreamProcessor::add_bytes) with an explicit clock reading.
    pub fn add_bytes_at(&mut self, chunk: &[u8], now: Instant) -> Result<(), ProcessorError> {
        if self.disposed {
            return Err(ProcessorError::Disposed);
        }
        if self.features.records() {
            self.writer()?.write_all(chunk)?;
            self.bytes_written += u64::try_from(chunk.len()).unwrap_or(u64::MAX);
        }
        if self.features.clips() {
            self.feed_clips(chunk, now)?;
        }
        Ok(())
    }

    /// [`clip`](StreamProcessor::clip) with an explicit clock reading.
    pub fn clip_at(&mut self, now: Instant) -> Result<(), ProcessorError> {
        if !self.features.clips() {
            debug!("clip requested but clipping is disabled");
            return Ok(());
        }
        if self.disposed {
            return Err(ProcessorError::Disposed);
        }

        let path = self.paths.clip_file_path();
        let mut writer = create_file(&path)?;
        if let Some(header) = &self.header {
            writer.write_all(header)?;
        }
        for (_, chunk) in &self.recent {
            writer.write_all(chunk)?;
        }

        info!(path = %path.display(), future_secs = self.clip_future.as_secs(), "clip started");
        self.clips.push(OpenClip {
            path,
            writer,
            until: now + self.clip_future,
        });
        Ok(())
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, ProcessorError> {
        if self.writer.is_none() {
            let path = self.paths.stream_file_path();
            let writer = create_file(&path)?;
            info!(path = %path.display(), "writing stream file");
            self.writer = Some(writer);
            self.current_path = Some(path);
        }
        self.writer.as_mut().ok_or(ProcessorError::Disposed)
    }

    fn feed_clips(&mut self, chunk: &[u8], now: Instant) -> Result<(), ProcessorError> {
        if self.header.is_none() {
            self.header = Some(chunk.to_vec());
        } else {
            self.recent.push_back((now, chunk.to_vec()));
            while self
                .recent
                .front()
                .is_some_and(|(at, _)| now.saturating_duration_since(*at) > self.clip_past)
            {
                self.recent.pop_front();
            }
        }

        for clip in &mut self.clips {
            clip.writer.write_all(chunk)?;
        }

        let (done, open): (Vec<_>, Vec<_>) = std::mem::take(&mut self.clips)
            .into_iter()
            .partition(|clip| now >= clip.until);
        self.clips = open;
        for clip in done {
            close_clip(clip)?;
        }
        Ok(())
    }
}

fn create_file(path: &Path) -> Result<BufWriter<File>, ProcessorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn close_clip(mut clip: OpenClip) -> Result<(), ProcessorError> {
    clip.writer.flush()?;
    info!(path = %clip.path.display(), "clip saved");
    Ok(())
}

impl StreamProcessor for RawFileProcessor {
    fn set_clip_future_length(&mut self, length: Duration) {
        self.clip_future = length;
    }

    fn set_clip_past_length(&mut self, length: Duration) {
        self.clip_past = length;
    }

    fn add_bytes(&mut self, chunk: &[u8]) -> Result<(), ProcessorError> {
        self.add_bytes_at(chunk, Instant::now())
    }

    fn clip(&mut self) -> Result<(), ProcessorError> {
        self.clip_at(Instant::now())
    }

    /// Closes the stream file and every clip, cut short if the stream
    /// ended early.
    fn finalize_file(&mut self) -> Result<(), ProcessorError> {
        let mut result = Ok(());
        for clip in std::mem::take(&mut self.clips) {
            if let Err(e) = close_clip(clip) {
                warn!(error = %e, "failed to close clip");
                result = Err(e);
            }
        }

        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            info!(
                path = %self.current_path.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
                bytes = self.bytes_written,
                "stream file finalized"
            );
        }
        result
    }

    fn dispose(&mut self) -> Result<(), ProcessorError> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        self.recent.clear();
        self.header = None;
        self.finalize_file()
    }
}
