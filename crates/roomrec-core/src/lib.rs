//! Per-room live stream acquisition for roomrec.
//!
//! A [`RoomController`] watches one room through a [`LiveStatusMonitor`],
//! opens the stream when the room goes live, and pushes every byte into a
//! [`StreamProcessor`]. At most one attempt runs per room; failed or ended
//! attempts ask the monitor to check again after [`RETRY_DELAY`].
//!
//! [`Recorder`] wires the production collaborators for a set of rooms.

pub mod acquisition;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod monitor;
mod observable;
pub mod processor;
pub mod recorder;
pub mod sampler;
mod session;
pub mod source;

pub use acquisition::{AttemptEnd, AttemptOutcome, READ_CHUNK_SIZE, RETRY_DELAY, recheck_delay};
pub use config::{RecordSettings, RecorderConfig};
pub use controller::{RoomController, RoomDependencies};
pub use error::{CoreError, ProcessorError};
pub use model::{AcquisitionState, RecorderFeature, RoomIdentity, RoomSnapshot, Trigger};
pub use monitor::{LiveStatusMonitor, PollingMonitor, StatusChanged};
pub use observable::RoomProperty;
pub use processor::{
    ProcessorFactory, ProcessorHandle, RawFileProcessor, RawFileProcessorFactory, RecordInfo,
    RecordPaths, StreamProcessor,
};
pub use recorder::Recorder;
pub use sampler::SpeedSampler;
pub use source::{
    ByteStream, ConnectError, Connected, HttpConnector, LiveStatusSource, RoomMetadataResolver,
    StreamConnector, StreamUrlResolver,
};
