// ── Multi-room recorder ──
//
// Wires the production collaborators (live API, HTTP stream connector,
// raw file processor, polling monitor) into one controller per room.

use std::sync::Arc;

use roomrec_api::{LiveClient, StreamClient};
use tracing::info;

use crate::config::RecorderConfig;
use crate::controller::{RoomController, RoomDependencies};
use crate::error::CoreError;
use crate::monitor::{LiveStatusMonitor, PollingMonitor};
use crate::processor::{ProcessorFactory, RawFileProcessorFactory};
use crate::source::{HttpConnector, LiveStatusSource};

/// Set of rooms sharing one HTTP stack and configuration.
pub struct Recorder {
    config: RecorderConfig,
    live: LiveClient,
    connector: HttpConnector,
    processors: Arc<dyn ProcessorFactory>,
    rooms: Vec<RoomController>,
}

impl Recorder {
    pub fn new(config: RecorderConfig) -> Result<Self, CoreError> {
        let live = LiveClient::new(config.api_base.clone(), &config.transport)?;
        let connector = HttpConnector::new(StreamClient::new(&config.transport)?);
        Ok(Self {
            config,
            live,
            connector,
            processors: Arc::new(RawFileProcessorFactory),
            rooms: Vec::new(),
        })
    }

    /// Use a different processor for rooms added from now on.
    #[must_use]
    pub fn with_processor_factory(mut self, processors: Arc<dyn ProcessorFactory>) -> Self {
        self.processors = processors;
        self
    }

    pub fn rooms(&self) -> &[RoomController] {
        &self.rooms
    }

    pub fn room(&self, room_id: u64) -> Option<&RoomController> {
        self.rooms.iter().find(|r| r.room_id() == room_id)
    }

    /// Resolve and register a room. Adding a room twice returns the
    /// existing controller.
    pub async fn add_room(&mut self, room_id: u64) -> Result<RoomController, CoreError> {
        if let Some(existing) = self.room(room_id) {
            return Ok(existing.clone());
        }

        let deps = RoomDependencies {
            metadata: Arc::new(self.live.clone()),
            urls: Arc::new(self.live.clone()),
            connector: Arc::new(self.connector.clone()),
            processors: Arc::clone(&self.processors),
        };
        let source: Arc<dyn LiveStatusSource> = Arc::new(self.live.clone());
        let interval = self.config.poll_interval;

        let room = RoomController::create(room_id, self.config.record.clone(), deps, |identity| {
            Arc::new(PollingMonitor::new(identity.real_room_id, source, interval))
                as Arc<dyn LiveStatusMonitor>
        })
        .await?;

        info!(room_id, streamer = %room.streamer_name(), "room added");
        self.rooms.push(room.clone());
        Ok(room)
    }

    /// Start monitoring every room. Returns how many started.
    pub fn start_all(&self) -> usize {
        self.rooms.iter().filter(|room| room.start()).count()
    }

    /// Shut every room down and wait for their attempts to finish.
    pub async fn shutdown_all(&self) {
        futures_util::future::join_all(self.rooms.iter().map(RoomController::shutdown)).await;
        info!(rooms = self.rooms.len(), "all rooms shut down");
    }
}
