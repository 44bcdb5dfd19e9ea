//! `roomrec record` -- monitor rooms and record until Ctrl-C.

use roomrec_core::Recorder;
use tracing::{info, warn};

use crate::cli::{GlobalOpts, RecordArgs};
use crate::config;
use crate::error::CliError;

pub async fn handle(args: RecordArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let rooms = if args.rooms.is_empty() {
        cfg.rooms.clone()
    } else {
        args.rooms
    };
    if rooms.is_empty() {
        return Err(CliError::NoRooms {
            path: config::config_file(global).display().to_string(),
        });
    }

    let runtime = config::recorder_config(global, &cfg)?;
    let output_dir = runtime.record.output_dir.clone();
    let mut recorder = Recorder::new(runtime)?;

    for room_id in rooms {
        recorder.add_room(room_id).await?;
    }

    let started = recorder.start_all();
    info!(
        rooms = recorder.rooms().len(),
        started,
        output_dir = %output_dir.display(),
        "recording, press Ctrl-C to stop"
    );
    if args.now {
        for room in recorder.rooms() {
            room.start_record();
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for Ctrl-C, shutting down");
    }

    info!("shutting down");
    recorder.shutdown_all().await;
    Ok(())
}
