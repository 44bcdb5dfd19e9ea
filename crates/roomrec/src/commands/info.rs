//! `roomrec info` -- print a room's resolved metadata.

use roomrec_api::LiveClient;
use roomrec_core::RoomMetadataResolver;
use serde::Serialize;

use crate::cli::{GlobalOpts, InfoArgs};
use crate::config;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct RoomInfoOutput {
    room_id: u64,
    real_room_id: u64,
    short_id: u64,
    streamer_name: String,
    title: String,
    live_status: i32,
    is_live: bool,
}

pub async fn handle(args: InfoArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let runtime = config::recorder_config(global, &cfg)?;
    let client = LiveClient::new(runtime.api_base, &runtime.transport)?;

    let identity = client.resolve_room(args.room_id).await?;
    let info = client.room_info(identity.real_room_id).await?;

    let output = RoomInfoOutput {
        room_id: identity.room_id,
        real_room_id: identity.real_room_id,
        short_id: info.short_id,
        streamer_name: identity.streamer_name,
        is_live: info.is_live(),
        title: info.title,
        live_status: info.live_status,
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::Internal(format!("failed to render JSON: {e}")))?;
    println!("{json}");
    Ok(())
}
