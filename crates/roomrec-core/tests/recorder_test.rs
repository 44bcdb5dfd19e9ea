#![allow(clippy::unwrap_used)]
// End-to-end tests for `Recorder` against a wiremock live API and CDN.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roomrec_core::{CoreError, Recorder, RecorderConfig, RecordSettings, RoomProperty};

// ── Helpers ─────────────────────────────────────────────────────────

async fn mount_room(server: &MockServer, live_status: i32) {
    Mock::given(method("GET"))
        .and(path("/room/v1/Room/get_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {
                "room_id": 5050,
                "short_id": 5,
                "uid": 42,
                "live_status": live_status,
                "title": "test stream"
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/live_user/v1/UserInfo/get_anchor_in_room"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": { "info": { "uid": 42, "uname": "anchor" } }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/room/v1/Room/playUrl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {
                "current_quality": 4,
                "durl": [{ "url": format!("{}/live/5050.flv", server.uri()), "order": 1 }]
            }
        })))
        .mount(server)
        .await;
}

fn recorder(server: &MockServer, output_dir: &std::path::Path) -> Recorder {
    let mut config = RecorderConfig::new(
        Url::parse(&server.uri()).unwrap(),
        RecordSettings::new(output_dir),
    );
    config.poll_interval = Duration::from_secs(3600);
    Recorder::new(config).unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn add_room_resolves_identity_once() {
    let server = MockServer::start().await;
    mount_room(&server, 0).await;
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = recorder(&server, dir.path());

    let room = recorder.add_room(5).await.unwrap();
    let again = recorder.add_room(5).await.unwrap();

    assert_eq!(room.real_room_id(), 5050);
    assert_eq!(room.streamer_name(), "anchor");
    assert_eq!(again.room_id(), 5);
    assert_eq!(recorder.rooms().len(), 1);
}

#[tokio::test]
async fn unknown_room_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/room/v1/Room/get_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 60004,
            "message": "room does not exist",
            "data": {}
        })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = recorder(&server, dir.path());

    let err = recorder.add_room(9).await.unwrap_err();

    assert!(matches!(err, CoreError::RoomNotFound { room_id: 9 }));
    assert!(recorder.rooms().is_empty());
}

#[tokio::test]
async fn manual_record_writes_stream_to_disk() {
    let server = MockServer::start().await;
    mount_room(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/live/5050.flv"))
        .and(header("referer", "https://live.bilibili.com"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x46u8; 20_000]))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = recorder(&server, dir.path());
    let room = recorder.add_room(5).await.unwrap();
    let mut events = room.subscribe();

    room.start_record();

    let mut recording = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), async {
        while recording.len() < 2 {
            if events.recv().await.unwrap() == RoomProperty::IsRecording {
                recording.push(room.is_recording());
            }
        }
    })
    .await
    .unwrap();
    recorder.shutdown_all().await;

    assert_eq!(recording, vec![true, false]);
    let room_dir = dir.path().join("5-anchor");
    let files: Vec<_> = std::fs::read_dir(&room_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    assert_eq!(std::fs::metadata(&files[0]).unwrap().len(), 20_000);
}

#[tokio::test]
async fn offline_room_is_not_recorded() {
    let server = MockServer::start().await;
    mount_room(&server, 0).await;
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = recorder(&server, dir.path());
    let room = recorder.add_room(5).await.unwrap();

    assert_eq!(recorder.start_all(), 1);
    room.start_record();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(room.is_monitoring());
    assert!(!room.is_recording());
    assert!(!dir.path().join("5-anchor").exists());
    recorder.shutdown_all().await;
    assert!(!room.is_monitoring());
}
