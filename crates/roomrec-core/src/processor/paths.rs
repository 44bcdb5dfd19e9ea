// ── Output path layout ──

use std::path::{Path, PathBuf};

use chrono::Local;

use super::RecordPaths;
use crate::model::RoomIdentity;

/// Characters that are not allowed in file names on common filesystems.
const UNSAFE_FILENAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Per-room output layout:
/// `{output_dir}/{room_id}-{streamer}/record-{room_id}-{timestamp}.flv`.
#[derive(Debug, Clone)]
pub struct RecordInfo {
    output_dir: PathBuf,
    room_id: u64,
    streamer_name: String,
}

impl RecordInfo {
    pub fn new(output_dir: impl Into<PathBuf>, identity: &RoomIdentity) -> Self {
        Self {
            output_dir: output_dir.into(),
            room_id: identity.room_id,
            streamer_name: identity.streamer_name.clone(),
        }
    }

    /// Directory holding every file of this room.
    pub fn room_dir(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}-{}",
            self.room_id,
            sanitize_file_name(&self.streamer_name)
        ))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn file_path(&self, kind: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d-%H%M%S-%3f");
        self.room_dir()
            .join(format!("{kind}-{}-{stamp}.flv", self.room_id))
    }
}

impl RecordPaths for RecordInfo {
    fn stream_file_path(&self) -> PathBuf {
        self.file_path("record")
    }

    fn clip_file_path(&self) -> PathBuf {
        self.file_path("clip")
    }
}

/// Replace characters that would break a path component.
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if UNSAFE_FILENAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.is_empty() {
        "unknown".into()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str) -> RoomIdentity {
        RoomIdentity {
            room_id: 1017,
            real_room_id: 21_452_505,
            streamer_name: name.into(),
        }
    }

    #[test]
    fn paths_live_under_room_dir() {
        let info = RecordInfo::new("/data/rec", &identity("streamer"));

        let stream = info.stream_file_path();
        let clip = info.clip_file_path();

        assert_eq!(info.room_dir(), PathBuf::from("/data/rec/1017-streamer"));
        assert_eq!(stream.parent(), Some(info.room_dir().as_path()));
        let stream_name = stream.file_name().unwrap().to_string_lossy().into_owned();
        let clip_name = clip.file_name().unwrap().to_string_lossy().into_owned();
        assert!(stream_name.starts_with("record-1017-"), "{stream_name}");
        assert!(clip_name.starts_with("clip-1017-"), "{clip_name}");
        assert!(stream_name.ends_with(".flv"));
    }

    #[test]
    fn unsafe_names_are_sanitized() {
        assert_eq!(sanitize_file_name(" a/b:c*d? "), "a_b_c_d_");
        assert_eq!(sanitize_file_name("   "), "unknown");
        assert_eq!(sanitize_file_name("主播"), "主播");
    }
}
