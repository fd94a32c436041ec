use serde::{Deserialize, Serialize};

use super::TrackId;
use crate::constants::{DEFAULT_AUDIO_TRACK_PREFIX, DEFAULT_MIDI_TRACK_PREFIX, MASTER_TRACK_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackType {
    Audio,
    Midi,
    Master,
}

impl TrackType {
    /// Parse the type column of an engine track row.
    pub fn from_engine_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" | "return" | "group" => Some(TrackType::Audio),
            "midi" | "sampler" => Some(TrackType::Midi),
            "master" => Some(TrackType::Master),
            _ => None,
        }
    }

    pub fn as_engine_str(&self) -> &'static str {
        match self {
            TrackType::Audio => "audio",
            TrackType::Midi => "midi",
            TrackType::Master => "master",
        }
    }

    pub fn default_name(&self, ordinal: usize) -> String {
        match self {
            TrackType::Audio => format!("{} {}", DEFAULT_AUDIO_TRACK_PREFIX, ordinal),
            TrackType::Midi => format!("{} {}", DEFAULT_MIDI_TRACK_PREFIX, ordinal),
            TrackType::Master => MASTER_TRACK_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub track_type: TrackType,
    pub volume_db: f32,
    pub pan: f32,
    pub muted: bool,
    pub solo: bool,

    /// The engine has reported this track at least once.
    #[serde(skip)]
    pub confirmed: bool,
    /// Local rename the engine has not echoed back yet.
    #[serde(skip)]
    pub pending_name: Option<String>,
}

impl Track {
    pub fn new(id: TrackId, name: impl Into<String>, track_type: TrackType) -> Self {
        Self {
            id,
            name: name.into(),
            track_type,
            volume_db: 0.0,
            pan: 0.0,
            muted: false,
            solo: false,
            confirmed: false,
            pending_name: None,
        }
    }

    pub fn is_master(&self) -> bool {
        self.track_type == TrackType::Master
    }
}

/// One parsed engine track row: `id,name,type[,volumeDb,pan,mute,solo]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub id: TrackId,
    pub name: String,
    pub track_type: TrackType,
    pub volume_db: Option<f32>,
    pub pan: Option<f32>,
    pub muted: Option<bool>,
    pub solo: Option<bool>,
}

impl TrackInfo {
    pub fn into_track(self) -> Track {
        let mut track = Track::new(self.id, self.name, self.track_type);
        track.volume_db = self.volume_db.unwrap_or(0.0);
        track.pan = self.pan.unwrap_or(0.0);
        track.muted = self.muted.unwrap_or(false);
        track.solo = self.solo.unwrap_or(false);
        track.confirmed = true;
        track
    }
}
