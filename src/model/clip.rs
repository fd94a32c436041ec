use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ClipId, NoteId, TrackId};
use crate::constants::DEFAULT_MIDI_CLIP_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClipKind {
    Audio,
    Midi,
}

/// Kind-qualified clip id. Audio and MIDI ids live in separate namespaces on
/// the engine side, so a bare id is not enough to find a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipRef {
    pub kind: ClipKind,
    pub id: ClipId,
}

impl ClipRef {
    pub fn audio(id: ClipId) -> Self {
        Self {
            kind: ClipKind::Audio,
            id,
        }
    }

    pub fn midi(id: ClipId) -> Self {
        Self {
            kind: ClipKind::Midi,
            id,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WaveformPeak {
    pub min: f32,
    pub max: f32,
}

/// An audio clip. Times are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioClip {
    pub id: ClipId,
    pub track_id: TrackId,
    pub source_path: PathBuf,
    pub start_time: f64,
    pub duration: f64,
    /// Seconds into the source file where playback of this clip begins.
    pub source_offset: f64,
    /// Peaks for the whole source file, shared between clips cut from it.
    pub waveform_peaks: Arc<[WaveformPeak]>,
    pub color: Option<(u8, u8, u8)>,
}

impl AudioClip {
    pub fn new(
        id: ClipId,
        track_id: TrackId,
        source_path: impl Into<PathBuf>,
        start_time: f64,
        duration: f64,
    ) -> Self {
        Self {
            id,
            track_id,
            source_path: source_path.into(),
            start_time,
            duration,
            source_offset: 0.0,
            waveform_peaks: Arc::from(Vec::new()),
            color: None,
        }
    }

    #[inline]
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn clip_ref(&self) -> ClipRef {
        ClipRef::audio(self.id)
    }

    pub fn name(&self) -> String {
        self.source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Audio")
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MidiNote {
    pub id: NoteId,
    pub pitch: u8,
    pub velocity: u8,
    /// Beats, relative to the clip start.
    pub start: f64,
    /// Beats
    pub duration: f64,
}

impl MidiNote {
    pub fn new(id: NoteId, pitch: u8, start: f64, duration: f64) -> Self {
        Self {
            id,
            pitch: pitch.min(127),
            velocity: 100,
            start,
            duration,
        }
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A MIDI clip. Times are in beats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiClip {
    pub id: ClipId,
    pub track_id: TrackId,
    pub name: String,
    pub start_beat: f64,
    /// Arrangement-visible length.
    pub duration: f64,
    /// Length of the repeating content window.
    pub loop_length: f64,
    /// Which part of the looped content is shown first.
    pub content_start_offset: f64,
    pub notes: Vec<MidiNote>,
    pub can_repeat: bool,
    pub muted: bool,
    pub color: Option<(u8, u8, u8)>,
}

impl Default for MidiClip {
    fn default() -> Self {
        Self {
            id: 0,
            track_id: 0,
            name: DEFAULT_MIDI_CLIP_NAME.to_string(),
            start_beat: 0.0,
            duration: 4.0,
            loop_length: 4.0,
            content_start_offset: 0.0,
            notes: Vec::new(),
            can_repeat: true,
            muted: false,
            color: Some((100, 150, 200)),
        }
    }
}

impl MidiClip {
    pub fn new(id: ClipId, track_id: TrackId, start_beat: f64, duration: f64) -> Self {
        Self {
            id,
            track_id,
            start_beat,
            duration,
            loop_length: duration,
            ..Default::default()
        }
    }

    #[inline]
    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.duration
    }

    pub fn clip_ref(&self) -> ClipRef {
        ClipRef::midi(self.id)
    }
}

/// Owned clip of either kind.
#[derive(Debug, Clone)]
pub enum ClipData {
    Audio(AudioClip),
    Midi(MidiClip),
}

impl ClipData {
    pub fn clip_ref(&self) -> ClipRef {
        match self {
            ClipData::Audio(c) => c.clip_ref(),
            ClipData::Midi(c) => c.clip_ref(),
        }
    }

    pub fn track_id(&self) -> TrackId {
        match self {
            ClipData::Audio(c) => c.track_id,
            ClipData::Midi(c) => c.track_id,
        }
    }

    /// Start in the clip's own unit: seconds for audio, beats for MIDI.
    pub fn start(&self) -> f64 {
        match self {
            ClipData::Audio(c) => c.start_time,
            ClipData::Midi(c) => c.start_beat,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            ClipData::Audio(c) => c.duration,
            ClipData::Midi(c) => c.duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.start() + self.duration()
    }

    pub fn kind(&self) -> ClipKind {
        self.clip_ref().kind
    }
}
