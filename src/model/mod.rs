pub mod clip;
pub mod track;

pub use clip::{AudioClip, ClipData, ClipKind, ClipRef, MidiClip, MidiNote, WaveformPeak};
pub use track::{Track, TrackInfo, TrackType};

pub type ClipId = u64;
pub type TrackId = u64;
pub type NoteId = u64;
