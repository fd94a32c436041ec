use std::collections::BTreeMap;

use crate::idgen::IdGenerator;
use crate::model::{AudioClip, ClipData, ClipId, ClipKind, ClipRef, MidiClip, TrackId};

/// Borrowed view of either clip kind.
#[derive(Debug, Clone, Copy)]
pub enum ClipView<'a> {
    Audio(&'a AudioClip),
    Midi(&'a MidiClip),
}

impl ClipView<'_> {
    pub fn clip_ref(&self) -> ClipRef {
        match self {
            ClipView::Audio(c) => c.clip_ref(),
            ClipView::Midi(c) => c.clip_ref(),
        }
    }

    pub fn track_id(&self) -> TrackId {
        match self {
            ClipView::Audio(c) => c.track_id,
            ClipView::Midi(c) => c.track_id,
        }
    }

    pub fn to_data(&self) -> ClipData {
        match self {
            ClipView::Audio(c) => ClipData::Audio((*c).clone()),
            ClipView::Midi(c) => ClipData::Midi((*c).clone()),
        }
    }
}

/// In-memory clips, keyed by id within each kind. Also hands out fresh ids
/// for clips and notes created locally.
#[derive(Debug, Clone, Default)]
pub struct ClipRepository {
    audio: BTreeMap<ClipId, AudioClip>,
    midi: BTreeMap<ClipId, MidiClip>,
    ids: IdGenerator,
}

impl ClipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        self.ids.next()
    }

    /// Keep local ids above an id handed out by the engine.
    pub fn seed_ids(&mut self, max_seen: u64) {
        self.ids.seed_from_max(max_seen);
    }

    pub fn add_audio(&mut self, clip: AudioClip) {
        self.ids.seed_from_max(clip.id);
        if self.audio.insert(clip.id, clip).is_some() {
            log::warn!("Audio clip id reused, previous clip replaced");
        }
    }

    pub fn add_midi(&mut self, clip: MidiClip) {
        self.ids.seed_from_max(clip.id);
        for note in &clip.notes {
            self.ids.seed_from_max(note.id);
        }
        if self.midi.insert(clip.id, clip).is_some() {
            log::warn!("MIDI clip id reused, previous clip replaced");
        }
    }

    /// Replace an existing audio clip with the same id. Returns the old value.
    pub fn replace_audio(&mut self, clip: AudioClip) -> Option<AudioClip> {
        let slot = self.audio.get_mut(&clip.id)?;
        Some(std::mem::replace(slot, clip))
    }

    pub fn replace_midi(&mut self, clip: MidiClip) -> Option<MidiClip> {
        let slot = self.midi.get_mut(&clip.id)?;
        Some(std::mem::replace(slot, clip))
    }

    pub fn remove_audio(&mut self, id: ClipId) -> Option<AudioClip> {
        self.audio.remove(&id)
    }

    pub fn remove_midi(&mut self, id: ClipId) -> Option<MidiClip> {
        self.midi.remove(&id)
    }

    /// Remove either kind; true if something was removed.
    pub fn remove(&mut self, clip: ClipRef) -> bool {
        match clip.kind {
            ClipKind::Audio => self.audio.remove(&clip.id).is_some(),
            ClipKind::Midi => self.midi.remove(&clip.id).is_some(),
        }
    }

    pub fn audio(&self, id: ClipId) -> Option<&AudioClip> {
        self.audio.get(&id)
    }

    pub fn audio_mut(&mut self, id: ClipId) -> Option<&mut AudioClip> {
        self.audio.get_mut(&id)
    }

    pub fn midi(&self, id: ClipId) -> Option<&MidiClip> {
        self.midi.get(&id)
    }

    pub fn midi_mut(&mut self, id: ClipId) -> Option<&mut MidiClip> {
        self.midi.get_mut(&id)
    }

    pub fn get(&self, clip: ClipRef) -> Option<ClipView<'_>> {
        match clip.kind {
            ClipKind::Audio => self.audio.get(&clip.id).map(ClipView::Audio),
            ClipKind::Midi => self.midi.get(&clip.id).map(ClipView::Midi),
        }
    }

    /// Put a clip back, whichever kind it is.
    pub fn insert(&mut self, clip: ClipData) {
        match clip {
            ClipData::Audio(c) => self.add_audio(c),
            ClipData::Midi(c) => self.add_midi(c),
        }
    }

    /// Replace the stored clip with the same ref. Returns false if missing.
    pub fn replace(&mut self, clip: ClipData) -> bool {
        match clip {
            ClipData::Audio(c) => self.replace_audio(c).is_some(),
            ClipData::Midi(c) => self.replace_midi(c).is_some(),
        }
    }

    pub fn contains(&self, clip: ClipRef) -> bool {
        self.get(clip).is_some()
    }

    pub fn audio_clips(&self) -> impl Iterator<Item = &AudioClip> {
        self.audio.values()
    }

    pub fn midi_clips(&self) -> impl Iterator<Item = &MidiClip> {
        self.midi.values()
    }

    pub fn ids_of(&self, kind: ClipKind) -> Vec<ClipId> {
        match kind {
            ClipKind::Audio => self.audio.keys().copied().collect(),
            ClipKind::Midi => self.midi.keys().copied().collect(),
        }
    }

    pub fn all_refs(&self) -> Vec<ClipRef> {
        self.audio
            .keys()
            .map(|&id| ClipRef::audio(id))
            .chain(self.midi.keys().map(|&id| ClipRef::midi(id)))
            .collect()
    }

    /// Clips on one track, either kind.
    pub fn clips_on_track(&self, track: TrackId) -> Vec<ClipView<'_>> {
        self.audio
            .values()
            .filter(|c| c.track_id == track)
            .map(ClipView::Audio)
            .chain(
                self.midi
                    .values()
                    .filter(|c| c.track_id == track)
                    .map(ClipView::Midi),
            )
            .collect()
    }

    /// Drop every clip on a track. Returns the removed refs.
    pub fn remove_track_clips(&mut self, track: TrackId) -> Vec<ClipRef> {
        let refs: Vec<ClipRef> = self
            .clips_on_track(track)
            .iter()
            .map(ClipView::clip_ref)
            .collect();
        for clip in &refs {
            self.remove(*clip);
        }
        refs
    }

    pub fn len(&self) -> usize {
        self.audio.len() + self.midi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
