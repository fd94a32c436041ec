use crate::model::{ClipId, ClipRef, TrackId};
use crate::repository::ClipRepository;
use crate::selection::{SelectionMode, SelectionModel};
use crate::track_manager::TrackList;

/// Everything an edit command may touch.
#[derive(Debug, Clone, Default)]
pub struct ArrangementState {
    pub tracks: TrackList,
    pub clips: ClipRepository,
    pub selection: SelectionModel,
}

impl ArrangementState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a clip and forget it in the selection.
    pub fn remove_clip(&mut self, clip: ClipRef) -> bool {
        self.selection.remove(clip);
        self.clips.remove(clip)
    }

    /// Remove a track and every clip on it.
    pub fn remove_track(&mut self, track: TrackId) -> Vec<ClipRef> {
        let removed = self.clips.remove_track_clips(track);
        for clip in &removed {
            self.selection.remove(*clip);
        }
        self.tracks.remove(track);
        removed
    }

    /// Give an audio clip the next free local id. Selection follows it.
    pub fn reassign_audio_id(&mut self, id: ClipId) -> Option<(ClipRef, TrackId)> {
        let mut clip = self.clips.remove_audio(id)?;
        let was_selected = self.selection.remove(ClipRef::audio(id));
        clip.id = self.clips.next_id();
        let moved = (clip.clip_ref(), clip.track_id);
        self.clips.add_audio(clip);
        if was_selected {
            self.selection.select(moved.0, SelectionMode::Add);
        }
        Some(moved)
    }
}
