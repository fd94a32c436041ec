use crate::edit_actions::EditProcessor;
use crate::input::drag::ClipMove;
use crate::messages::EditorEvent;
use crate::model::{AudioClip, ClipData, ClipKind, ClipRef, MidiClip, Track, TrackId};
use crate::selection::SelectionMode;
use crate::state::ArrangementState;
use crate::time_utils::CoordinateSystem;

/// One user-visible edit. All undoable changes to clips and tracks go
/// through a command.
pub trait EditCommand: Send {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent>;
    fn name(&self) -> &str;
}

/// Runs commands. An undo stack sits behind this seam.
pub trait CommandExecutor {
    fn execute(
        &mut self,
        command: Box<dyn EditCommand>,
        state: &mut ArrangementState,
    ) -> Vec<EditorEvent>;
}

/// Executes right away and remembers what ran.
#[derive(Debug, Default)]
pub struct ImmediateExecutor {
    history: Vec<String>,
}

impl ImmediateExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl CommandExecutor for ImmediateExecutor {
    fn execute(
        &mut self,
        mut command: Box<dyn EditCommand>,
        state: &mut ArrangementState,
    ) -> Vec<EditorEvent> {
        log::info!("Applying {}", command.name());
        let events = command.execute(state);
        self.history.push(command.name().to_string());
        events
    }
}

fn start_seconds(coords: &CoordinateSystem, clip: &ClipData) -> f64 {
    match clip {
        ClipData::Audio(c) => c.start_time,
        ClipData::Midi(c) => coords.beats_to_seconds(c.start_beat),
    }
}

pub struct MoveClipsCommand {
    moves: Vec<ClipMove>,
    coords: CoordinateSystem,
}

impl MoveClipsCommand {
    pub fn new(moves: Vec<ClipMove>, coords: CoordinateSystem) -> Self {
        Self { moves, coords }
    }
}

impl EditCommand for MoveClipsCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        for m in &self.moves {
            let to = m.to.max(0.0);
            let (track, seconds) = match m.clip.kind {
                ClipKind::Audio => match state.clips.audio_mut(m.clip.id) {
                    Some(c) => {
                        c.start_time = to;
                        (c.track_id, to)
                    }
                    None => {
                        log::warn!("Move of missing clip {:?} skipped", m.clip);
                        continue;
                    }
                },
                ClipKind::Midi => match state.clips.midi_mut(m.clip.id) {
                    Some(c) => {
                        c.start_beat = to;
                        (c.track_id, self.coords.beats_to_seconds(to))
                    }
                    None => {
                        log::warn!("Move of missing clip {:?} skipped", m.clip);
                        continue;
                    }
                },
            };
            events.push(EditorEvent::ClipMoved {
                clip: m.clip,
                track,
                from: m.from,
                to,
                start_seconds: seconds,
            });
        }
        events
    }

    fn name(&self) -> &str {
        if self.moves.len() > 1 {
            "Move Clips"
        } else {
            "Move Clip"
        }
    }
}

/// Copies of one clip at the given starts, same track.
pub struct DuplicateClipCommand {
    source: ClipRef,
    starts: Vec<f64>,
}

impl DuplicateClipCommand {
    pub fn new(source: ClipRef, starts: Vec<f64>) -> Self {
        Self { source, starts }
    }
}

impl EditCommand for DuplicateClipCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        let Some(source) = state.clips.get(self.source).map(|v| v.to_data()) else {
            log::warn!("Duplicate of missing clip {:?} skipped", self.source);
            return Vec::new();
        };

        let mut copies = Vec::with_capacity(self.starts.len());
        for &start in &self.starts {
            let id = state.clips.next_id();
            let copy = match &source {
                ClipData::Audio(c) => ClipData::Audio(EditProcessor::copy_audio(c, id, start)),
                ClipData::Midi(c) => ClipData::Midi(EditProcessor::copy_midi(c, id, start, || {
                    state.clips.next_id()
                })),
            };
            copies.push(copy.clip_ref());
            state.clips.insert(copy);
        }

        vec![EditorEvent::ClipsDuplicated {
            source: self.source,
            copies,
        }]
    }

    fn name(&self) -> &str {
        "Duplicate Clip"
    }
}

/// Replace a clip with its trimmed version.
pub struct TrimClipCommand {
    before: ClipData,
    after: ClipData,
    coords: CoordinateSystem,
}

impl TrimClipCommand {
    pub fn new(before: ClipData, after: ClipData, coords: CoordinateSystem) -> Self {
        Self {
            before,
            after,
            coords,
        }
    }
}

impl EditCommand for TrimClipCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        if !state.clips.replace(self.after.clone()) {
            log::warn!("Trim of missing clip {:?} skipped", self.after.clip_ref());
            return Vec::new();
        }
        vec![EditorEvent::ClipTrimmed {
            clip: self.after.clip_ref(),
            track: self.after.track_id(),
            start_changed: self.after.start() != self.before.start(),
            start_seconds: start_seconds(&self.coords, &self.after),
            duration: self.after.duration(),
        }]
    }

    fn name(&self) -> &str {
        "Trim Clip"
    }
}

pub struct ResizeClipCommand {
    after: ClipData,
}

impl ResizeClipCommand {
    pub fn new(after: ClipData) -> Self {
        Self { after }
    }
}

impl EditCommand for ResizeClipCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        if !state.clips.replace(self.after.clone()) {
            log::warn!("Resize of missing clip {:?} skipped", self.after.clip_ref());
            return Vec::new();
        }
        vec![EditorEvent::ClipResized {
            clip: self.after.clip_ref(),
            track: self.after.track_id(),
            duration: self.after.duration(),
        }]
    }

    fn name(&self) -> &str {
        "Resize Clip"
    }
}

pub struct DeleteClipsCommand {
    clips: Vec<ClipRef>,
}

impl DeleteClipsCommand {
    pub fn new(clips: Vec<ClipRef>) -> Self {
        Self { clips }
    }
}

impl EditCommand for DeleteClipsCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        let mut deleted = Vec::new();
        for &clip in &self.clips {
            let Some(track) = state.clips.get(clip).map(|v| v.track_id()) else {
                continue;
            };
            state.remove_clip(clip);
            deleted.push((clip, track));
        }
        if deleted.is_empty() {
            return Vec::new();
        }
        vec![EditorEvent::ClipsDeleted(deleted)]
    }

    fn name(&self) -> &str {
        if self.clips.len() > 1 {
            "Delete Clips"
        } else {
            "Delete Clip"
        }
    }
}

/// Split at an absolute position in the clip's native unit.
pub struct SplitClipCommand {
    clip: ClipRef,
    at: f64,
    min_loop_beats: f64,
}

impl SplitClipCommand {
    pub fn new(clip: ClipRef, at: f64, min_loop_beats: f64) -> Self {
        Self {
            clip,
            at,
            min_loop_beats,
        }
    }
}

impl EditCommand for SplitClipCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        let Some(original) = state.clips.get(self.clip).map(|v| v.to_data()) else {
            log::warn!("Split of missing clip {:?} skipped", self.clip);
            return Vec::new();
        };
        let track = original.track_id();

        let halves = match &original {
            ClipData::Audio(c) => EditProcessor::split_audio(c, self.at, c.id).map(|(l, mut r)| {
                r.id = state.clips.next_id();
                (ClipData::Audio(l), ClipData::Audio(r))
            }),
            ClipData::Midi(c) => {
                EditProcessor::split_midi(c, self.at - c.start_beat, self.min_loop_beats, || {
                    state.clips.next_id()
                })
                .map(|(l, r)| (ClipData::Midi(l), ClipData::Midi(r)))
            }
        };
        let (left, right) = match halves {
            Ok(halves) => halves,
            Err(err) => {
                log::debug!("Split of {:?} ignored: {}", self.clip, err);
                return Vec::new();
            }
        };

        let was_selected = state.selection.contains(self.clip);
        state.remove_clip(self.clip);
        let (left_ref, right_ref) = (left.clip_ref(), right.clip_ref());
        state.clips.insert(left);
        state.clips.insert(right);

        let mut events = vec![EditorEvent::ClipSplit {
            original: self.clip,
            track,
            left: left_ref,
            right: right_ref,
        }];
        if was_selected {
            state.selection.select(left_ref, SelectionMode::Add);
            state.selection.select(right_ref, SelectionMode::Add);
            events.push(EditorEvent::SelectionChanged(state.selection.selected()));
        }
        events
    }

    fn name(&self) -> &str {
        "Split Clip"
    }
}

pub struct CreateMidiClipCommand {
    track: TrackId,
    start_beat: f64,
    duration: f64,
}

impl CreateMidiClipCommand {
    pub fn new(track: TrackId, start_beat: f64, duration: f64) -> Self {
        Self {
            track,
            start_beat,
            duration,
        }
    }
}

impl EditCommand for CreateMidiClipCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        if !state.tracks.contains(self.track) {
            log::warn!("Track {} vanished before the clip was created", self.track);
            return Vec::new();
        }
        let id = state.clips.next_id();
        let clip = MidiClip::new(id, self.track, self.start_beat.max(0.0), self.duration);
        state.clips.add_midi(clip);
        vec![EditorEvent::ClipCreated {
            clip: ClipRef::midi(id),
            track: self.track,
        }]
    }

    fn name(&self) -> &str {
        "Create MIDI Clip"
    }
}

pub struct AddAudioClipCommand {
    clip: Option<AudioClip>,
}

impl AddAudioClipCommand {
    pub fn new(clip: AudioClip) -> Self {
        Self { clip: Some(clip) }
    }
}

impl EditCommand for AddAudioClipCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        let Some(clip) = self.clip.take() else {
            return Vec::new();
        };
        let (clip_ref, track) = (clip.clip_ref(), clip.track_id);
        let mut events = Vec::new();
        // A locally minted id (split half) may already hold the engine's new id.
        if state.clips.contains(clip_ref) {
            let was_selected = state.selection.contains(clip_ref);
            if let Some((to, local_track)) = state.reassign_audio_id(clip.id) {
                log::info!("Local clip {:?} moved to {:?} to make room for engine clip", clip_ref, to);
                events.push(EditorEvent::ClipReassigned {
                    from: clip_ref,
                    to,
                    track: local_track,
                });
                if was_selected {
                    events.push(EditorEvent::SelectionChanged(state.selection.selected()));
                }
            }
        }
        state.clips.add_audio(clip);
        events.push(EditorEvent::ClipCreated {
            clip: clip_ref,
            track,
        });
        events
    }

    fn name(&self) -> &str {
        "Add Audio Clip"
    }
}

pub struct CreateTrackCommand {
    track: Option<Track>,
}

impl CreateTrackCommand {
    pub fn new(track: Track) -> Self {
        Self { track: Some(track) }
    }
}

impl EditCommand for CreateTrackCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        let Some(track) = self.track.take() else {
            return Vec::new();
        };
        let (id, track_type) = (track.id, track.track_type);
        state.clips.seed_ids(id);
        state.tracks.insert(track);
        vec![EditorEvent::TrackCreated {
            track: id,
            track_type,
        }]
    }

    fn name(&self) -> &str {
        "Create Track"
    }
}

pub struct RenameTrackCommand {
    track: TrackId,
    name: String,
}

impl RenameTrackCommand {
    pub fn new(track: TrackId, name: impl Into<String>) -> Self {
        Self {
            track,
            name: name.into(),
        }
    }
}

impl EditCommand for RenameTrackCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        match state.tracks.rename(self.track, self.name.clone()) {
            Some(_) => vec![EditorEvent::TrackRenamed {
                track: self.track,
                name: self.name.clone(),
            }],
            None => {
                log::warn!("Rename of missing track {} skipped", self.track);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "Rename Track"
    }
}

pub struct ReorderTrackCommand {
    from: usize,
    to: usize,
}

impl ReorderTrackCommand {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

impl EditCommand for ReorderTrackCommand {
    fn execute(&mut self, state: &mut ArrangementState) -> Vec<EditorEvent> {
        let Some(&track) = state.tracks.regular_order().get(self.from) else {
            return Vec::new();
        };
        if !state.tracks.move_track(self.from, self.to) {
            return Vec::new();
        }
        vec![EditorEvent::TrackReordered {
            track,
            from: self.from,
            to: self.to,
        }]
    }

    fn name(&self) -> &str {
        "Reorder Track"
    }
}
