use crate::error::EditError;
use crate::model::{AudioClip, ClipId, MidiClip, MidiNote, NoteId};

/// Pure clip edits. Nothing here touches the repository; callers decide what
/// to do with the returned clips.
pub struct EditProcessor;

impl EditProcessor {
    /// Split an audio clip at `split_time` (seconds, absolute). The left half
    /// keeps the original id, the right half gets `right_id` and continues
    /// reading the source where the left half stops.
    pub fn split_audio(
        clip: &AudioClip,
        split_time: f64,
        right_id: ClipId,
    ) -> Result<(AudioClip, AudioClip), EditError> {
        if !split_time.is_finite()
            || split_time <= clip.start_time
            || split_time >= clip.end_time()
        {
            return Err(EditError::InvalidSplitPoint(split_time));
        }
        let split_offset = split_time - clip.start_time;

        let mut first = clip.clone();
        first.duration = split_offset;

        let mut second = clip.clone();
        second.id = right_id;
        second.start_time = split_time;
        second.duration = clip.end_time() - split_time;
        second.source_offset = clip.source_offset + split_offset;
        Ok((first, second))
    }

    /// Split a MIDI clip at `split_beat`, relative to the clip start.
    ///
    /// Both halves get fresh ids. Notes ending at or before the split stay
    /// left, notes crossing it are cut short and stay left, and notes
    /// starting at or after it move right with rebased starts and new ids.
    pub fn split_midi(
        clip: &MidiClip,
        split_beat: f64,
        min_loop_beats: f64,
        mut next_id: impl FnMut() -> u64,
    ) -> Result<(MidiClip, MidiClip), EditError> {
        if !split_beat.is_finite() || split_beat <= 0.0 || split_beat >= clip.duration {
            return Err(EditError::InvalidSplitPoint(split_beat));
        }

        let mut left_notes = Vec::new();
        let mut right_notes = Vec::new();
        for note in &clip.notes {
            if note.start >= split_beat {
                right_notes.push(MidiNote {
                    id: next_id(),
                    start: note.start - split_beat,
                    ..*note
                });
            } else if note.end() > split_beat {
                left_notes.push(MidiNote {
                    duration: split_beat - note.start,
                    ..*note
                });
            } else {
                left_notes.push(*note);
            }
        }

        let mut first = clip.clone();
        first.id = next_id();
        first.duration = split_beat;
        first.loop_length = clip.loop_length.min(first.duration).max(min_loop_beats);
        first.notes = left_notes;

        let mut second = clip.clone();
        second.id = next_id();
        second.name = format!("{} (2)", clip.name);
        second.start_beat = clip.start_beat + split_beat;
        second.duration = clip.duration - split_beat;
        second.loop_length = clip.loop_length.min(second.duration).max(min_loop_beats);
        second.content_start_offset = 0.0;
        second.notes = right_notes;
        Ok((first, second))
    }

    /// Move the left edge of an audio clip to `new_start` (seconds), keeping
    /// its end fixed. The edge stays at or after zero and no closer than
    /// `min_duration` to the end; the source offset follows it and bottoms
    /// out at zero.
    pub fn trim_audio_left(
        clip: &AudioClip,
        new_start: f64,
        min_duration: f64,
    ) -> Result<AudioClip, EditError> {
        let end = clip.end_time();
        let upper = end - min_duration;
        if !new_start.is_finite() || upper < 0.0 {
            return Err(EditError::OutOfBounds);
        }
        let start = new_start.clamp(0.0, upper);

        let mut trimmed = clip.clone();
        trimmed.start_time = start;
        trimmed.duration = end - start;
        trimmed.source_offset = (clip.source_offset + (start - clip.start_time)).max(0.0);
        Ok(trimmed)
    }

    /// Move the left edge of a MIDI clip to `new_start` (beats), keeping its
    /// end fixed and rewriting note timing so notes stay where they were.
    pub fn trim_midi_left(
        clip: &MidiClip,
        new_start: f64,
        min_length: f64,
    ) -> Result<MidiClip, EditError> {
        let end = clip.end_beat();
        let upper = end - min_length;
        if !new_start.is_finite() || upper < 0.0 {
            return Err(EditError::OutOfBounds);
        }
        let start = new_start.clamp(0.0, upper);
        let trim_offset = start - clip.start_beat;

        let mut trimmed = clip.clone();
        trimmed.start_beat = start;
        trimmed.duration = end - start;
        trimmed.loop_length = clip.loop_length.min(trimmed.duration);
        trimmed.notes = Self::trim_notes_front(&clip.notes, trim_offset);
        Ok(trimmed)
    }

    /// Drop notes ending before `offset`, cut the one crossing it, and shift
    /// everything left by `offset`. A negative offset only shifts.
    pub fn trim_notes_front(notes: &[MidiNote], offset: f64) -> Vec<MidiNote> {
        notes
            .iter()
            .filter(|n| offset <= 0.0 || n.end() > offset)
            .map(|n| {
                if offset > 0.0 && n.start < offset {
                    MidiNote {
                        start: 0.0,
                        duration: n.duration - (offset - n.start),
                        ..*n
                    }
                } else {
                    MidiNote {
                        start: n.start - offset,
                        ..*n
                    }
                }
            })
            .collect()
    }

    /// New audio length, floored at `min_duration`. No upper bound.
    pub fn trim_audio_right(clip: &AudioClip, new_duration: f64, min_duration: f64) -> AudioClip {
        let mut trimmed = clip.clone();
        if new_duration.is_finite() {
            trimmed.duration = new_duration.max(min_duration);
        }
        trimmed
    }

    /// New MIDI length within `[min_beats, max_beats]`. A clip that cannot
    /// repeat never grows past its loop content.
    pub fn resize_midi(
        clip: &MidiClip,
        new_duration: f64,
        min_beats: f64,
        max_beats: f64,
    ) -> Result<MidiClip, EditError> {
        if !new_duration.is_finite() {
            return Err(EditError::OutOfBounds);
        }
        let upper = if clip.can_repeat {
            max_beats
        } else {
            clip.loop_length.min(max_beats)
        };
        let mut resized = clip.clone();
        resized.duration = new_duration.max(min_beats).min(upper);
        resized.loop_length = clip.loop_length.min(resized.duration);
        Ok(resized)
    }

    /// Whole copies of the source that fit in a forward drag.
    pub fn stamp_count(drag_delta: f64, source_duration: f64) -> usize {
        if source_duration <= 0.0 || !drag_delta.is_finite() || drag_delta <= 0.0 {
            return 0;
        }
        (drag_delta / source_duration).floor() as usize
    }

    /// Start positions for the copies a duplicate drag produces: back to back
    /// after the source when the drag covers at least one source length,
    /// otherwise a single copy at `drop_start`.
    pub fn duplicate_starts(
        source_start: f64,
        source_duration: f64,
        drag_delta: f64,
        drop_start: f64,
    ) -> Vec<f64> {
        match Self::stamp_count(drag_delta, source_duration) {
            0 => vec![drop_start.max(0.0)],
            n => (1..=n)
                .map(|i| source_start + i as f64 * source_duration)
                .collect(),
        }
    }

    pub fn copy_audio(clip: &AudioClip, id: ClipId, start_time: f64) -> AudioClip {
        AudioClip {
            id,
            start_time,
            ..clip.clone()
        }
    }

    /// Copy with a new clip id and new note ids.
    pub fn copy_midi(
        clip: &MidiClip,
        id: ClipId,
        start_beat: f64,
        mut next_note_id: impl FnMut() -> NoteId,
    ) -> MidiClip {
        let mut copy = clip.clone();
        copy.id = id;
        copy.start_beat = start_beat;
        for note in &mut copy.notes {
            note.id = next_note_id();
        }
        copy
    }
}
