use std::collections::BTreeSet;

use egui::Pos2;

use super::gestures::{GestureInput, GestureKind, classify, exceeds_threshold};
use super::{InputModifiers, ToolMode};
use crate::config::EditorConfig;
use crate::edit_actions::EditProcessor;
use crate::grid::GridSnapper;
use crate::layout::{HitTarget, TrackLayout};
use crate::model::{ClipData, ClipKind, ClipRef, TrackId, TrackType};
use crate::state::ArrangementState;
use crate::time_utils::CoordinateSystem;

/// Read-only view of the editor a drag step needs.
#[derive(Clone, Copy)]
pub struct DragContext<'a> {
    pub state: &'a ArrangementState,
    pub coords: &'a CoordinateSystem,
    pub layout: &'a TrackLayout,
    pub config: &'a EditorConfig,
    pub tool: ToolMode,
}

impl DragContext<'_> {
    fn snapper(&self) -> GridSnapper {
        GridSnapper::new(self.coords.pixels_per_beat())
    }

    /// Pixels to the native time unit of a clip kind.
    fn pixels_to_native(&self, kind: ClipKind, pixels: f64) -> f64 {
        match kind {
            ClipKind::Audio => self.coords.pixels_to_seconds(pixels),
            ClipKind::Midi => self.coords.pixels_to_beats(pixels),
        }
    }

    /// Shift a native-unit position by `dx` pixels and snap it in beats.
    fn snapped_position(&self, kind: ClipKind, origin: f64, dx: f64, bypass: bool) -> f64 {
        let coords = self.coords;
        let origin_beats = match kind {
            ClipKind::Audio => coords.seconds_to_beats(origin),
            ClipKind::Midi => origin,
        };
        let beats = self
            .snapper()
            .snap_or_bypass(origin_beats + coords.pixels_to_beats(dx), bypass)
            .max(0.0);
        match kind {
            ClipKind::Audio => coords.beats_to_seconds(beats),
            ClipKind::Midi => beats,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    PendingBelowThreshold,
    Active(GestureKind),
}

#[derive(Debug, Clone, Copy)]
struct PendingPress {
    pos: Pos2,
    target: HitTarget,
    target_is_master: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReorderState {
    track: TrackId,
    original_index: usize,
    current_index: usize,
}

/// State of one active drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub kind: GestureKind,
    pub target: HitTarget,
    /// The clip under the pointer at press time.
    pub grabbed: Option<ClipRef>,
    /// Clips as they were when the drag started: the grabbed clip first, then
    /// the other selected clips that move with it.
    pub originals: Vec<ClipData>,
    pub start_pointer: Pos2,
    pub current_pointer: Pos2,
    pub snap_bypass: bool,
    /// Started from the Duplicate tool, so releasing the modifier does not
    /// turn it back into a move.
    duplicate_locked: bool,
    erased: BTreeSet<ClipRef>,
    reorder: Option<ReorderState>,
}

impl DragSession {
    pub fn erased(&self) -> &BTreeSet<ClipRef> {
        &self.erased
    }

    fn dx(&self) -> f64 {
        (self.current_pointer.x - self.start_pointer.x) as f64
    }

    fn grabbed_original(&self) -> Option<&ClipData> {
        self.originals.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipMove {
    pub clip: ClipRef,
    pub from: f64,
    pub to: f64,
}

/// What the drag would do if released now.
#[derive(Debug, Clone)]
pub enum DragPreview {
    Move(Vec<ClipMove>),
    Duplicate { source: ClipRef, starts: Vec<f64> },
    /// Trim or resize of one clip.
    Edit { before: ClipData, after: ClipData },
    Create {
        track: Option<TrackId>,
        start_beat: f64,
        end_beat: f64,
    },
}

/// A finished drag, ready to become a command.
#[derive(Debug, Clone)]
pub enum CommittedEdit {
    Move(Vec<ClipMove>),
    Duplicate { source: ClipRef, starts: Vec<f64> },
    Trim { before: ClipData, after: ClipData },
    Resize { before: ClipData, after: ClipData },
    CreateClip {
        track: TrackId,
        start_beat: f64,
        duration: f64,
    },
    /// Drag on empty space: the user picks a track type first.
    CreatePrompt { start_beat: f64, duration: f64 },
    ReorderTrack { from: usize, to: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    pub target: HitTarget,
    pub pos: Pos2,
    pub modifiers: InputModifiers,
}

/// Side effects the owner of the controller applies, in order.
#[derive(Debug, Clone)]
pub enum DragAction {
    /// Delete a clip now.
    Erase(ClipRef),
    /// Move a regular track row now. Not undoable on its own.
    ReorderTrack { from: usize, to: usize },
    Commit(CommittedEdit),
    Click(ClickEvent),
}

/// Turns one pointer stream into drag gestures.
///
/// The controller never mutates editor state. Each step returns the actions
/// the caller must apply before the next step.
#[derive(Debug, Default)]
pub struct DragController {
    pending: Option<PendingPress>,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        match (&self.session, &self.pending) {
            (Some(session), _) => DragPhase::Active(session.kind),
            (None, Some(_)) => DragPhase::PendingBelowThreshold,
            (None, None) => DragPhase::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == DragPhase::Idle
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn pointer_down(&mut self, pos: Pos2, target: HitTarget, target_is_master: bool) {
        if !self.is_idle() {
            log::debug!("Pointer down during {:?}, ignored", self.phase());
            return;
        }
        self.pending = Some(PendingPress {
            pos,
            target,
            target_is_master,
        });
    }

    pub fn pointer_move(
        &mut self,
        ctx: &DragContext<'_>,
        pos: Pos2,
        modifiers: InputModifiers,
    ) -> Vec<DragAction> {
        if let Some(press) = self.pending {
            if !exceeds_threshold(pos - press.pos, ctx.config.interaction.drag_threshold_px) {
                return Vec::new();
            }
            self.pending = None;
            return self.begin(ctx, press, pos, modifiers);
        }

        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.current_pointer = pos;
        Self::sample_modifiers(session, ctx, modifiers);

        match session.kind {
            GestureKind::Erase => Self::erase_under_pointer(session, ctx),
            GestureKind::TrackReorder => Self::live_reorder(session, ctx),
            _ => Vec::new(),
        }
    }

    pub fn pointer_up(
        &mut self,
        ctx: &DragContext<'_>,
        pos: Pos2,
        modifiers: InputModifiers,
    ) -> Vec<DragAction> {
        if let Some(press) = self.pending.take() {
            return vec![DragAction::Click(ClickEvent {
                target: press.target,
                pos,
                modifiers,
            })];
        }
        let Some(mut session) = self.session.take() else {
            return Vec::new();
        };
        session.current_pointer = pos;
        Self::sample_modifiers(&mut session, ctx, modifiers);

        if session.kind == GestureKind::TrackReorder {
            return Self::finish_reorder(&session);
        }
        if session.kind == GestureKind::Erase {
            return Self::erase_under_pointer(&mut session, ctx);
        }

        match Self::commit(&session, ctx) {
            Some(edit) => {
                log::debug!("{:?} drag committed", session.kind);
                vec![DragAction::Commit(edit)]
            }
            None => {
                log::debug!("{:?} drag released without a change", session.kind);
                Vec::new()
            }
        }
    }

    /// Abandon the gesture. Live track reordering is undone; erased clips stay
    /// erased.
    pub fn cancel(&mut self) -> Vec<DragAction> {
        self.pending = None;
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        log::debug!("{:?} drag cancelled", session.kind);
        match session.reorder {
            Some(r) if r.current_index != r.original_index => vec![DragAction::ReorderTrack {
                from: r.current_index,
                to: r.original_index,
            }],
            _ => Vec::new(),
        }
    }

    pub fn preview(&self, ctx: &DragContext<'_>) -> Option<DragPreview> {
        self.session.as_ref().and_then(|s| Self::evaluate(s, ctx))
    }

    fn begin(
        &mut self,
        ctx: &DragContext<'_>,
        press: PendingPress,
        pos: Pos2,
        modifiers: InputModifiers,
    ) -> Vec<DragAction> {
        let input = GestureInput {
            tool: ctx.tool,
            target: press.target,
            target_is_master: press.target_is_master,
            modifiers,
        };
        let Some(kind) = classify(&input, &ctx.config.modifiers) else {
            log::debug!("Drag on {:?} with {:?} does nothing", press.target, ctx.tool);
            return Vec::new();
        };

        let grabbed = match press.target {
            HitTarget::Clip { clip, .. } => Some(clip),
            _ => None,
        };
        let originals = match (kind, grabbed) {
            (GestureKind::Move | GestureKind::Duplicate, Some(clip)) => {
                Self::group_snapshot(ctx.state, clip)
            }
            (
                GestureKind::TrimLeft | GestureKind::TrimRight | GestureKind::Resize,
                Some(clip),
            ) => ctx
                .state
                .clips
                .get(clip)
                .map(|v| vec![v.to_data()])
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        if grabbed.is_some() && originals.is_empty() && kind != GestureKind::Erase {
            log::warn!("Dragged clip {:?} is gone", grabbed);
            return Vec::new();
        }

        let reorder = match (kind, press.target) {
            (GestureKind::TrackReorder, HitTarget::TrackHeader { track }) => {
                match ctx.state.tracks.index_of(track) {
                    Some(index) => Some(ReorderState {
                        track,
                        original_index: index,
                        current_index: index,
                    }),
                    None => {
                        log::debug!("Track {} cannot be reordered", track);
                        return Vec::new();
                    }
                }
            }
            _ => None,
        };

        let mut session = DragSession {
            kind,
            target: press.target,
            grabbed,
            originals,
            start_pointer: press.pos,
            current_pointer: pos,
            snap_bypass: modifiers.is_held(ctx.config.modifiers.snap_bypass),
            duplicate_locked: ctx.tool == ToolMode::Duplicate,
            erased: BTreeSet::new(),
            reorder,
        };
        log::debug!("{:?} drag started", kind);

        let actions = match kind {
            GestureKind::Erase => Self::erase_under_pointer(&mut session, ctx),
            GestureKind::TrackReorder => Self::live_reorder(&mut session, ctx),
            _ => Vec::new(),
        };
        self.session = Some(session);
        actions
    }

    /// The grabbed clip plus, when it is selected, every other selected clip
    /// of the same kind.
    fn group_snapshot(state: &ArrangementState, grabbed: ClipRef) -> Vec<ClipData> {
        let Some(first) = state.clips.get(grabbed) else {
            return Vec::new();
        };
        let mut originals = vec![first.to_data()];
        if state.selection.contains(grabbed) {
            originals.extend(
                state
                    .selection
                    .selected()
                    .into_iter()
                    .filter(|c| *c != grabbed && c.kind == grabbed.kind)
                    .filter_map(|c| state.clips.get(c))
                    .map(|v| v.to_data()),
            );
        }
        originals
    }

    fn sample_modifiers(
        session: &mut DragSession,
        ctx: &DragContext<'_>,
        modifiers: InputModifiers,
    ) {
        let bindings = &ctx.config.modifiers;
        session.snap_bypass = modifiers.is_held(bindings.snap_bypass);

        if !session.duplicate_locked
            && matches!(session.kind, GestureKind::Move | GestureKind::Duplicate)
        {
            let kind = if modifiers.is_held(bindings.duplicate) {
                GestureKind::Duplicate
            } else {
                GestureKind::Move
            };
            if kind != session.kind {
                log::debug!("Drag switched from {:?} to {:?}", session.kind, kind);
                session.kind = kind;
            }
        }
    }

    fn erase_under_pointer(session: &mut DragSession, ctx: &DragContext<'_>) -> Vec<DragAction> {
        ctx.layout
            .clips_at(ctx.state, ctx.coords, session.current_pointer)
            .into_iter()
            .filter(|clip| session.erased.insert(*clip))
            .map(DragAction::Erase)
            .collect()
    }

    fn live_reorder(session: &mut DragSession, ctx: &DragContext<'_>) -> Vec<DragAction> {
        let Some(reorder) = session.reorder.as_mut() else {
            return Vec::new();
        };
        let layout = ctx.layout;
        let dy = session.current_pointer.y - session.start_pointer.y;
        let center = layout.row_center(reorder.current_index) + dy;
        let count = ctx.state.tracks.regular_order().len();
        let target = layout.gap_index(center, count);
        if target == reorder.current_index {
            return Vec::new();
        }

        let from = reorder.current_index;
        // keep the row under the pointer now that it sits in another slot
        session.start_pointer.y += (target as f32 - from as f32) * layout.row_height;
        reorder.current_index = target;
        log::debug!("Track {} reordered live {} -> {}", reorder.track, from, target);
        vec![DragAction::ReorderTrack { from, to: target }]
    }

    /// Put the row back where it started and commit the whole move as one
    /// undoable reorder.
    fn finish_reorder(session: &DragSession) -> Vec<DragAction> {
        match session.reorder {
            Some(r) if r.current_index != r.original_index => vec![
                DragAction::ReorderTrack {
                    from: r.current_index,
                    to: r.original_index,
                },
                DragAction::Commit(CommittedEdit::ReorderTrack {
                    from: r.original_index,
                    to: r.current_index,
                }),
            ],
            _ => Vec::new(),
        }
    }

    fn evaluate(session: &DragSession, ctx: &DragContext<'_>) -> Option<DragPreview> {
        let dx = session.dx();
        let bypass = session.snap_bypass;
        let editing = &ctx.config.editing;

        match session.kind {
            GestureKind::Move => {
                let grabbed = session.grabbed_original()?;
                let kind = grabbed.kind();
                let new_start = ctx.snapped_position(kind, grabbed.start(), dx, bypass);
                let delta = new_start - grabbed.start();
                let moves = session
                    .originals
                    .iter()
                    .map(|c| ClipMove {
                        clip: c.clip_ref(),
                        from: c.start(),
                        to: (c.start() + delta).max(0.0),
                    })
                    .collect();
                Some(DragPreview::Move(moves))
            }
            GestureKind::Duplicate => {
                let source = session.grabbed_original()?;
                let kind = source.kind();
                let drop_start = ctx.snapped_position(kind, source.start(), dx, bypass);
                let starts = EditProcessor::duplicate_starts(
                    source.start(),
                    source.duration(),
                    ctx.pixels_to_native(kind, dx),
                    drop_start,
                );
                Some(DragPreview::Duplicate {
                    source: source.clip_ref(),
                    starts,
                })
            }
            GestureKind::TrimLeft => {
                let before = session.grabbed_original()?;
                let new_start = ctx.snapped_position(before.kind(), before.start(), dx, bypass);
                let after = match before {
                    ClipData::Audio(c) => {
                        EditProcessor::trim_audio_left(c, new_start, editing.audio_min_duration)
                            .map(ClipData::Audio)
                    }
                    ClipData::Midi(c) => {
                        EditProcessor::trim_midi_left(c, new_start, editing.midi_min_length_beats)
                            .map(ClipData::Midi)
                    }
                };
                Self::edit_preview(before, after)
            }
            GestureKind::TrimRight => {
                let before = session.grabbed_original()?;
                let after = match before {
                    ClipData::Audio(c) => {
                        let end = ctx.snapped_position(ClipKind::Audio, c.end_time(), dx, bypass);
                        Ok(ClipData::Audio(EditProcessor::trim_audio_right(
                            c,
                            end - c.start_time,
                            editing.audio_min_duration,
                        )))
                    }
                    ClipData::Midi(_) => Err(crate::error::EditError::WrongClipKind),
                };
                Self::edit_preview(before, after)
            }
            GestureKind::Resize => {
                let before = session.grabbed_original()?;
                let after = match before {
                    ClipData::Midi(c) => {
                        let duration = ctx
                            .snapper()
                            .snap_or_bypass(c.duration + ctx.coords.pixels_to_beats(dx), bypass);
                        EditProcessor::resize_midi(
                            c,
                            duration,
                            editing.midi_min_resize_beats,
                            editing.midi_max_resize_beats,
                        )
                        .map(ClipData::Midi)
                    }
                    ClipData::Audio(_) => Err(crate::error::EditError::WrongClipKind),
                };
                Self::edit_preview(before, after)
            }
            GestureKind::Create => {
                let snapper = ctx.snapper();
                let a = snapper
                    .snap_or_bypass(ctx.coords.pixels_to_beats(session.start_pointer.x as f64), bypass)
                    .max(0.0);
                let b = snapper
                    .snap_or_bypass(ctx.coords.pixels_to_beats(session.current_pointer.x as f64), bypass)
                    .max(0.0);
                Some(DragPreview::Create {
                    track: session.target.track(),
                    start_beat: a.min(b),
                    end_beat: a.max(b),
                })
            }
            GestureKind::Erase | GestureKind::TrackReorder => None,
        }
    }

    fn edit_preview(
        before: &ClipData,
        after: Result<ClipData, crate::error::EditError>,
    ) -> Option<DragPreview> {
        match after {
            Ok(after) => Some(DragPreview::Edit {
                before: before.clone(),
                after,
            }),
            Err(err) => {
                log::debug!("Edit of {:?} ignored: {}", before.clip_ref(), err);
                None
            }
        }
    }

    fn commit(session: &DragSession, ctx: &DragContext<'_>) -> Option<CommittedEdit> {
        let epsilon = ctx.config.editing.move_epsilon;
        match Self::evaluate(session, ctx)? {
            DragPreview::Move(moves) => {
                let moves: Vec<ClipMove> = moves
                    .into_iter()
                    .filter(|m| (m.to - m.from).abs() > epsilon)
                    .collect();
                (!moves.is_empty()).then_some(CommittedEdit::Move(moves))
            }
            DragPreview::Duplicate { source, starts } => {
                Some(CommittedEdit::Duplicate { source, starts })
            }
            DragPreview::Edit { before, after } => {
                let changed = (after.start() - before.start()).abs() > epsilon
                    || (after.duration() - before.duration()).abs() > epsilon;
                if !changed {
                    return None;
                }
                if session.kind == GestureKind::Resize {
                    Some(CommittedEdit::Resize { before, after })
                } else {
                    Some(CommittedEdit::Trim { before, after })
                }
            }
            DragPreview::Create {
                track,
                start_beat,
                end_beat,
            } => {
                let duration = end_beat - start_beat;
                if duration < ctx.config.editing.min_create_beats {
                    log::debug!("Create drag of {} beats is shorter than a bar", duration);
                    return None;
                }
                match track {
                    None => Some(CommittedEdit::CreatePrompt {
                        start_beat,
                        duration,
                    }),
                    Some(track) => match ctx.state.tracks.get(track).map(|t| t.track_type) {
                        Some(TrackType::Midi) => Some(CommittedEdit::CreateClip {
                            track,
                            start_beat,
                            duration,
                        }),
                        other => {
                            log::debug!("Cannot draw a MIDI clip on {:?} track {}", other, track);
                            None
                        }
                    },
                }
            }
        }
    }
}
