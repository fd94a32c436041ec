use std::path::Path;
use std::sync::Arc;

use egui::Pos2;

use crate::audio_import::{import_audio_file, is_supported_audio_file};
use crate::commands::{
    AddAudioClipCommand, CommandExecutor, CreateMidiClipCommand, CreateTrackCommand,
    DeleteClipsCommand, DuplicateClipCommand, EditCommand, ImmediateExecutor, MoveClipsCommand,
    RenameTrackCommand, ReorderTrackCommand, ResizeClipCommand, SplitClipCommand,
    TrimClipCommand,
};
use crate::config::EditorConfig;
use crate::constants::{BEATS_PER_BAR, SILENT_PEAK_DB};
use crate::engine::{Engine, EngineSync, TrackPoller, fetch_track_infos, parse_peak_levels};
use crate::error::{ArrangerError, Result};
use crate::grid::GridSnapper;
use crate::input::drag::{
    ClickEvent, CommittedEdit, DragAction, DragContext, DragController, DragPhase, DragPreview,
};
use crate::input::{InputModifiers, ToolMode};
use crate::layout::{HitTarget, TrackLayout};
use crate::messages::{EditorEvent, EditorObserver, EventBus};
use crate::model::{ClipKind, ClipRef, TrackId, TrackInfo, TrackType};
use crate::state::ArrangementState;
use crate::time_utils::{CoordinateSystem, format_bars_beats_sixteenths};
use crate::track_manager::{RefreshOutcome, TrackBuilder};


/// A create drag released over empty space, waiting for the user to pick a
/// track type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingCreate {
    pub start_beat: f64,
    pub duration: f64,
}

fn bars(beats: f64) -> String {
    format_bars_beats_sixteenths(beats, BEATS_PER_BAR as u32)
}

/// The arrangement view's editing core.
///
/// Feed it pointer events in content-space pixels and read back state,
/// previews and events. Every undoable change goes through the command
/// executor; events from each command are published on the bus afterwards.
pub struct Arrangement {
    state: ArrangementState,
    coords: CoordinateSystem,
    layout: TrackLayout,
    config: EditorConfig,
    tool: ToolMode,
    drag: DragController,
    bus: EventBus,
    executor: Box<dyn CommandExecutor>,
    engine: Option<Arc<dyn Engine>>,
    poller: Option<TrackPoller>,
    pending_create: Option<PendingCreate>,
}

impl Arrangement {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            state: ArrangementState::new(),
            coords: CoordinateSystem::new(config.default_bpm, config.default_zoom),
            layout: TrackLayout::from_config(&config.interaction),
            config,
            tool: ToolMode::default(),
            drag: DragController::new(),
            bus: EventBus::new(),
            executor: Box::new(ImmediateExecutor::new()),
            engine: None,
            poller: None,
            pending_create: None,
        }
    }

    /// Editor wired to an engine: edits are pushed to it through an
    /// [`EngineSync`] observer.
    pub fn with_engine(config: EditorConfig, engine: Arc<dyn Engine>) -> Self {
        let mut arrangement = Self::new(config);
        arrangement
            .bus
            .subscribe(Arc::new(EngineSync::new(engine.clone())));
        arrangement.engine = Some(engine);
        arrangement
    }

    pub fn set_executor(&mut self, executor: Box<dyn CommandExecutor>) {
        self.executor = executor;
    }

    pub fn subscribe(&mut self, observer: Arc<dyn EditorObserver>) {
        self.bus.subscribe(observer);
    }

    pub fn unsubscribe(&mut self, id: &str) -> usize {
        self.bus.unsubscribe(id)
    }

    pub fn state(&self) -> &ArrangementState {
        &self.state
    }

    /// Direct access for loading a project. Changes made here bypass the
    /// command executor and publish no events.
    pub fn state_mut(&mut self) -> &mut ArrangementState {
        &mut self.state
    }

    pub fn coords(&self) -> &CoordinateSystem {
        &self.coords
    }

    pub fn layout(&self) -> &TrackLayout {
        &self.layout
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn pending_create(&self) -> Option<PendingCreate> {
        self.pending_create
    }

    pub fn hit_test(&self, pos: Pos2) -> HitTarget {
        self.layout.hit_test(&self.state, &self.coords, pos)
    }

    // Pointer input

    pub fn pointer_down(&mut self, pos: Pos2) {
        let target = self.hit_test(pos);
        self.press(pos, target);
    }

    /// Press on a track header. Headers live outside the content area, so the
    /// header widget reports the press itself.
    pub fn pointer_down_on_header(&mut self, track: TrackId, pos: Pos2) {
        self.press(pos, HitTarget::TrackHeader { track });
    }

    fn press(&mut self, pos: Pos2, target: HitTarget) {
        let is_master = target
            .track()
            .and_then(|t| self.state.tracks.get(t))
            .is_some_and(|t| t.is_master());
        self.drag.pointer_down(pos, target, is_master);
    }

    pub fn pointer_move(&mut self, pos: Pos2, modifiers: InputModifiers) {
        let ctx = DragContext {
            state: &self.state,
            coords: &self.coords,
            layout: &self.layout,
            config: &self.config,
            tool: self.tool,
        };
        let actions = self.drag.pointer_move(&ctx, pos, modifiers);
        self.apply_drag_actions(actions);
    }

    pub fn pointer_up(&mut self, pos: Pos2, modifiers: InputModifiers) {
        let ctx = DragContext {
            state: &self.state,
            coords: &self.coords,
            layout: &self.layout,
            config: &self.config,
            tool: self.tool,
        };
        let actions = self.drag.pointer_up(&ctx, pos, modifiers);
        self.apply_drag_actions(actions);
    }

    /// The gesture was taken away (focus loss, another recognizer won).
    pub fn pointer_cancel(&mut self) {
        let actions = self.drag.cancel();
        self.apply_drag_actions(actions);
    }

    /// What the active drag would do if released now.
    pub fn preview(&self) -> Option<DragPreview> {
        let ctx = DragContext {
            state: &self.state,
            coords: &self.coords,
            layout: &self.layout,
            config: &self.config,
            tool: self.tool,
        };
        self.drag.preview(&ctx)
    }

    fn apply_drag_actions(&mut self, actions: Vec<DragAction>) {
        for action in actions {
            match action {
                DragAction::Erase(clip) => {
                    self.execute(Box::new(DeleteClipsCommand::new(vec![clip])));
                }
                DragAction::ReorderTrack { from, to } => {
                    self.state.tracks.move_track(from, to);
                }
                DragAction::Commit(edit) => self.commit(edit),
                DragAction::Click(click) => self.click(click),
            }
        }
    }

    fn commit(&mut self, edit: CommittedEdit) {
        match edit {
            CommittedEdit::Move(moves) => {
                if let Some(first) = moves.first() {
                    let beats = match first.clip.kind {
                        ClipKind::Audio => self.coords.seconds_to_beats(first.to),
                        ClipKind::Midi => first.to,
                    };
                    log::info!("Moving {} clip(s) to {}", moves.len(), bars(beats));
                }
                self.execute(Box::new(MoveClipsCommand::new(moves, self.coords)));
            }
            CommittedEdit::Duplicate { source, starts } => {
                self.execute(Box::new(DuplicateClipCommand::new(source, starts)));
            }
            CommittedEdit::Trim { before, after } => {
                self.execute(Box::new(TrimClipCommand::new(before, after, self.coords)));
            }
            CommittedEdit::Resize { after, .. } => {
                self.execute(Box::new(ResizeClipCommand::new(after)));
            }
            CommittedEdit::CreateClip {
                track,
                start_beat,
                duration,
            } => {
                log::info!("Creating MIDI clip at {} on track {}", bars(start_beat), track);
                self.execute(Box::new(CreateMidiClipCommand::new(
                    track, start_beat, duration,
                )));
            }
            CommittedEdit::CreatePrompt {
                start_beat,
                duration,
            } => {
                log::info!("Create at {} needs a track type", bars(start_beat));
                self.pending_create = Some(PendingCreate {
                    start_beat,
                    duration,
                });
            }
            CommittedEdit::ReorderTrack { from, to } => {
                self.execute(Box::new(ReorderTrackCommand::new(from, to)));
            }
        }
    }

    fn click(&mut self, click: ClickEvent) {
        match click.target {
            HitTarget::Clip { clip, .. } => match self.tool {
                ToolMode::Slice => {
                    let bypass = click.modifiers.is_held(self.config.modifiers.snap_bypass);
                    let beats = GridSnapper::new(self.coords.pixels_per_beat())
                        .snap_or_bypass(self.coords.pixels_to_beats(click.pos.x as f64), bypass)
                        .max(0.0);
                    let at = match clip.kind {
                        ClipKind::Audio => self.coords.beats_to_seconds(beats),
                        ClipKind::Midi => beats,
                    };
                    self.split_at(clip, at);
                }
                ToolMode::Eraser => {
                    self.execute(Box::new(DeleteClipsCommand::new(vec![clip])));
                }
                _ => self.click_clip(clip, click.modifiers),
            },
            HitTarget::Lane { .. } | HitTarget::Empty if self.tool == ToolMode::Select => {
                self.clear_selection();
            }
            other => log::debug!("Click on {:?} with {:?} ignored", other, self.tool),
        }
    }

    // Selection

    /// Select a clip the way a click with these modifiers would.
    pub fn click_clip(&mut self, clip: ClipRef, modifiers: InputModifiers) {
        if !self.state.clips.contains(clip) {
            log::debug!("Click on missing clip {:?} ignored", clip);
            return;
        }
        let mode = modifiers.selection_mode(&self.config.modifiers);
        let before = self.state.selection.selected();
        self.state.selection.select(clip, mode);
        self.publish_selection_if_changed(before);
    }

    /// Select every clip of the kind already selected, or every audio clip
    /// when nothing is, or every MIDI clip when there is no audio. Only one
    /// kind is filled since a selection never mixes audio and MIDI.
    pub fn select_all(&mut self) {
        let clips = &self.state.clips;
        let kind = match self.state.selection.active_kind() {
            Some(kind) => kind,
            None if clips.audio_clips().next().is_some() => ClipKind::Audio,
            None => ClipKind::Midi,
        };
        let ids = clips.ids_of(kind);
        let before = self.state.selection.selected();
        self.state.selection.select_all_of(kind, ids);
        self.publish_selection_if_changed(before);
    }

    pub fn clear_selection(&mut self) {
        let before = self.state.selection.selected();
        self.state.selection.clear();
        self.publish_selection_if_changed(before);
    }

    fn publish_selection_if_changed(&mut self, before: Vec<ClipRef>) {
        let after = self.state.selection.selected();
        if after != before {
            self.bus.publish(&EditorEvent::SelectionChanged(after));
        }
    }

    // Clip edits

    pub fn delete_selected(&mut self) -> usize {
        let selected = self.state.selection.selected();
        if selected.is_empty() {
            return 0;
        }
        let events = self.execute(Box::new(DeleteClipsCommand::new(selected)));
        events
            .iter()
            .map(|e| match e {
                EditorEvent::ClipsDeleted(deleted) => deleted.len(),
                _ => 0,
            })
            .sum()
    }

    /// Split one clip at an absolute position in its native unit (seconds for
    /// audio, beats for MIDI). Returns whether the clip was split.
    pub fn split_at(&mut self, clip: ClipRef, at: f64) -> bool {
        let beats = match clip.kind {
            ClipKind::Audio => self.coords.seconds_to_beats(at),
            ClipKind::Midi => at,
        };
        log::debug!("Split {:?} at {}", clip, bars(beats));
        let min_loop = self.config.editing.midi_min_length_beats;
        let events = self.execute(Box::new(SplitClipCommand::new(clip, at, min_loop)));
        events
            .iter()
            .any(|e| matches!(e, EditorEvent::ClipSplit { .. }))
    }

    /// Split every selected clip that spans the timeline position `seconds`.
    pub fn split_selected_at(&mut self, seconds: f64) -> usize {
        let beats = self.coords.seconds_to_beats(seconds);
        let targets: Vec<(ClipRef, f64)> = self
            .state
            .selection
            .selected()
            .into_iter()
            .filter_map(|clip| {
                let data = self.state.clips.get(clip)?.to_data();
                let at = match clip.kind {
                    ClipKind::Audio => seconds,
                    ClipKind::Midi => beats,
                };
                (at > data.start() && at < data.end()).then_some((clip, at))
            })
            .collect();

        targets
            .into_iter()
            .filter(|&(clip, at)| self.split_at(clip, at))
            .count()
    }

    /// Load dropped audio files onto an audio track, back to back from
    /// `start_seconds`. Unsupported files are skipped silently; files the
    /// engine cannot load are logged and skipped.
    pub fn drop_files<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        track: TrackId,
        start_seconds: f64,
    ) -> Vec<ClipRef> {
        let Some(engine) = self.engine.clone() else {
            log::warn!("No engine, dropped files ignored");
            return Vec::new();
        };
        match self.state.tracks.get(track) {
            Some(t) if t.track_type == TrackType::Audio => {}
            Some(t) => {
                log::debug!("Drop on {:?} track {} ignored", t.track_type, track);
                return Vec::new();
            }
            None => {
                log::warn!("Drop on missing track {}", track);
                return Vec::new();
            }
        }

        let mut added = Vec::new();
        let mut cursor = start_seconds.max(0.0);
        for path in paths {
            let path = path.as_ref();
            if !is_supported_audio_file(path) {
                log::debug!("Skipping {}", path.display());
                continue;
            }
            match import_audio_file(engine.as_ref(), path, track, cursor) {
                Ok(clip) => {
                    cursor = clip.end_time();
                    let clip_ref = clip.clip_ref();
                    self.execute(Box::new(AddAudioClipCommand::new(clip)));
                    added.push(clip_ref);
                }
                Err(e) => log::warn!("Failed to import {}: {}", path.display(), e),
            }
        }
        added
    }

    // Tracks

    /// Rename a track. Blank names are ignored.
    pub fn rename_track(&mut self, track: TrackId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let events = self.execute(Box::new(RenameTrackCommand::new(track, name)));
        !events.is_empty()
    }

    /// Create a regular track, on the engine when there is one. `None` for
    /// Master, which the engine owns.
    pub fn create_track(&mut self, track_type: TrackType, name: Option<&str>) -> Option<TrackId> {
        if track_type == TrackType::Master {
            log::warn!("Master track cannot be created");
            return None;
        }
        let ordinal = self.state.tracks.next_ordinal(track_type);
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => track_type.default_name(ordinal),
        };

        let engine_id = self.engine.as_ref().and_then(|engine| {
            engine
                .create_track(track_type, &name)
                .map_err(|e| log::warn!("Engine could not create track '{}': {}", name, e))
                .ok()
        });
        let id = match engine_id {
            Some(id) if !self.state.tracks.contains(id) => id,
            _ => self.state.clips.next_id(),
        };

        let track = TrackBuilder::new(id, track_type)
            .with_ordinal(ordinal)
            .with_name(name)
            .build();
        self.execute(Box::new(CreateTrackCommand::new(track)));
        Some(id)
    }

    /// Finish a create drag released over empty space: make the track and,
    /// for MIDI, the clip.
    pub fn resolve_create_prompt(
        &mut self,
        track_type: TrackType,
    ) -> Option<(TrackId, Option<ClipRef>)> {
        let pending = self.pending_create.take()?;
        let track = self.create_track(track_type, None)?;
        if track_type != TrackType::Midi {
            return Some((track, None));
        }
        let events = self.execute(Box::new(CreateMidiClipCommand::new(
            track,
            pending.start_beat,
            pending.duration,
        )));
        let clip = events.iter().find_map(|e| match e {
            EditorEvent::ClipCreated { clip, .. } => Some(*clip),
            _ => None,
        });
        Some((track, clip))
    }

    pub fn cancel_create_prompt(&mut self) {
        self.pending_create = None;
    }

    // Engine sync

    /// Merge an engine track snapshot by id. Tracks the engine dropped take
    /// their clips with them.
    pub fn apply_track_refresh(&mut self, infos: Vec<TrackInfo>) -> RefreshOutcome {
        let before = self.state.selection.selected();
        let outcome = self.state.tracks.apply_refresh(infos);
        if let Some(max) = self.state.tracks.max_id() {
            self.state.clips.seed_ids(max);
        }
        for &track in &outcome.removed {
            let clips = self.state.remove_track(track);
            if !clips.is_empty() {
                log::info!("Track {} removed with {} clip(s)", track, clips.len());
            }
        }

        if !outcome.is_empty() {
            log::info!(
                "Track refresh: {} added, {} updated, {} removed",
                outcome.added.len(),
                outcome.updated.len(),
                outcome.removed.len()
            );
            self.bus.publish(&EditorEvent::TracksRefreshed {
                added: outcome.added.clone(),
                updated: outcome.updated.clone(),
                removed: outcome.removed.clone(),
            });
        }
        self.publish_selection_if_changed(before);
        outcome
    }

    /// Fetch and merge the engine's tracks now.
    pub fn refresh_tracks_now(&mut self) -> Result<RefreshOutcome> {
        let engine = self
            .engine
            .clone()
            .ok_or_else(|| ArrangerError::Engine("no engine attached".into()))?;
        let infos = fetch_track_infos(engine.as_ref())?;
        Ok(self.apply_track_refresh(infos))
    }

    /// Start the background track poller. Returns false without an engine.
    pub fn start_track_polling(&mut self) -> bool {
        let Some(engine) = self.engine.clone() else {
            return false;
        };
        if let Some(mut old) = self.poller.take() {
            old.stop();
        }
        self.poller = Some(TrackPoller::spawn(
            engine,
            self.config.sync.track_refresh_interval(),
        ));
        true
    }

    pub fn stop_track_polling(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
    }

    /// Merge the newest snapshot from the poller, if one arrived.
    pub fn drain_track_refresh(&mut self) -> Option<RefreshOutcome> {
        let infos = self.poller.as_ref()?.try_latest()?;
        Some(self.apply_track_refresh(infos))
    }

    /// Left/right peak levels in dB, silence when unknown.
    pub fn track_levels(&self, track: TrackId) -> (f32, f32) {
        let Some(engine) = &self.engine else {
            return (SILENT_PEAK_DB, SILENT_PEAK_DB);
        };
        match engine.get_track_peak_levels(track) {
            Ok(csv) => parse_peak_levels(&csv),
            Err(e) => {
                log::debug!("No levels for track {}: {}", track, e);
                (SILENT_PEAK_DB, SILENT_PEAK_DB)
            }
        }
    }

    // View

    pub fn set_tempo(&mut self, bpm: f64) {
        self.coords.set_bpm(bpm);
    }

    pub fn set_zoom(&mut self, pixels_per_beat: f64) {
        self.coords.set_pixels_per_beat(pixels_per_beat);
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.coords.zoom_by(factor);
    }

    pub fn set_tool(&mut self, tool: ToolMode) {
        if tool != self.tool {
            log::debug!("Tool {:?} -> {:?}", self.tool, tool);
            self.tool = tool;
        }
    }

    fn execute(&mut self, command: Box<dyn EditCommand>) -> Vec<EditorEvent> {
        let before = self.state.selection.selected();
        let mut events = self.executor.execute(command, &mut self.state);
        let after = self.state.selection.selected();
        let reported = events
            .iter()
            .any(|e| matches!(e, EditorEvent::SelectionChanged(_)));
        if after != before && !reported {
            events.push(EditorEvent::SelectionChanged(after));
        }
        self.bus.publish_all(&events);
        events
    }
}
