use egui::{Pos2, Rect, pos2};

use crate::config::InteractionConfig;
use crate::model::{ClipRef, TrackId};
use crate::repository::ClipView;
use crate::state::ArrangementState;
use crate::time_utils::CoordinateSystem;

/// Which part of a clip the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipHandle {
    Body,
    LeftEdge,
    RightEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Clip {
        clip: ClipRef,
        track: TrackId,
        handle: ClipHandle,
    },
    /// Track row, outside any clip.
    Lane { track: TrackId },
    /// Track header. Never produced by `hit_test`; the header widget reports it.
    TrackHeader { track: TrackId },
    Empty,
}

impl HitTarget {
    pub fn track(&self) -> Option<TrackId> {
        match *self {
            HitTarget::Clip { track, .. }
            | HitTarget::Lane { track }
            | HitTarget::TrackHeader { track } => Some(track),
            HitTarget::Empty => None,
        }
    }
}

/// Row geometry in content space: x = 0 at beat 0, y = 0 at the top of the
/// first row, rows of equal height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLayout {
    pub row_height: f32,
    pub edge_handle: f32,
}

impl Default for TrackLayout {
    fn default() -> Self {
        Self::from_config(&InteractionConfig::default())
    }
}

impl TrackLayout {
    pub fn from_config(config: &InteractionConfig) -> Self {
        Self {
            row_height: config.track_height.max(1.0),
            edge_handle: config.edge_handle_px.max(0.0),
        }
    }

    pub fn row_at_y(&self, y: f32) -> Option<usize> {
        if !y.is_finite() || y < 0.0 {
            return None;
        }
        Some((y / self.row_height) as usize)
    }

    pub fn row_top(&self, row: usize) -> f32 {
        row as f32 * self.row_height
    }

    pub fn row_center(&self, row: usize) -> f32 {
        self.row_top(row) + self.row_height * 0.5
    }

    /// Index a row would take if its center sat at `center_y`, among
    /// `row_count` rows.
    pub fn gap_index(&self, center_y: f32, row_count: usize) -> usize {
        if row_count == 0 {
            return 0;
        }
        let index = (center_y / self.row_height).floor();
        if index <= 0.0 {
            0
        } else {
            (index as usize).min(row_count - 1)
        }
    }

    pub fn clip_rect(
        &self,
        state: &ArrangementState,
        coords: &CoordinateSystem,
        clip: ClipRef,
    ) -> Option<Rect> {
        let view = state.clips.get(clip)?;
        let row = state.tracks.row_of(view.track_id())?;
        Some(self.view_rect(&view, row, coords))
    }

    fn view_rect(&self, view: &ClipView<'_>, row: usize, coords: &CoordinateSystem) -> Rect {
        let (x0, x1) = match view {
            ClipView::Audio(c) => (
                coords.seconds_to_pixels(c.start_time),
                coords.seconds_to_pixels(c.end_time()),
            ),
            ClipView::Midi(c) => (
                coords.beats_to_pixels(c.start_beat),
                coords.beats_to_pixels(c.end_beat()),
            ),
        };
        let top = self.row_top(row);
        Rect::from_min_max(
            pos2(x0 as f32, top),
            pos2(x1 as f32, top + self.row_height),
        )
    }

    /// Every clip whose box contains `pos`.
    pub fn clips_at(
        &self,
        state: &ArrangementState,
        coords: &CoordinateSystem,
        pos: Pos2,
    ) -> Vec<ClipRef> {
        let Some(row) = self.row_at_y(pos.y) else {
            return Vec::new();
        };
        let Some(track) = state.tracks.track_at_row(row) else {
            return Vec::new();
        };
        state
            .clips
            .clips_on_track(track.id)
            .iter()
            .filter(|view| self.view_rect(view, row, coords).contains(pos))
            .map(ClipView::clip_ref)
            .collect()
    }

    /// Topmost clip under `pos` and the handle grabbed, else the lane.
    pub fn hit_test(
        &self,
        state: &ArrangementState,
        coords: &CoordinateSystem,
        pos: Pos2,
    ) -> HitTarget {
        let Some(row) = self.row_at_y(pos.y) else {
            return HitTarget::Empty;
        };
        let Some(track) = state.tracks.track_at_row(row) else {
            return HitTarget::Empty;
        };

        let hit = state
            .clips
            .clips_on_track(track.id)
            .iter()
            .rev()
            .find_map(|view| {
                let rect = self.view_rect(view, row, coords);
                rect.contains(pos)
                    .then(|| (view.clip_ref(), self.handle_at(rect, pos.x)))
            });

        match hit {
            Some((clip, handle)) => HitTarget::Clip {
                clip,
                track: track.id,
                handle,
            },
            None => HitTarget::Lane { track: track.id },
        }
    }

    fn handle_at(&self, rect: Rect, x: f32) -> ClipHandle {
        if rect.width() < self.edge_handle * 3.0 {
            ClipHandle::Body
        } else if x - rect.left() <= self.edge_handle {
            ClipHandle::LeftEdge
        } else if rect.right() - x <= self.edge_handle {
            ClipHandle::RightEdge
        } else {
            ClipHandle::Body
        }
    }
}
