use egui::Vec2;

use super::{InputModifiers, ToolMode};
use crate::config::ModifierBindings;
use crate::layout::{ClipHandle, HitTarget};
use crate::model::ClipKind;

/// What an active drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Duplicate,
    TrimLeft,
    TrimRight,
    Resize,
    Create,
    Erase,
    TrackReorder,
}

/// Everything classification looks at, captured when the drag starts.
#[derive(Debug, Clone, Copy)]
pub struct GestureInput {
    pub tool: ToolMode,
    pub target: HitTarget,
    /// The target is the Master track (headers only).
    pub target_is_master: bool,
    pub modifiers: InputModifiers,
}

/// Has the pointer travelled far enough from the press to count as a drag?
#[inline]
pub fn exceeds_threshold(delta: Vec2, threshold: f32) -> bool {
    delta.length() > threshold
}

/// Decide the gesture a drag starts. `None` means the drag does nothing.
pub fn classify(input: &GestureInput, bindings: &ModifierBindings) -> Option<GestureKind> {
    let held = |key| input.modifiers.is_held(key);

    if let HitTarget::TrackHeader { .. } = input.target {
        return (!input.target_is_master).then_some(GestureKind::TrackReorder);
    }
    if input.tool == ToolMode::Eraser {
        return Some(GestureKind::Erase);
    }

    match input.target {
        HitTarget::Clip { clip, handle, .. } => match handle {
            ClipHandle::LeftEdge => Some(GestureKind::TrimLeft),
            ClipHandle::RightEdge => match clip.kind {
                ClipKind::Audio => Some(GestureKind::TrimRight),
                ClipKind::Midi => Some(GestureKind::Resize),
            },
            ClipHandle::Body => {
                if input.tool == ToolMode::Duplicate || held(bindings.duplicate) {
                    Some(GestureKind::Duplicate)
                } else if held(bindings.erase) {
                    Some(GestureKind::Erase)
                } else if input.tool == ToolMode::Slice {
                    None
                } else {
                    Some(GestureKind::Move)
                }
            }
        },
        HitTarget::Lane { .. } | HitTarget::Empty => {
            (input.tool == ToolMode::Draw).then_some(GestureKind::Create)
        }
        HitTarget::TrackHeader { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClipRef;

    fn body(kind: ClipKind) -> HitTarget {
        HitTarget::Clip {
            clip: ClipRef { kind, id: 1 },
            track: 1,
            handle: ClipHandle::Body,
        }
    }

    fn edge(kind: ClipKind, handle: ClipHandle) -> HitTarget {
        HitTarget::Clip {
            clip: ClipRef { kind, id: 1 },
            track: 1,
            handle,
        }
    }

    fn run(tool: ToolMode, target: HitTarget, modifiers: InputModifiers) -> Option<GestureKind> {
        let input = GestureInput {
            tool,
            target,
            target_is_master: false,
            modifiers,
        };
        classify(&input, &ModifierBindings::default())
    }

    #[test]
    fn body_drags() {
        let none = InputModifiers::NONE;
        assert_eq!(run(ToolMode::Select, body(ClipKind::Audio), none), Some(GestureKind::Move));
        assert_eq!(run(ToolMode::Draw, body(ClipKind::Midi), none), Some(GestureKind::Move));
        assert_eq!(
            run(ToolMode::Select, body(ClipKind::Audio), InputModifiers::alt()),
            Some(GestureKind::Duplicate)
        );
        assert_eq!(run(ToolMode::Duplicate, body(ClipKind::Midi), none), Some(GestureKind::Duplicate));
        assert_eq!(
            run(ToolMode::Select, body(ClipKind::Audio), InputModifiers::shift()),
            Some(GestureKind::Erase)
        );
        assert_eq!(run(ToolMode::Slice, body(ClipKind::Audio), none), None);
    }

    #[test]
    fn duplicate_modifier_beats_erase_modifier() {
        let both = InputModifiers {
            shift: true,
            alt: true,
            command: false,
        };
        assert_eq!(run(ToolMode::Select, body(ClipKind::Midi), both), Some(GestureKind::Duplicate));
    }

    #[test]
    fn edge_drags_depend_on_clip_kind() {
        let none = InputModifiers::NONE;
        assert_eq!(
            run(ToolMode::Select, edge(ClipKind::Audio, ClipHandle::LeftEdge), none),
            Some(GestureKind::TrimLeft)
        );
        assert_eq!(
            run(ToolMode::Select, edge(ClipKind::Audio, ClipHandle::RightEdge), none),
            Some(GestureKind::TrimRight)
        );
        assert_eq!(
            run(ToolMode::Select, edge(ClipKind::Midi, ClipHandle::RightEdge), none),
            Some(GestureKind::Resize)
        );
    }

    #[test]
    fn lane_drags_create_only_with_draw_tool() {
        let none = InputModifiers::NONE;
        assert_eq!(run(ToolMode::Draw, HitTarget::Lane { track: 1 }, none), Some(GestureKind::Create));
        assert_eq!(run(ToolMode::Draw, HitTarget::Empty, none), Some(GestureKind::Create));
        assert_eq!(run(ToolMode::Select, HitTarget::Lane { track: 1 }, none), None);
        assert_eq!(run(ToolMode::Eraser, HitTarget::Empty, none), Some(GestureKind::Erase));
    }

    #[test]
    fn header_drags_reorder_except_master() {
        let target = HitTarget::TrackHeader { track: 3 };
        assert_eq!(
            run(ToolMode::Eraser, target, InputModifiers::NONE),
            Some(GestureKind::TrackReorder)
        );
        let master = GestureInput {
            tool: ToolMode::Select,
            target,
            target_is_master: true,
            modifiers: InputModifiers::NONE,
        };
        assert_eq!(classify(&master, &ModifierBindings::default()), None);
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!exceeds_threshold(Vec2::new(8.0, 0.0), 8.0));
        assert!(exceeds_threshold(Vec2::new(6.0, 6.0), 8.0));
    }
}
