pub mod drag;
pub mod gestures;

use serde::{Deserialize, Serialize};

use crate::config::ModifierBindings;
use crate::selection::SelectionMode;

/// A modifier key as it can be bound in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKey {
    Shift,
    Alt,
    /// Ctrl, or Cmd on macOS
    Command,
}

/// Held modifiers, sampled once per input tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputModifiers {
    pub shift: bool,
    pub alt: bool,
    pub command: bool,
}

impl InputModifiers {
    pub const NONE: Self = Self {
        shift: false,
        alt: false,
        command: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn command() -> Self {
        Self {
            command: true,
            ..Self::NONE
        }
    }

    pub fn is_held(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Shift => self.shift,
            ModifierKey::Alt => self.alt,
            ModifierKey::Command => self.command,
        }
    }

    /// Selection mode for a click. Add wins when both bindings are held.
    pub fn selection_mode(&self, bindings: &ModifierBindings) -> SelectionMode {
        if self.is_held(bindings.add_to_selection) {
            SelectionMode::Add
        } else if self.is_held(bindings.toggle_selection) {
            SelectionMode::Toggle
        } else {
            SelectionMode::Replace
        }
    }
}

impl From<egui::Modifiers> for InputModifiers {
    fn from(m: egui::Modifiers) -> Self {
        Self {
            shift: m.shift,
            alt: m.alt,
            command: m.command || m.ctrl || m.mac_cmd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    Draw,
    #[default]
    Select,
    Eraser,
    Duplicate,
    Slice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egui_modifiers_fold_ctrl_and_cmd() {
        let m = egui::Modifiers {
            ctrl: true,
            ..Default::default()
        };
        assert!(InputModifiers::from(m).command);
        assert!(InputModifiers::from(egui::Modifiers::SHIFT).shift);
    }

    #[test]
    fn click_modes_follow_bindings() {
        let bindings = ModifierBindings::default();
        assert_eq!(InputModifiers::NONE.selection_mode(&bindings), SelectionMode::Replace);
        assert_eq!(InputModifiers::shift().selection_mode(&bindings), SelectionMode::Add);
        assert_eq!(InputModifiers::command().selection_mode(&bindings), SelectionMode::Toggle);
    }
}
