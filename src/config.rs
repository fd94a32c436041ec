use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::Result;
use crate::input::ModifierKey;
use crate::paths::config_path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub interaction: InteractionConfig,
    pub editing: EditingConfig,
    pub modifiers: ModifierBindings,
    pub sync: SyncConfig,
    pub default_bpm: f64,
    pub default_zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pointer travel before a press becomes a drag.
    pub drag_threshold_px: f32,
    pub edge_handle_px: f32,
    pub track_height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    pub audio_min_duration: f64,
    pub move_epsilon: f64,
    pub min_create_beats: f64,
    pub midi_min_resize_beats: f64,
    pub midi_max_resize_beats: f64,
    pub midi_min_length_beats: f64,
}

/// Which held key means what. Plain clicks always replace the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierBindings {
    pub add_to_selection: ModifierKey,
    pub toggle_selection: ModifierKey,
    pub duplicate: ModifierKey,
    pub erase: ModifierKey,
    pub snap_bypass: ModifierKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub track_refresh_interval_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            interaction: InteractionConfig::default(),
            editing: EditingConfig::default(),
            modifiers: ModifierBindings::default(),
            sync: SyncConfig::default(),
            default_bpm: DEFAULT_BPM,
            default_zoom: DEFAULT_TIMELINE_ZOOM,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: DRAG_THRESHOLD_PX,
            edge_handle_px: EDGE_RESIZE_THRESHOLD,
            track_height: TRACK_HEIGHT,
        }
    }
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            audio_min_duration: AUDIO_MIN_CLIP_SECONDS,
            move_epsilon: MOVE_EPSILON,
            min_create_beats: MIN_CREATE_BEATS,
            midi_min_resize_beats: MIDI_MIN_RESIZE_BEATS,
            midi_max_resize_beats: MIDI_MAX_RESIZE_BEATS,
            midi_min_length_beats: MIDI_MIN_LOOP_BEATS,
        }
    }
}

impl Default for ModifierBindings {
    fn default() -> Self {
        Self {
            add_to_selection: ModifierKey::Shift,
            toggle_selection: ModifierKey::Command,
            duplicate: ModifierKey::Alt,
            erase: ModifierKey::Shift,
            snap_bypass: ModifierKey::Command,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            track_refresh_interval_ms: TRACK_REFRESH_INTERVAL_MS,
        }
    }
}

impl SyncConfig {
    pub fn track_refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.track_refresh_interval_ms.max(1))
    }
}

impl EditorConfig {
    /// Load from the platform config directory. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(path) = config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
