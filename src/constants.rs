// Tempo
pub const DEFAULT_BPM: f64 = 120.0;
pub const MIN_TEMPO_BPM: f64 = 1.0;

// Timeline Constants
pub const DEFAULT_TIMELINE_ZOOM: f64 = 100.0; // pixels per beat
pub const MIN_TIMELINE_ZOOM: f64 = 10.0;
pub const MAX_TIMELINE_ZOOM: f64 = 500.0;
pub const TIMELINE_ZOOM_FACTOR: f64 = 1.25;
pub const BEATS_PER_BAR: f64 = 4.0;

// Layout Constants
pub const TRACK_HEIGHT: f32 = 80.0;

// Interaction Constants
pub const DRAG_THRESHOLD_PX: f32 = 8.0;
pub const EDGE_RESIZE_THRESHOLD: f32 = 5.0;

// Edit limits
pub const AUDIO_MIN_CLIP_SECONDS: f64 = 0.1;
pub const MOVE_EPSILON: f64 = 0.001;
pub const MIN_CREATE_BEATS: f64 = BEATS_PER_BAR;
pub const MIDI_MIN_RESIZE_BEATS: f64 = 1.0;
pub const MIDI_MAX_RESIZE_BEATS: f64 = 256.0;
pub const MIDI_MIN_LOOP_BEATS: f64 = 0.25;

// Engine sync
pub const TRACK_REFRESH_INTERVAL_MS: u64 = 2000;
pub const SILENT_PEAK_DB: f32 = -96.0;

// Default Track Names
pub const DEFAULT_AUDIO_TRACK_PREFIX: &str = "Audio";
pub const DEFAULT_MIDI_TRACK_PREFIX: &str = "MIDI";
pub const DEFAULT_MIDI_CLIP_NAME: &str = "MIDI Clip";
pub const MASTER_TRACK_NAME: &str = "Master";

// File Extensions
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "aif", "aiff", "flac"];

// Engine waveform request
pub const WAVEFORM_PEAK_RESOLUTION: usize = 512;
