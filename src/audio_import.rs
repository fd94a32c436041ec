use std::path::Path;
use std::sync::Arc;

use crate::constants::{AUDIO_EXTENSIONS, WAVEFORM_PEAK_RESOLUTION};
use crate::engine::Engine;
use crate::error::{ArrangerError, Result};
use crate::model::{AudioClip, TrackId};

/// Lowercased extension, or an empty string.
fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn is_supported_audio_file(path: &Path) -> bool {
    AUDIO_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Load a dropped file through the engine and build the clip for it.
pub fn import_audio_file(
    engine: &dyn Engine,
    path: &Path,
    track_id: TrackId,
    start_time: f64,
) -> Result<AudioClip> {
    if !is_supported_audio_file(path) {
        return Err(ArrangerError::UnsupportedFile(format!(
            "{} ({})",
            path.display(),
            extension_of(path)
        )));
    }

    let clip_id = engine.load_audio_file(path)?;
    let duration = engine.get_clip_duration(clip_id)?;
    if !(duration.is_finite() && duration > 0.0) {
        return Err(ArrangerError::Engine(format!(
            "clip {} reported duration {}",
            clip_id, duration
        )));
    }
    let peaks = match engine.get_waveform_peaks(clip_id, WAVEFORM_PEAK_RESOLUTION) {
        Ok(peaks) => peaks,
        Err(e) => {
            log::warn!("No waveform for {}: {}", path.display(), e);
            Vec::new()
        }
    };

    let mut clip = AudioClip::new(clip_id, track_id, path, start_time.max(0.0), duration);
    clip.waveform_peaks = Arc::from(peaks);
    Ok(clip)
}
