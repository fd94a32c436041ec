use crate::constants::{MAX_TIMELINE_ZOOM, MIN_TEMPO_BPM, MIN_TIMELINE_ZOOM};

/// Conversions between seconds, beats and timeline pixels for the current
/// tempo and zoom.
///
/// Every conversion derives from the same two factors, so going
/// seconds -> beats -> pixels lands on the same value as seconds -> pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSystem {
    bpm: f64,
    pixels_per_beat: f64,
}

impl CoordinateSystem {
    pub fn new(bpm: f64, pixels_per_beat: f64) -> Self {
        Self {
            bpm: sanitize_bpm(bpm),
            pixels_per_beat: clamp_zoom(pixels_per_beat),
        }
    }

    #[inline]
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    #[inline]
    pub fn pixels_per_beat(&self) -> f64 {
        self.pixels_per_beat
    }

    #[inline]
    pub fn beats_per_second(&self) -> f64 {
        self.bpm / 60.0
    }

    #[inline]
    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_beat * self.beats_per_second()
    }

    /// Update BPM (for tempo changes)
    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = sanitize_bpm(bpm);
    }

    pub fn set_pixels_per_beat(&mut self, pixels_per_beat: f64) {
        self.pixels_per_beat = clamp_zoom(pixels_per_beat);
    }

    /// Multiply the zoom by `factor`, staying inside the zoom bounds.
    pub fn zoom_by(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.set_pixels_per_beat(self.pixels_per_beat * factor);
        }
    }

    #[inline]
    pub fn seconds_to_pixels(&self, seconds: f64) -> f64 {
        seconds * self.pixels_per_second()
    }

    #[inline]
    pub fn pixels_to_seconds(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_second()
    }

    #[inline]
    pub fn beats_to_pixels(&self, beats: f64) -> f64 {
        beats * self.pixels_per_beat
    }

    #[inline]
    pub fn pixels_to_beats(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_beat
    }

    #[inline]
    pub fn seconds_to_beats(&self, seconds: f64) -> f64 {
        seconds * self.beats_per_second()
    }

    #[inline]
    pub fn beats_to_seconds(&self, beats: f64) -> f64 {
        beats / self.beats_per_second()
    }
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::new(
            crate::constants::DEFAULT_BPM,
            crate::constants::DEFAULT_TIMELINE_ZOOM,
        )
    }
}

fn sanitize_bpm(bpm: f64) -> f64 {
    if bpm.is_finite() {
        bpm.max(MIN_TEMPO_BPM)
    } else {
        MIN_TEMPO_BPM
    }
}

fn clamp_zoom(pixels_per_beat: f64) -> f64 {
    if pixels_per_beat.is_finite() {
        pixels_per_beat.clamp(MIN_TIMELINE_ZOOM, MAX_TIMELINE_ZOOM)
    } else {
        MIN_TIMELINE_ZOOM
    }
}

/// Format time in bars:beats:sixteenths
pub fn format_bars_beats_sixteenths(beats: f64, beats_per_bar: u32) -> String {
    let beats = beats.max(0.0);
    let bars = (beats / beats_per_bar as f64) as i32 + 1;
    let beat = (beats % beats_per_bar as f64) as i32 + 1;
    let sixteenth = ((beats % 1.0) * 4.0) as i32 + 1;
    format!("{:03}:{:02}:{:02}", bars, beat, sixteenth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_follow_tempo_and_zoom() {
        let coords = CoordinateSystem::new(120.0, 100.0);
        assert_eq!(coords.beats_per_second(), 2.0);
        assert_eq!(coords.pixels_per_second(), 200.0);
        assert_eq!(coords.seconds_to_pixels(1.5), 300.0);
        assert_eq!(coords.pixels_to_beats(250.0), 2.5);
        assert_eq!(coords.beats_to_seconds(3.0), 1.5);
    }

    #[test]
    fn seconds_through_beats_matches_direct_conversion() {
        let coords = CoordinateSystem::new(97.0, 37.0);
        let s = 12.345;
        let via_beats = coords.beats_to_pixels(coords.seconds_to_beats(s));
        assert!((via_beats - coords.seconds_to_pixels(s)).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut coords = CoordinateSystem::new(120.0, 5.0);
        assert_eq!(coords.pixels_per_beat(), 10.0);
        coords.set_pixels_per_beat(1000.0);
        assert_eq!(coords.pixels_per_beat(), 500.0);
        coords.zoom_by(0.5);
        assert_eq!(coords.pixels_per_beat(), 250.0);
    }

    #[test]
    fn non_positive_tempo_is_clamped() {
        let coords = CoordinateSystem::new(0.0, 100.0);
        assert_eq!(coords.bpm(), MIN_TEMPO_BPM);
        assert!(coords.pixels_to_seconds(100.0).is_finite());

        let coords = CoordinateSystem::new(-30.0, 100.0);
        assert_eq!(coords.bpm(), MIN_TEMPO_BPM);
    }

    #[test]
    fn bars_beats_format() {
        assert_eq!(format_bars_beats_sixteenths(0.0, 4), "001:01:01");
        assert_eq!(format_bars_beats_sixteenths(5.25, 4), "002:02:02");
    }
}
