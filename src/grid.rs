use crate::constants::BEATS_PER_BAR;

/// Snap step chosen for the current zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridResolution {
    Bar,
    Beat,
    Half,
    Quarter,
    Eighth,
}

impl GridResolution {
    /// Pick the resolution for a zoom level given in pixels per beat.
    pub fn for_zoom(pixels_per_beat: f64) -> Self {
        if pixels_per_beat < 10.0 {
            GridResolution::Bar
        } else if pixels_per_beat < 20.0 {
            GridResolution::Beat
        } else if pixels_per_beat < 40.0 {
            GridResolution::Half
        } else if pixels_per_beat < 80.0 {
            GridResolution::Quarter
        } else {
            GridResolution::Eighth
        }
    }

    /// Step size in beats
    pub fn beats(&self) -> f64 {
        match self {
            GridResolution::Bar => BEATS_PER_BAR,
            GridResolution::Beat => 1.0,
            GridResolution::Half => 0.5,
            GridResolution::Quarter => 0.25,
            GridResolution::Eighth => 0.125,
        }
    }
}

/// Rounds beat positions to the grid of the current zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnapper {
    resolution: GridResolution,
}

impl GridSnapper {
    pub fn new(pixels_per_beat: f64) -> Self {
        Self {
            resolution: GridResolution::for_zoom(pixels_per_beat),
        }
    }

    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    pub fn step_beats(&self) -> f64 {
        self.resolution.beats()
    }

    /// Nearest grid line. All steps are powers of two, so the result is
    /// exactly representable and snapping again returns the same value.
    #[inline]
    pub fn snap(&self, beats: f64) -> f64 {
        quantize_to_grid(beats, self.step_beats())
    }

    /// Snap unless `bypass` is held; bypassed values only get the lower
    /// clamp at zero.
    #[inline]
    pub fn snap_or_bypass(&self, beats: f64, bypass: bool) -> f64 {
        if bypass {
            beats.max(0.0)
        } else {
            self.snap(beats)
        }
    }
}

/// Quantize a beat position to the nearest grid point
#[inline]
pub fn quantize_to_grid(beat: f64, grid_size: f64) -> f64 {
    if grid_size > 0.0 {
        (beat / grid_size).round() * grid_size
    } else {
        beat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_follows_zoom_table() {
        assert_eq!(GridSnapper::new(5.0).step_beats(), 4.0);
        assert_eq!(GridSnapper::new(10.0).step_beats(), 1.0);
        assert_eq!(GridSnapper::new(19.9).step_beats(), 1.0);
        assert_eq!(GridSnapper::new(20.0).step_beats(), 0.5);
        assert_eq!(GridSnapper::new(40.0).step_beats(), 0.25);
        assert_eq!(GridSnapper::new(79.0).step_beats(), 0.25);
        assert_eq!(GridSnapper::new(80.0).step_beats(), 0.125);
        assert_eq!(GridSnapper::new(500.0).step_beats(), 0.125);
    }

    #[test]
    fn snap_rounds_to_nearest_step() {
        let snapper = GridSnapper::new(30.0); // half-beat grid
        assert_eq!(snapper.snap(1.2), 1.0);
        assert_eq!(snapper.snap(1.3), 1.5);
        assert_eq!(snapper.snap(-0.4), -0.5);
    }

    #[test]
    fn bypass_returns_raw_value_clamped_at_zero() {
        let snapper = GridSnapper::new(100.0);
        assert_eq!(snapper.snap_or_bypass(1.23, true), 1.23);
        assert_eq!(snapper.snap_or_bypass(-2.0, true), 0.0);
        assert_eq!(snapper.snap_or_bypass(1.23, false), 1.25);
    }

    #[test]
    fn zero_grid_is_passthrough() {
        assert_eq!(quantize_to_grid(1.37, 0.0), 1.37);
    }
}
