//! Consumer start-up fade.
//!
//! A freshly connected consumer must not slam the platform with full-scale
//! motion. Two phases: a dead window where every channel is forced to zero,
//! then a linear ramp up to full scale. After that the fade is transparent.

use crate::types::TelemetryRecord;

/// Length of the all-zero phase in seconds.
pub const START_WAIT_SECS: f32 = 2.0;
/// Length of the ramp phase in seconds.
pub const SMOOTH_IN_SECS: f32 = 3.0;

/// Two-phase start-up fade state.
#[derive(Debug, Clone)]
pub struct StartupFade {
    start_wait: f32,
    smooth_in: f32,
}

impl StartupFade {
    /// A fade at the beginning of its dead window.
    pub fn new() -> Self {
        Self { start_wait: START_WAIT_SECS, smooth_in: 0.0 }
    }

    /// Restart both phases, e.g. after a reconnect.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// True once records pass through unscaled.
    pub fn is_transparent(&self) -> bool {
        self.start_wait <= 0.0 && self.smooth_in <= 0.0
    }

    /// Advance the fade by `dt` and scale `record` in place.
    pub fn apply(&mut self, record: &mut TelemetryRecord, dt: f32) {
        let dt = dt.max(0.0);

        if self.start_wait > 0.0 {
            self.start_wait -= dt;
            if self.start_wait <= 0.0 {
                self.smooth_in = SMOOTH_IN_SECS;
            }
            record.lerp_all_from_zero(0.0);
        } else if self.smooth_in > 0.0 {
            self.smooth_in -= dt;
            let lerp = 1.0 - self.smooth_in.max(0.0) / SMOOTH_IN_SECS;
            record.lerp_all_from_zero(lerp);
        }
    }
}

impl Default for StartupFade {
    fn default() -> Self {
        Self::new()
    }
}
