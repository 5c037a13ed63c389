//! User-requested pause gate.
//!
//! A pause toggle does not cut telemetry dead: the output fades to zero over
//! [`PAUSE_FADE_SECS`], and unpausing fades it back in. The timer flip on
//! toggle is hysteretic, so a re-toggle mid-fade picks up exactly where the
//! previous fade left off instead of jumping.

use crate::types::{DataKey, TelemetryRecord};

/// Full fade duration in seconds.
pub const PAUSE_FADE_SECS: f32 = 3.0;

/// Pause state with hysteretic fade timer.
#[derive(Debug, Clone)]
pub struct PauseGate {
    paused: bool,
    /// Remaining fade time, counts down to zero.
    timer: f32,
    /// Output snapshot taken when the pause began; the fade-out scales this
    /// frozen record so the decay stays linear.
    held: TelemetryRecord,
}

impl PauseGate {
    pub fn new() -> Self {
        Self { paused: false, timer: 0.0, held: TelemetryRecord::new() }
    }

    /// Flip the pause state.
    ///
    /// `last_output` is the most recently published record; it becomes the
    /// fade-out base when entering a pause.
    pub fn toggle(&mut self, last_output: &TelemetryRecord) {
        self.paused = !self.paused;
        self.timer = PAUSE_FADE_SECS - self.timer;
        if self.paused {
            self.held = *last_output;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Gate the current frame.
    ///
    /// While paused the output echoes the held snapshot scaled by
    /// `timer / PAUSE_FADE_SECS`; after unpausing with time left on the timer
    /// the live output is scaled by the complement, fading back in. Both
    /// records mirror the pause flag.
    pub fn apply(&mut self, raw: &mut TelemetryRecord, filtered: &mut TelemetryRecord, dt: f32) {
        raw.set_int(DataKey::Paused, self.paused as i32);

        if !self.paused && self.timer <= 0.0 {
            filtered.set_int(DataKey::Paused, 0);
            return;
        }

        self.timer = (self.timer - dt.max(0.0)).max(0.0);
        let lerp = self.timer / PAUSE_FADE_SECS;

        // The flag is written after the scaling: the fade must never round
        // `paused` away while the pause is still active.
        if self.paused {
            filtered.copy_from(&self.held);
            filtered.lerp_all_from_zero(lerp);
            filtered.set_int(DataKey::Paused, 1);
        } else {
            filtered.lerp_all_from_zero(1.0 - lerp);
            filtered.set_int(DataKey::Paused, 0);
        }
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_record(speed: f32) -> TelemetryRecord {
        let mut record = TelemetryRecord::new();
        record.set(DataKey::Speed, speed);
        record
    }

    #[test]
    fn pause_fades_linearly_to_zero() {
        let mut gate = PauseGate::new();
        let held = live_record(10.0);
        gate.toggle(&held);

        let mut raw = TelemetryRecord::new();
        let dt = 0.1;
        let mut previous = f32::INFINITY;
        for frame in 1..=30 {
            let mut out = live_record(10.0);
            gate.apply(&mut raw, &mut out, dt);

            let expected = 10.0 * (1.0 - frame as f32 * dt / PAUSE_FADE_SECS).max(0.0);
            assert!((out.speed() - expected).abs() < 1e-3, "frame {frame}");
            assert!(out.speed() <= previous);
            // The flag mirrors the boolean through the whole fade.
            assert_eq!(out.paused(), 1, "frame {frame}");
            previous = out.speed();
        }

        let mut out = live_record(10.0);
        gate.apply(&mut raw, &mut out, dt);
        assert_eq!(out.speed(), 0.0);
        assert_eq!(out.paused(), 1);
    }

    #[test]
    fn paused_flag_is_set_immediately() {
        let mut gate = PauseGate::new();
        gate.toggle(&live_record(5.0));

        let mut raw = TelemetryRecord::new();
        let mut out = live_record(5.0);
        gate.apply(&mut raw, &mut out, 0.0);
        assert_eq!(out.paused(), 1);
        assert_eq!(raw.paused(), 1);
    }

    #[test]
    fn retoggle_resumes_mid_fade() {
        let mut gate = PauseGate::new();
        gate.toggle(&live_record(8.0));

        let mut raw = TelemetryRecord::new();
        // Fade out for 1.5 s of the 3 s window.
        for _ in 0..15 {
            let mut out = live_record(8.0);
            gate.apply(&mut raw, &mut out, 0.1);
        }

        // Unpause: fade-in starts from the same 1.5/3 point.
        gate.toggle(&live_record(8.0));
        let mut out = live_record(8.0);
        gate.apply(&mut raw, &mut out, 0.0);
        assert!((out.speed() - 8.0 * 0.5).abs() < 0.1);
        assert_eq!(out.paused(), 0);

        // And reaches full scale over the remaining 1.5 s.
        for _ in 0..15 {
            let mut live = live_record(8.0);
            gate.apply(&mut raw, &mut live, 0.1);
            out = live;
        }
        assert!((out.speed() - 8.0).abs() < 1e-3);
    }

    #[test]
    fn idle_gate_is_transparent() {
        let mut gate = PauseGate::new();
        let mut raw = TelemetryRecord::new();
        let mut out = live_record(3.0);
        gate.apply(&mut raw, &mut out, 0.01);
        assert_eq!(out.speed(), 3.0);
        assert_eq!(out.paused(), 0);
    }
}
