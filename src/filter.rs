//! Per-channel noise filtering.
//!
//! Every telemetry channel is smoothed through a nested low-pass: a cascade
//! of first-order exponential smoothers. The cascade depth and time constant
//! are configured per channel group, so position can be tighter than g-force
//! without separate filter objects. Channel selection is a [`KeyMask`]:
//! channels outside the mask keep whatever the output record already holds.
//!
//! A first-order stage follows `state += alpha * (input - state)` with
//! `alpha = dt / (window + dt)`, which is monotone for any non-negative `dt`
//! and converges without overshoot; cascading stages only slows the attack.

use crate::types::{
    ChannelGroup, ChannelKind, DataKey, KeyMask, TelemetryRecord, CHANNEL_COUNT,
};

/// Maximum cascade depth.
pub const MAX_STAGES: usize = 4;

/// Smoothing parameters for one channel group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterProfile {
    /// Number of cascaded first-order stages, 1..=[`MAX_STAGES`].
    pub stages: usize,
    /// Time constant per stage in seconds; 0 disables smoothing.
    pub window: f32,
}

impl FilterProfile {
    /// Profile that copies values through unchanged.
    pub const fn passthrough() -> Self {
        Self { stages: 1, window: 0.0 }
    }

    fn clamped_stages(&self) -> usize {
        self.stages.clamp(1, MAX_STAGES)
    }
}

/// Per-group smoothing configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub position: FilterProfile,
    pub velocity: FilterProfile,
    pub gforce: FilterProfile,
    pub angular: FilterProfile,
    pub suspension: FilterProfile,
    pub residual: FilterProfile,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            position: FilterProfile { stages: 2, window: 0.03 },
            velocity: FilterProfile { stages: 2, window: 0.05 },
            gforce: FilterProfile { stages: 2, window: 0.08 },
            angular: FilterProfile { stages: 2, window: 0.05 },
            suspension: FilterProfile { stages: 2, window: 0.05 },
            residual: FilterProfile { stages: 1, window: 0.02 },
        }
    }
}

impl FilterConfig {
    fn profile_for(&self, group: ChannelGroup) -> FilterProfile {
        match group {
            ChannelGroup::Position => self.position,
            ChannelGroup::Velocity => self.velocity,
            ChannelGroup::Gforce => self.gforce,
            ChannelGroup::AngularVelocity | ChannelGroup::AngularAcceleration => self.angular,
            ChannelGroup::Suspension => self.suspension,
            ChannelGroup::Orientation
            | ChannelGroup::Engine
            | ChannelGroup::Input
            | ChannelGroup::State => self.residual,
        }
    }
}

/// Multi-channel cascaded smoother with key-mask gating.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    config: FilterConfig,
    stages: [[f32; MAX_STAGES]; CHANNEL_COUNT],
    /// Bit per channel: set once the cascade has been seeded.
    primed: u64,
}

impl NoiseFilter {
    /// Create a filter with the given per-group profiles.
    pub fn new(config: FilterConfig) -> Self {
        Self { config, stages: [[0.0; MAX_STAGES]; CHANNEL_COUNT], primed: 0 }
    }

    /// Create a filter with the default profiles.
    pub fn with_defaults() -> Self {
        Self::new(FilterConfig::default())
    }

    /// Clear the history of every channel.
    pub fn reset(&mut self) {
        self.primed = 0;
    }

    /// Smooth the channels selected by `mask` from `raw` into `out`.
    ///
    /// Channels outside `mask` are left untouched in `out`. With `reset` the
    /// per-channel history is cleared first, so the selected channels pass
    /// through at full value and smoothing resumes from there. Integer
    /// channels are copied, never smoothed.
    pub fn filter(
        &mut self,
        raw: &TelemetryRecord,
        out: &mut TelemetryRecord,
        mask: KeyMask,
        reset: bool,
        dt: f32,
    ) {
        let dt = dt.max(0.0);

        for key in DataKey::ALL {
            if !mask.contains(*key) {
                continue;
            }

            if key.kind() == ChannelKind::Int {
                out.set(*key, raw.get(*key));
                continue;
            }

            let index = key.index();
            let bit = 1u64 << index;
            let input = raw.get(*key);

            if reset || self.primed & bit == 0 {
                self.stages[index] = [input; MAX_STAGES];
                self.primed |= bit;
                out.set(*key, input);
                continue;
            }

            let profile = self.config.profile_for(key.group());
            let alpha = if profile.window <= 0.0 { 1.0 } else { dt / (profile.window + dt) };

            let mut value = input;
            for stage in self.stages[index].iter_mut().take(profile.clamped_stages()) {
                *stage += alpha * (value - *stage);
                value = *stage;
            }
            out.set(*key, value);
        }
    }
}
