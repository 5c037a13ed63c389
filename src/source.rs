//! Game sources: transform capture hooks and replay.

use glam::Mat4;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::Result;

/// One captured sample from the host game.
#[derive(Debug, Clone, Copy)]
pub struct TransformSample {
    /// Rigid-body world transform of the vehicle.
    pub transform: Mat4,
    /// Seconds elapsed since the previous sample, as reported by the hook.
    pub dt: f32,
}

/// Trait for transform capture hooks.
///
/// Each supported game is a pluggable source that periodically yields the
/// vehicle's world transform. Sources handle their own timing internally
/// (frame hooks block on the game's cadence, replay sources pace themselves)
/// and should target at least the platform update rate of ~100 Hz.
#[async_trait::async_trait]
pub trait GameSource: Send + 'static {
    /// Get the next captured transform.
    ///
    /// Returns:
    /// - `Ok(Some(sample))` - a new transform is available
    /// - `Ok(None)` - the source ended (game exited, replay finished)
    /// - `Err(e)` - capture failed; the driver backs off and retries
    async fn next_sample(&mut self) -> Result<Option<TransformSample>>;

    /// Nominal capture cadence in Hz.
    fn cadence_hz(&self) -> f64;
}

/// Replays a prerecorded transform sequence at a fixed cadence.
///
/// Stands in for a live capture hook during development and in tests; the
/// producer path behaves identically either way.
pub struct ReplaySource {
    samples: std::vec::IntoIter<TransformSample>,
    interval: tokio::time::Interval,
    cadence_hz: f64,
}

impl ReplaySource {
    /// Replay `samples` at `cadence_hz`.
    pub fn new(samples: Vec<TransformSample>, cadence_hz: f64) -> Self {
        let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / cadence_hz));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { samples: samples.into_iter(), interval, cadence_hz }
    }
}

#[async_trait::async_trait]
impl GameSource for ReplaySource {
    async fn next_sample(&mut self) -> Result<Option<TransformSample>> {
        match self.samples.next() {
            Some(sample) => {
                self.interval.tick().await;
                Ok(Some(sample))
            }
            None => Ok(None),
        }
    }

    fn cadence_hz(&self) -> f64 {
        self.cadence_hz
    }
}
