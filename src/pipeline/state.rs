//! Per-instance derivation state.

use glam::{Mat4, Vec3};

use crate::types::TelemetryRecord;

/// Everything the derivation carries from one frame to the next.
///
/// Created on `start_sending`, reset on every `stop_sending`. Exclusively
/// owned by the pipeline worker; nothing here is shared across threads.
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Unfiltered channels of the current frame.
    pub raw: TelemetryRecord,
    /// Smoothed channels of the current frame.
    pub filtered: TelemetryRecord,
    /// Smoothed channels of the last published frame.
    pub last_filtered: TelemetryRecord,
    /// World transform of the previous valid frame.
    pub last_transform: Mat4,
    /// Filtered world position of the previous frame.
    pub last_position: Vec3,
    /// Filtered local velocity of the previous frame.
    pub last_velocity: Vec3,
    /// World-frame velocity of the previous frame.
    pub last_world_velocity: Vec3,
    /// Unfiltered translation of the previous frame, kept for drop diagnostics.
    pub last_raw_pos: Vec3,
    /// Inverse of the rotation part of the last valid transform.
    pub rot_inv: Mat4,
    /// False until the first plausible frame has seeded the history.
    pub last_frame_valid: bool,
    /// Consecutive stale frames, or `u32::MAX` after a garbage frame.
    pub dropped_sample_count: u32,
    /// Set once the position filter has been seeded from a live stream.
    pub position_stream_started: bool,
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            raw: TelemetryRecord::new(),
            filtered: TelemetryRecord::new(),
            last_filtered: TelemetryRecord::new(),
            last_transform: Mat4::IDENTITY,
            last_position: Vec3::ZERO,
            last_velocity: Vec3::ZERO,
            last_world_velocity: Vec3::ZERO,
            last_raw_pos: Vec3::ZERO,
            rot_inv: Mat4::IDENTITY,
            last_frame_valid: false,
            dropped_sample_count: 0,
            position_stream_started: false,
        }
    }

    /// Return to the freshly-created state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}
