//! Per-frame derivation pipeline.
//!
//! Turns a stream of raw rigid-body world transforms into complete, filtered
//! telemetry records. Each call to [`TelemetryPipeline::process_transform`]
//! runs the stages in a fixed order, each gated by the previous one:
//!
//! 1. rotation-basis plausibility check (garbage frames are dropped)
//! 2. first-frame seeding of the history
//! 3. `dt` sanitizing
//! 4. staleness detection and position filtering
//! 5. world → local velocity
//! 6. velocity filtering
//! 7. local acceleration in g
//! 8. Euler angles with roll remap
//! 9. suspension synthesis from planar acceleration
//! 10. angular velocity via local-frame projection
//! 11. engine proxies
//! 12. driver inputs
//! 13. residual filtering of every remaining channel
//! 14. pause gate
//!
//! Publishing (stage 15 of the frame cycle) lives in the producer; after a
//! successful publish it calls [`TelemetryPipeline::commit_published`] so the
//! next frame's finite differences run against what consumers actually saw.
//!
//! The math is deterministic for identical input sequences; no stage reads
//! the wall clock.

mod pause;
mod state;

pub use pause::{PauseGate, PAUSE_FADE_SECS};
pub use state::PipelineState;

use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;
use tracing::trace;

use crate::filter::{FilterConfig, NoiseFilter};
use crate::math::{
    self, angular_increments, loop_angle_rad, pitch_yaw_roll, rotation_only, translation, Basis,
};
use crate::types::{ControllerSnapshot, DataKey, KeyMask, TelemetryRecord};

/// Substitute timestep when the source reports a non-positive `dt`.
const FALLBACK_DT: f32 = 0.015;

/// Planar acceleration magnitude (m/s²) at which suspension travel saturates.
const MAX_ACCEL_2D_MAG_SUSP: f32 = 3.0;

/// Suspension travel at rest.
const TRAVEL_CENTER: f32 = -20.0;
/// Travel span toward full compression.
const TRAVEL_MAX: f32 = 8.0 - TRAVEL_CENTER;
/// Travel span toward full droop.
const TRAVEL_MIN: f32 = -80.0 - TRAVEL_CENTER;

/// Per-corner channel keys plus the corner's planar direction (x right,
/// y forward), rear corners at y = -1.
const CORNERS: [(DataKey, DataKey, DataKey, DataKey, Vec2); 4] = [
    (
        DataKey::SuspensionPositionBl,
        DataKey::SuspensionVelocityBl,
        DataKey::SuspensionAccelerationBl,
        DataKey::WheelPatchSpeedBl,
        Vec2::new(-0.5, -1.0),
    ),
    (
        DataKey::SuspensionPositionBr,
        DataKey::SuspensionVelocityBr,
        DataKey::SuspensionAccelerationBr,
        DataKey::WheelPatchSpeedBr,
        Vec2::new(0.5, -1.0),
    ),
    (
        DataKey::SuspensionPositionFl,
        DataKey::SuspensionVelocityFl,
        DataKey::SuspensionAccelerationFl,
        DataKey::WheelPatchSpeedFl,
        Vec2::new(-0.5, 1.0),
    ),
    (
        DataKey::SuspensionPositionFr,
        DataKey::SuspensionVelocityFr,
        DataKey::SuspensionAccelerationFr,
        DataKey::WheelPatchSpeedFr,
        Vec2::new(0.5, 1.0),
    ),
];

/// What became of one submitted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Rotation basis implausible; frame dropped, previous output stays live.
    Garbage,
    /// First plausible frame; history seeded, nothing derived yet.
    Seeded,
    /// Transform identical to the previous frame; output echoes the last
    /// published record.
    Stale,
    /// Fully derived frame, ready to publish.
    Fresh,
}

impl FrameOutcome {
    /// True unless the frame was rejected outright.
    pub fn is_consumed(self) -> bool {
        self != FrameOutcome::Garbage
    }

    /// True when the frame produced new output worth publishing.
    pub fn should_publish(self) -> bool {
        self == FrameOutcome::Fresh
    }
}

/// The derivation pipeline: state, smoother and pause gate for one producer.
#[derive(Debug)]
pub struct TelemetryPipeline {
    state: PipelineState,
    filter: NoiseFilter,
    pause: PauseGate,
    controller: ControllerSnapshot,
}

impl TelemetryPipeline {
    /// Create a pipeline with the given smoothing profiles.
    pub fn new(filter_config: FilterConfig) -> Self {
        Self {
            state: PipelineState::new(),
            filter: NoiseFilter::new(filter_config),
            pause: PauseGate::new(),
            controller: ControllerSnapshot::neutral(),
        }
    }

    /// Create a pipeline with default smoothing.
    pub fn with_defaults() -> Self {
        Self::new(FilterConfig::default())
    }

    /// Drop all history; the next frame seeds from scratch.
    pub fn reset(&mut self) {
        self.state.reset();
        self.filter.reset();
        self.pause = PauseGate::new();
    }

    /// Flip the pause fade. Any input source may drive this (hotkey, GUI).
    pub fn toggle_pause(&mut self) {
        self.pause.toggle(&self.state.last_filtered);
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Latest driver-control snapshot, consumed by the input stage.
    pub fn set_controller(&mut self, snapshot: ControllerSnapshot) {
        self.controller = snapshot;
    }

    /// Consecutive stale frames, or `u32::MAX` after a garbage frame.
    pub fn dropped_sample_count(&self) -> u32 {
        self.state.dropped_sample_count
    }

    /// The current frame's filtered output.
    pub fn filtered(&self) -> &TelemetryRecord {
        &self.state.filtered
    }

    /// The current frame's raw (pre-filter) channels.
    pub fn raw(&self) -> &TelemetryRecord {
        &self.state.raw
    }

    /// Mark the current filtered record as published.
    ///
    /// Finite differences of the next frame run against the published record,
    /// and stale frames echo it.
    pub fn commit_published(&mut self) {
        self.state.last_filtered = self.state.filtered;
    }

    /// Run the derivation stages for one frame.
    pub fn process_transform(&mut self, transform: Mat4, dt: f32) -> FrameOutcome {
        // Stage 1: a short basis vector means the capture hook handed over a
        // zeroed or half-written matrix. Keep the previous output live.
        let basis = Basis::of(&transform);
        if !basis.is_plausible() {
            self.state.dropped_sample_count = u32::MAX;
            trace!(
                last_pos = ?self.state.last_raw_pos,
                last_world_vel = ?self.state.last_world_velocity,
                "Dropping garbage frame (implausible rotation basis)"
            );
            return FrameOutcome::Garbage;
        }

        // Stage 2: seed history on the first plausible frame.
        if !self.state.last_frame_valid {
            self.state.last_position = translation(&transform);
            self.state.last_transform = transform;
            self.state.last_velocity = Vec3::ZERO;
            self.state.last_world_velocity = Vec3::ZERO;
            self.state.last_frame_valid = true;
            return FrameOutcome::Seeded;
        }

        // Stage 3: sanitize dt.
        let dt = if dt <= 0.0 { FALLBACK_DT } else { dt };

        // Stage 4: byte-identical transforms are stale; echo the last
        // published record and count the repeat.
        if transform == self.state.last_transform {
            self.state.filtered = self.state.last_filtered;
            self.state.dropped_sample_count = self.state.dropped_sample_count.saturating_add(1);
            trace!(
                dropped = self.state.dropped_sample_count,
                "Stale frame, echoing previous output"
            );
            return FrameOutcome::Stale;
        }

        let world_position = self.derive_position(&transform, dt);
        let local_velocity = self.derive_local_velocity(&transform, world_position, dt);
        self.derive_gforce(dt);
        self.derive_orientation(&transform);
        self.synthesize_suspension(dt);
        self.recover_angular_motion(dt);
        self.fill_engine_and_inputs(local_velocity);

        // Stage 13: one smoothing pass over everything not already filtered
        // or assigned directly above.
        let individually_filtered = KeyMask::POSITION
            | KeyMask::LOCAL_VELOCITY
            | KeyMask::GFORCE
            | KeyMask::ANGULAR_VELOCITY
            | KeyMask::SUSPENSION_VELOCITY
            | KeyMask::WHEEL_PATCH;
        self.filter.filter(
            &self.state.raw,
            &mut self.state.filtered,
            individually_filtered.complement(),
            false,
            dt,
        );

        // Stage 14: pause gate.
        self.pause.apply(&mut self.state.raw, &mut self.state.filtered, dt);

        self.state.last_transform = transform;
        FrameOutcome::Fresh
    }

    /// Stage 4 (tail): record and filter the world position.
    fn derive_position(&mut self, transform: &Mat4, dt: f32) -> Vec3 {
        let raw_pos = translation(transform);
        self.state.raw.set(DataKey::PositionX, raw_pos.x);
        self.state.raw.set(DataKey::PositionY, raw_pos.y);
        self.state.raw.set(DataKey::PositionZ, raw_pos.z);
        self.state.last_raw_pos = raw_pos;

        // The position filter resets once, when a live position stream first
        // appears, so the smoother does not drag the start toward the origin.
        let reset = !self.state.position_stream_started;
        self.state.position_stream_started = true;
        self.filter.filter(
            &self.state.raw,
            &mut self.state.filtered,
            KeyMask::POSITION,
            reset,
            dt,
        );
        self.state.dropped_sample_count = 0;

        Vec3::new(
            self.state.filtered.position_x(),
            self.state.filtered.position_y(),
            self.state.filtered.position_z(),
        )
    }

    /// Stages 5 and 6: world velocity into the body frame, then filter.
    fn derive_local_velocity(&mut self, transform: &Mat4, world_position: Vec3, dt: f32) -> Vec3 {
        let world_velocity = (world_position - self.state.last_position) / dt;

        let rotation = rotation_only(transform);
        self.state.rot_inv = rotation.inverse();
        let mut local = self.state.rot_inv.transform_vector3(world_velocity);
        // Consumers expect a left-handed lateral axis.
        local.x = -local.x;

        self.state.raw.set(DataKey::LocalVelocityX, local.x);
        self.state.raw.set(DataKey::LocalVelocityY, local.y);
        self.state.raw.set(DataKey::LocalVelocityZ, local.z);

        self.state.last_position = world_position;
        self.state.last_world_velocity = world_velocity;

        self.filter.filter(
            &self.state.raw,
            &mut self.state.filtered,
            KeyMask::LOCAL_VELOCITY,
            false,
            dt,
        );

        Vec3::new(
            self.state.filtered.local_velocity_x(),
            self.state.filtered.local_velocity_y(),
            self.state.filtered.local_velocity_z(),
        )
    }

    /// Stage 7: finite-difference the filtered local velocity into g-force.
    fn derive_gforce(&mut self, dt: f32) {
        let filtered_local = Vec3::new(
            self.state.filtered.local_velocity_x(),
            self.state.filtered.local_velocity_y(),
            self.state.filtered.local_velocity_z(),
        );

        let gforce = (filtered_local - self.state.last_velocity) / dt * math::MSS_TO_G;
        self.state.raw.set(DataKey::GforceLateral, gforce.x);
        self.state.raw.set(DataKey::GforceVertical, gforce.y);
        self.state.raw.set(DataKey::GforceLongitudinal, gforce.z);

        self.filter.filter(
            &self.state.raw,
            &mut self.state.filtered,
            KeyMask::GFORCE,
            false,
            dt,
        );

        self.state.last_velocity = filtered_local;
    }

    /// Stage 8: Euler angles with the roll remap into `[-π/2, π/2]`.
    fn derive_orientation(&mut self, transform: &Mat4) {
        let pyr = pitch_yaw_roll(transform);
        self.state.raw.set(DataKey::Pitch, pyr.x);
        self.state.raw.set(DataKey::Yaw, pyr.y);
        self.state.raw.set(DataKey::Roll, loop_angle_rad(-pyr.z, FRAC_PI_2));
    }

    /// Stage 9: synthesize per-corner suspension from planar acceleration.
    fn synthesize_suspension(&mut self, dt: f32) {
        let planar = Vec2::new(
            self.state.filtered.gforce_lateral(),
            self.state.filtered.gforce_longitudinal(),
        ) / math::MSS_TO_G;

        let magnitude = planar.length().min(MAX_ACCEL_2D_MAG_SUSP);
        let scaled_accel_mag = magnitude / MAX_ACCEL_2D_MAG_SUSP;
        // Corners load opposite the acceleration vector: braking transfers
        // weight onto the front axle, acceleration onto the rear.
        let load_dir = -planar.normalize_or_zero();

        for (pos_key, vel_key, _, _, corner) in CORNERS {
            let corner_dir = corner.normalize();
            let dot = math::finite_dot(load_dir, corner_dir);

            let span = if dot > 0.0 {
                TRAVEL_MAX
            } else if dot < 0.0 {
                TRAVEL_MIN
            } else {
                0.0
            };
            let travel = TRAVEL_CENTER + span * dot.abs() * scaled_accel_mag;

            self.state.raw.set(pos_key, travel);
            self.state.filtered.set(pos_key, travel);

            let velocity =
                (self.state.filtered.get(pos_key) - self.state.last_filtered.get(pos_key)) / dt;
            self.state.raw.set(vel_key, velocity);
        }

        self.filter.filter(
            &self.state.raw,
            &mut self.state.filtered,
            KeyMask::SUSPENSION_VELOCITY,
            false,
            dt,
        );

        // Patch speed is an exact copy of the filtered forward velocity, not
        // a smoothed one; it bypasses the residual pass.
        let patch_speed = self.state.filtered.local_velocity_z();
        for (_, vel_key, accel_key, patch_key, _) in CORNERS {
            let accel =
                (self.state.filtered.get(vel_key) - self.state.last_filtered.get(vel_key)) / dt;
            self.state.raw.set(accel_key, accel);
            self.state.raw.set(patch_key, patch_speed);
            self.state.filtered.set(patch_key, patch_speed);
        }
    }

    /// Stage 10: recover angular velocity from the previous basis expressed
    /// in the current local frame, then finite-difference into acceleration.
    fn recover_angular_motion(&mut self, dt: f32) {
        let last_rotation = rotation_only(&self.state.last_transform);
        let last_local = self.state.rot_inv * last_rotation;

        let increments = angular_increments(&last_local);
        let angular_velocity = increments / dt;

        self.state.raw.set(DataKey::PitchVelocity, angular_velocity.x);
        self.state.raw.set(DataKey::YawVelocity, angular_velocity.y);
        self.state.raw.set(DataKey::RollVelocity, angular_velocity.z);

        self.filter.filter(
            &self.state.raw,
            &mut self.state.filtered,
            KeyMask::ANGULAR_VELOCITY,
            false,
            dt,
        );

        let pitch_accel = (self.state.filtered.pitch_velocity()
            - self.state.last_filtered.pitch_velocity())
            / dt;
        let yaw_accel =
            (self.state.filtered.yaw_velocity() - self.state.last_filtered.yaw_velocity()) / dt;
        let roll_accel =
            (self.state.filtered.roll_velocity() - self.state.last_filtered.roll_velocity()) / dt;

        self.state.raw.set(DataKey::PitchAcceleration, pitch_accel);
        self.state.raw.set(DataKey::YawAcceleration, yaw_accel);
        self.state.raw.set(DataKey::RollAcceleration, roll_accel);
    }

    /// Stages 11 and 12: engine proxies and driver inputs.
    ///
    /// No real powertrain data exists in a transform stream; the engine
    /// channels are proxies synthesized from speed and the throttle trigger.
    fn fill_engine_and_inputs(&mut self, local_velocity: Vec3) {
        let raw = &mut self.state.raw;
        raw.set_int(DataKey::MaxRpm, 6000);
        raw.set_int(DataKey::MaxGears, 6);
        raw.set_int(DataKey::Gear, 1);
        raw.set_int(DataKey::IdleRpm, 700);
        raw.set(DataKey::Speed, local_velocity.length());

        raw.set(DataKey::EngineRate, self.controller.right_trigger * 5500.0 + 700.0);
        raw.set(DataKey::SteeringInput, self.controller.left_thumb_x);
        raw.set(DataKey::ThrottleInput, self.controller.right_trigger);
        raw.set(DataKey::BrakeInput, self.controller.left_trigger);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    const DT: f32 = 0.01;

    fn drive(pipeline: &mut TelemetryPipeline, transform: Mat4) -> FrameOutcome {
        let outcome = pipeline.process_transform(transform, DT);
        if outcome.should_publish() {
            pipeline.commit_published();
        }
        outcome
    }

    fn translated(z: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, z))
    }

    #[test]
    fn garbage_frames_are_rejected_and_counted() {
        let mut pipeline = TelemetryPipeline::with_defaults();
        let garbage = Mat4::from_scale(Vec3::splat(0.5));

        for _ in 0..5 {
            let outcome = pipeline.process_transform(garbage, DT);
            assert_eq!(outcome, FrameOutcome::Garbage);
            assert!(!outcome.is_consumed());
        }
        assert_eq!(pipeline.dropped_sample_count(), u32::MAX);
    }

    #[test]
    fn first_valid_frame_only_seeds() {
        let mut pipeline = TelemetryPipeline::with_defaults();
        let outcome = pipeline.process_transform(Mat4::IDENTITY, DT);
        assert_eq!(outcome, FrameOutcome::Seeded);
        assert_eq!(*pipeline.filtered(), TelemetryRecord::new());
    }

    #[test]
    fn identical_transforms_echo_previous_output() {
        let mut pipeline = TelemetryPipeline::with_defaults();
        drive(&mut pipeline, translated(0.0));
        drive(&mut pipeline, translated(0.01));
        let published = *pipeline.filtered();

        for n in 1..=3 {
            let outcome = drive(&mut pipeline, translated(0.01));
            assert_eq!(outcome, FrameOutcome::Stale);
            assert_eq!(*pipeline.filtered(), published);
            assert_eq!(pipeline.dropped_sample_count(), n);
        }
    }

    #[test]
    fn fresh_frame_resets_the_drop_counter() {
        let mut pipeline = TelemetryPipeline::with_defaults();
        drive(&mut pipeline, translated(0.0));
        drive(&mut pipeline, translated(0.01));
        drive(&mut pipeline, translated(0.01));
        assert!(pipeline.dropped_sample_count() > 0);

        drive(&mut pipeline, translated(0.02));
        assert_eq!(pipeline.dropped_sample_count(), 0);
    }

    #[test]
    fn stationary_rig_settles_to_rest_values() {
        let mut pipeline = TelemetryPipeline::with_defaults();
        // A fixed pose with tiny unique offsets would be stale; a genuinely
        // stationary rig means identical transforms after the first frame, so
        // drive two distinct frames then hold.
        drive(&mut pipeline, translated(0.0));
        drive(&mut pipeline, translated(1e-6));
        for _ in 0..300 {
            drive(&mut pipeline, translated(1e-6));
        }

        let out = pipeline.filtered();
        assert!(out.local_velocity_x().abs() < 1e-3);
        assert!(out.local_velocity_y().abs() < 1e-3);
        assert!(out.local_velocity_z().abs() < 1e-3);
        assert!(out.speed() < 1e-3);
        assert_eq!(out.paused(), 0);
    }

    #[test]
    fn steady_forward_motion_converges_on_velocity() {
        let mut pipeline = TelemetryPipeline::with_defaults();
        // +0.01 m per 10 ms frame = 1 m/s forward.
        for frame in 0..300 {
            drive(&mut pipeline, translated(frame as f32 * 0.01));
        }

        let out = pipeline.filtered();
        assert!((out.local_velocity_z() - 1.0).abs() < 0.05, "vz = {}", out.local_velocity_z());
        assert!((out.speed() - 1.0).abs() < 0.05);
        // Steady speed: no sustained longitudinal g.
        assert!(out.gforce_longitudinal().abs() < 0.05);
        // No acceleration: every corner rides at travel center.
        assert!((out.suspension_position_bl() - TRAVEL_CENTER).abs() < 1.0);
        assert!((out.suspension_position_fr() - TRAVEL_CENTER).abs() < 1.0);
        // Wheel patch speed is an exact copy of forward velocity.
        assert_eq!(out.wheel_patch_speed_fl(), out.local_velocity_z());
        assert_eq!(out.wheel_patch_speed_br(), out.local_velocity_z());
    }

    #[test]
    fn hard_braking_loads_the_front_axle() {
        let mut pipeline = TelemetryPipeline::with_defaults();

        // Accelerate to 30 m/s and let the filters settle.
        let mut z = 0.0;
        for _ in 0..600 {
            z += 30.0 * DT;
            drive(&mut pipeline, translated(z));
        }

        // Brake to a stop over 0.5 s.
        let mut speed = 30.0;
        let mut front = 0.0;
        let mut rear = 0.0;
        let mut longitudinal = 0.0;
        for _ in 0..50 {
            speed = (speed - 60.0 * DT).max(0.0);
            z += speed * DT;
            drive(&mut pipeline, translated(z));
            let out = pipeline.filtered();
            front = out.suspension_position_fl();
            rear = out.suspension_position_bl();
            longitudinal = out.gforce_longitudinal();
        }

        assert!(longitudinal < -0.1, "longitudinal g = {longitudinal}");
        // Weight transfer: front toward full compression, rear toward droop.
        assert!(front > TRAVEL_CENTER, "front = {front}");
        assert!(rear < TRAVEL_CENTER, "rear = {rear}");
    }

    #[test]
    fn yaw_spin_produces_yaw_velocity() {
        let mut pipeline = TelemetryPipeline::with_defaults();
        // 0.5 rad/s yaw spin with a drifting position so frames stay fresh.
        for frame in 0..200 {
            let angle = frame as f32 * 0.5 * DT;
            let transform = Mat4::from_rotation_translation(
                Quat::from_rotation_y(angle),
                Vec3::new(0.0, 0.0, frame as f32 * 0.001),
            );
            drive(&mut pipeline, transform);
        }

        let out = pipeline.filtered();
        assert!(out.yaw_velocity().abs() > 0.1, "yaw velocity = {}", out.yaw_velocity());
        assert!((out.yaw_velocity().abs() - 0.5).abs() < 0.1);
    }

    #[test]
    fn engine_proxies_are_fixed_and_inputs_flow_through() {
        let mut pipeline = TelemetryPipeline::with_defaults();
        pipeline.set_controller(ControllerSnapshot {
            left_thumb_x: -0.25,
            right_trigger: 0.5,
            left_trigger: 1.0,
        });
        drive(&mut pipeline, translated(0.0));
        drive(&mut pipeline, translated(0.01));

        let out = pipeline.filtered();
        assert_eq!(out.max_rpm(), 6000);
        assert_eq!(out.max_gears(), 6);
        assert_eq!(out.gear(), 1);
        assert_eq!(out.idle_rpm(), 700);
        // engine_rate = right_trigger * 5500 + 700, modulo filter attack.
        assert!(out.engine_rate() > 700.0);

        let raw = pipeline.raw();
        assert_eq!(raw.steering_input(), -0.25);
        assert_eq!(raw.throttle_input(), 0.5);
        assert_eq!(raw.brake_input(), 1.0);
        assert_eq!(raw.engine_rate(), 0.5 * 5500.0 + 700.0);
    }

    #[test]
    fn non_positive_dt_is_sanitized() {
        let mut pipeline = TelemetryPipeline::with_defaults();
        pipeline.process_transform(translated(0.0), -1.0);
        let outcome = pipeline.process_transform(translated(0.5), 0.0);
        assert_eq!(outcome, FrameOutcome::Fresh);
        let out = pipeline.filtered();
        assert!(out.local_velocity_z().is_finite());
        assert!(out.local_velocity_z() > 0.0);
    }

    #[test]
    fn pause_toggle_fades_and_flags() {
        let mut pipeline = TelemetryPipeline::with_defaults();
        for frame in 0..100 {
            drive(&mut pipeline, translated(frame as f32 * 0.01));
        }
        let live_speed = pipeline.filtered().speed();
        assert!(live_speed > 0.5);

        pipeline.toggle_pause();
        assert!(pipeline.is_paused());

        let mut frame = 100;
        // One frame in: flag set, output barely faded.
        frame += 1;
        drive(&mut pipeline, translated(frame as f32 * 0.01));
        assert_eq!(pipeline.filtered().paused(), 1);
        assert!(pipeline.filtered().speed() <= live_speed);

        // Halfway through the fade the flag still reads paused.
        for _ in 0..(1.5 / DT) as usize {
            frame += 1;
            drive(&mut pipeline, translated(frame as f32 * 0.01));
        }
        assert_eq!(pipeline.filtered().paused(), 1);
        assert!(pipeline.filtered().speed() < live_speed);

        // 3 s in, the output is silent but still flagged paused.
        for _ in 0..(1.5 / DT) as usize {
            frame += 1;
            drive(&mut pipeline, translated(frame as f32 * 0.01));
        }
        assert_eq!(pipeline.filtered().speed(), 0.0);
        assert_eq!(pipeline.filtered().paused(), 1);
    }
}
