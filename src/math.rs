//! Linear-algebra helpers for the derivation pipeline.
//!
//! All math is `glam` based and deterministic: given identical transform
//! sequences the derived angles and projections are identical. The vehicle
//! body frame is right = +X, up = +Y, forward = +Z; world transforms carry
//! their basis vectors in the matrix columns and translation in the fourth
//! column.

use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

/// m/s² → g (1 / 9.80665).
pub const MSS_TO_G: f32 = 0.101_971_62;

/// Minimum length of a rotation basis vector before a frame counts as garbage.
pub const MIN_AXIS_LENGTH: f32 = 0.9;

/// The three basis vectors of a transform's rotation part.
#[derive(Debug, Clone, Copy)]
pub struct Basis {
    pub rht: Vec3,
    pub up: Vec3,
    pub fwd: Vec3,
}

impl Basis {
    /// Extract the rotation basis from a world transform.
    pub fn of(transform: &Mat4) -> Self {
        Self {
            rht: transform.x_axis.truncate(),
            up: transform.y_axis.truncate(),
            fwd: transform.z_axis.truncate(),
        }
    }

    /// True when every axis is long enough to be a plausible rotation.
    ///
    /// Capture hooks occasionally hand over zeroed or half-written matrices;
    /// a short axis is the tell.
    pub fn is_plausible(&self) -> bool {
        self.rht.length() >= MIN_AXIS_LENGTH
            && self.up.length() >= MIN_AXIS_LENGTH
            && self.fwd.length() >= MIN_AXIS_LENGTH
    }
}

/// Translation component of a world transform.
#[inline]
pub fn translation(transform: &Mat4) -> Vec3 {
    transform.w_axis.truncate()
}

/// Copy of `transform` with the translation zeroed.
pub fn rotation_only(transform: &Mat4) -> Mat4 {
    let mut m = *transform;
    m.w_axis = Vec4::W;
    m
}

/// Wrap `angle` into `[-limit, limit]` by spans of `2 * limit`.
pub fn loop_angle_rad(angle: f32, limit: f32) -> f32 {
    let span = 2.0 * limit;
    let wrapped = (angle + limit).rem_euclid(span);
    wrapped - limit
}

/// Pitch/yaw/roll of a transform's rotation, via a unit quaternion.
///
/// Returned as `(x = pitch, y = yaw, z = roll)` in radians.
pub fn pitch_yaw_roll(transform: &Mat4) -> Vec3 {
    let q = Quat::from_mat3(&Mat3::from_mat4(*transform)).normalize();
    let (yaw, pitch, roll) = q.to_euler(glam::EulerRot::YXZ);
    Vec3::new(pitch, yaw, roll)
}

/// Planar dot product with non-finite results collapsed to zero.
///
/// The suspension synthesis feeds this with normalized vectors that can carry
/// NaN through a degenerate normalization.
#[inline]
pub fn finite_dot(a: Vec2, b: Vec2) -> f32 {
    let d = a.dot(b);
    if d.is_finite() {
        d
    } else {
        0.0
    }
}

fn acos_clamped(x: f32) -> f32 {
    x.clamp(-1.0, 1.0).acos()
}

/// Angular increments recovered from the previous basis expressed in the
/// current local frame.
///
/// `last_local` is the previous rotation projected through the inverse of the
/// current one, so for a still vehicle it is the identity and every increment
/// is zero. Each axis uses a planar projection of the rotated basis, which
/// stays stable where a world-frame Euler difference would gimbal-lock.
///
/// Returned as `(x = pitch, y = yaw, z = roll)` increments in radians.
pub fn angular_increments(last_local: &Mat4) -> Vec3 {
    let basis = Basis::of(last_local);

    let fwd_proj_x = Vec3::new(0.0, basis.fwd.y, basis.fwd.z).normalize_or_zero();
    let fwd_proj_y = Vec3::new(basis.fwd.x, 0.0, basis.fwd.z).normalize_or_zero();
    let rht_proj_z = Vec3::new(basis.rht.x, basis.rht.y, 0.0).normalize_or_zero();

    let yaw = -acos_clamped(fwd_proj_y.dot(Vec3::Z)) * basis.fwd.y.signum();
    let pitch = -acos_clamped(fwd_proj_x.dot(Vec3::Z)) * basis.up.z.signum();
    let roll = -acos_clamped(rht_proj_z.dot(Vec3::X)) * basis.up.x.signum();

    Vec3::new(pitch, yaw, roll)
}
