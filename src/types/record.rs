//! Fixed-layout telemetry record.
//!
//! One record is one frame of telemetry: 44 channels, 4 bytes each, packed
//! little-endian in [`DataKey`] declaration order. The layout is a
//! compile-time constant and identical on producer and consumer; the record
//! bytes are what travels through the shared-memory window and each UDP
//! datagram.

use crate::types::key::{ChannelKind, DataKey, CHANNEL_COUNT};
use crate::{RelayError, Result};

/// Size in bytes of one packed record.
pub const RECORD_SIZE: usize = CHANNEL_COUNT * 4;

/// A single frame of telemetry channels.
///
/// Integer channels (`max_rpm`, `idle_rpm`, `gear`, `max_gears`, `paused`)
/// are held as `f32` internally and converted at the byte boundary; their
/// wire representation is `i32` little-endian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRecord {
    channels: [f32; CHANNEL_COUNT],
}

impl Default for TelemetryRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecord {
    /// A zeroed record.
    pub const fn new() -> Self {
        Self { channels: [0.0; CHANNEL_COUNT] }
    }

    /// Read a channel value.
    #[inline]
    pub fn get(&self, key: DataKey) -> f32 {
        self.channels[key.index()]
    }

    /// Write a channel value.
    #[inline]
    pub fn set(&mut self, key: DataKey, value: f32) {
        self.channels[key.index()] = value;
    }

    /// Read an integer channel value.
    #[inline]
    pub fn get_int(&self, key: DataKey) -> i32 {
        self.channels[key.index()] as i32
    }

    /// Write an integer channel value.
    #[inline]
    pub fn set_int(&mut self, key: DataKey, value: i32) {
        self.channels[key.index()] = value as f32;
    }

    /// Overwrite every channel from `other`.
    pub fn copy_from(&mut self, other: &TelemetryRecord) {
        self.channels = other.channels;
    }

    /// Serialize to the packed little-endian wire layout.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        for key in DataKey::ALL {
            let offset = key.offset();
            let bytes = match key.kind() {
                ChannelKind::Float => self.get(*key).to_le_bytes(),
                ChannelKind::Int => self.get_int(*key).to_le_bytes(),
            };
            out[offset..offset + 4].copy_from_slice(&bytes);
        }
        out
    }

    /// Deserialize from the packed wire layout.
    ///
    /// Total over any buffer of exactly [`RECORD_SIZE`] bytes; the bytes are
    /// reinterpreted without further validation. Any other length is a
    /// contract violation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RECORD_SIZE {
            return Err(RelayError::record_size(RECORD_SIZE, bytes.len()));
        }

        let mut record = Self::new();
        for key in DataKey::ALL {
            let offset = key.offset();
            let word = [bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]];
            let value = match key.kind() {
                ChannelKind::Float => f32::from_le_bytes(word),
                ChannelKind::Int => i32::from_le_bytes(word) as f32,
            };
            record.channels[key.index()] = value;
        }
        Ok(record)
    }

    /// Scale every channel toward zero: each float channel is multiplied by
    /// `t`, the integer state channels pass through untouched except `paused`,
    /// which participates in the fade (rounded back to an integer).
    ///
    /// `t = 0` silences the record, `t = 1` leaves it unchanged. Used for the
    /// consumer start-up fade and the pause gate.
    pub fn lerp_all_from_zero(&mut self, t: f32) {
        let t = t.clamp(0.0, 1.0);
        for key in DataKey::ALL {
            match key.kind() {
                ChannelKind::Float => {
                    self.channels[key.index()] *= t;
                }
                ChannelKind::Int => {
                    if *key == DataKey::Paused {
                        let faded = self.channels[key.index()] * t;
                        self.channels[key.index()] = faded.round();
                    }
                }
            }
        }
    }

    // Direct channel accessors, one per DataKey wire name.

    pub fn position_x(&self) -> f32 {
        self.get(DataKey::PositionX)
    }
    pub fn position_y(&self) -> f32 {
        self.get(DataKey::PositionY)
    }
    pub fn position_z(&self) -> f32 {
        self.get(DataKey::PositionZ)
    }
    pub fn pitch(&self) -> f32 {
        self.get(DataKey::Pitch)
    }
    pub fn yaw(&self) -> f32 {
        self.get(DataKey::Yaw)
    }
    pub fn roll(&self) -> f32 {
        self.get(DataKey::Roll)
    }
    pub fn local_velocity_x(&self) -> f32 {
        self.get(DataKey::LocalVelocityX)
    }
    pub fn local_velocity_y(&self) -> f32 {
        self.get(DataKey::LocalVelocityY)
    }
    pub fn local_velocity_z(&self) -> f32 {
        self.get(DataKey::LocalVelocityZ)
    }
    pub fn gforce_lateral(&self) -> f32 {
        self.get(DataKey::GforceLateral)
    }
    pub fn gforce_vertical(&self) -> f32 {
        self.get(DataKey::GforceVertical)
    }
    pub fn gforce_longitudinal(&self) -> f32 {
        self.get(DataKey::GforceLongitudinal)
    }
    pub fn speed(&self) -> f32 {
        self.get(DataKey::Speed)
    }
    pub fn yaw_velocity(&self) -> f32 {
        self.get(DataKey::YawVelocity)
    }
    pub fn pitch_velocity(&self) -> f32 {
        self.get(DataKey::PitchVelocity)
    }
    pub fn roll_velocity(&self) -> f32 {
        self.get(DataKey::RollVelocity)
    }
    pub fn yaw_acceleration(&self) -> f32 {
        self.get(DataKey::YawAcceleration)
    }
    pub fn pitch_acceleration(&self) -> f32 {
        self.get(DataKey::PitchAcceleration)
    }
    pub fn roll_acceleration(&self) -> f32 {
        self.get(DataKey::RollAcceleration)
    }
    pub fn suspension_position_bl(&self) -> f32 {
        self.get(DataKey::SuspensionPositionBl)
    }
    pub fn suspension_position_br(&self) -> f32 {
        self.get(DataKey::SuspensionPositionBr)
    }
    pub fn suspension_position_fl(&self) -> f32 {
        self.get(DataKey::SuspensionPositionFl)
    }
    pub fn suspension_position_fr(&self) -> f32 {
        self.get(DataKey::SuspensionPositionFr)
    }
    pub fn suspension_velocity_bl(&self) -> f32 {
        self.get(DataKey::SuspensionVelocityBl)
    }
    pub fn suspension_velocity_br(&self) -> f32 {
        self.get(DataKey::SuspensionVelocityBr)
    }
    pub fn suspension_velocity_fl(&self) -> f32 {
        self.get(DataKey::SuspensionVelocityFl)
    }
    pub fn suspension_velocity_fr(&self) -> f32 {
        self.get(DataKey::SuspensionVelocityFr)
    }
    pub fn suspension_acceleration_bl(&self) -> f32 {
        self.get(DataKey::SuspensionAccelerationBl)
    }
    pub fn suspension_acceleration_br(&self) -> f32 {
        self.get(DataKey::SuspensionAccelerationBr)
    }
    pub fn suspension_acceleration_fl(&self) -> f32 {
        self.get(DataKey::SuspensionAccelerationFl)
    }
    pub fn suspension_acceleration_fr(&self) -> f32 {
        self.get(DataKey::SuspensionAccelerationFr)
    }
    pub fn wheel_patch_speed_bl(&self) -> f32 {
        self.get(DataKey::WheelPatchSpeedBl)
    }
    pub fn wheel_patch_speed_br(&self) -> f32 {
        self.get(DataKey::WheelPatchSpeedBr)
    }
    pub fn wheel_patch_speed_fl(&self) -> f32 {
        self.get(DataKey::WheelPatchSpeedFl)
    }
    pub fn wheel_patch_speed_fr(&self) -> f32 {
        self.get(DataKey::WheelPatchSpeedFr)
    }
    pub fn engine_rate(&self) -> f32 {
        self.get(DataKey::EngineRate)
    }
    pub fn max_rpm(&self) -> i32 {
        self.get_int(DataKey::MaxRpm)
    }
    pub fn idle_rpm(&self) -> i32 {
        self.get_int(DataKey::IdleRpm)
    }
    pub fn gear(&self) -> i32 {
        self.get_int(DataKey::Gear)
    }
    pub fn max_gears(&self) -> i32 {
        self.get_int(DataKey::MaxGears)
    }
    pub fn steering_input(&self) -> f32 {
        self.get(DataKey::SteeringInput)
    }
    pub fn throttle_input(&self) -> f32 {
        self.get(DataKey::ThrottleInput)
    }
    pub fn brake_input(&self) -> f32 {
        self.get(DataKey::BrakeInput)
    }
    pub fn paused(&self) -> i32 {
        self.get_int(DataKey::Paused)
    }
}
