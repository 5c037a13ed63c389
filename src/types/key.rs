//! Telemetry channel keys and key masks.
//!
//! `DataKey` is the authoritative, ordered enumeration of every channel in the
//! telemetry record. The declaration order drives the wire layout (byte offset
//! = declaration index * 4) and the bit position inside a [`KeyMask`]. Both
//! producer and consumer derive their layout from this single enumeration, so
//! the cross-process contract can never drift between the two sides.

use serde::{Deserialize, Serialize};

/// Storage class of a telemetry channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// 32-bit floating point, little-endian on the wire.
    Float,
    /// 32-bit signed integer, little-endian on the wire.
    Int,
}

impl ChannelKind {
    /// Size in bytes of one channel of this kind.
    pub const fn size(self) -> usize {
        4
    }
}

/// Functional grouping of channels, used to pick filter profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelGroup {
    Position,
    Orientation,
    Velocity,
    Gforce,
    AngularVelocity,
    AngularAcceleration,
    Suspension,
    Engine,
    Input,
    State,
}

/// Every channel of the telemetry record, in wire order.
///
/// Do not reorder variants: the declaration index is the wire offset contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataKey {
    PositionX,
    PositionY,
    PositionZ,
    Pitch,
    Yaw,
    Roll,
    LocalVelocityX,
    LocalVelocityY,
    LocalVelocityZ,
    GforceLateral,
    GforceVertical,
    GforceLongitudinal,
    Speed,
    YawVelocity,
    PitchVelocity,
    RollVelocity,
    YawAcceleration,
    PitchAcceleration,
    RollAcceleration,
    SuspensionPositionBl,
    SuspensionPositionBr,
    SuspensionPositionFl,
    SuspensionPositionFr,
    SuspensionVelocityBl,
    SuspensionVelocityBr,
    SuspensionVelocityFl,
    SuspensionVelocityFr,
    SuspensionAccelerationBl,
    SuspensionAccelerationBr,
    SuspensionAccelerationFl,
    SuspensionAccelerationFr,
    WheelPatchSpeedBl,
    WheelPatchSpeedBr,
    WheelPatchSpeedFl,
    WheelPatchSpeedFr,
    EngineRate,
    MaxRpm,
    IdleRpm,
    Gear,
    MaxGears,
    SteeringInput,
    ThrottleInput,
    BrakeInput,
    Paused,
}

/// Number of channels in the record.
pub const CHANNEL_COUNT: usize = DataKey::ALL.len();

impl DataKey {
    /// All keys in wire order.
    pub const ALL: &'static [DataKey] = &[
        DataKey::PositionX,
        DataKey::PositionY,
        DataKey::PositionZ,
        DataKey::Pitch,
        DataKey::Yaw,
        DataKey::Roll,
        DataKey::LocalVelocityX,
        DataKey::LocalVelocityY,
        DataKey::LocalVelocityZ,
        DataKey::GforceLateral,
        DataKey::GforceVertical,
        DataKey::GforceLongitudinal,
        DataKey::Speed,
        DataKey::YawVelocity,
        DataKey::PitchVelocity,
        DataKey::RollVelocity,
        DataKey::YawAcceleration,
        DataKey::PitchAcceleration,
        DataKey::RollAcceleration,
        DataKey::SuspensionPositionBl,
        DataKey::SuspensionPositionBr,
        DataKey::SuspensionPositionFl,
        DataKey::SuspensionPositionFr,
        DataKey::SuspensionVelocityBl,
        DataKey::SuspensionVelocityBr,
        DataKey::SuspensionVelocityFl,
        DataKey::SuspensionVelocityFr,
        DataKey::SuspensionAccelerationBl,
        DataKey::SuspensionAccelerationBr,
        DataKey::SuspensionAccelerationFl,
        DataKey::SuspensionAccelerationFr,
        DataKey::WheelPatchSpeedBl,
        DataKey::WheelPatchSpeedBr,
        DataKey::WheelPatchSpeedFl,
        DataKey::WheelPatchSpeedFr,
        DataKey::EngineRate,
        DataKey::MaxRpm,
        DataKey::IdleRpm,
        DataKey::Gear,
        DataKey::MaxGears,
        DataKey::SteeringInput,
        DataKey::ThrottleInput,
        DataKey::BrakeInput,
        DataKey::Paused,
    ];

    /// Declaration index of this key (also its bit position in a mask).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Byte offset of this channel inside the packed record.
    pub const fn offset(self) -> usize {
        self.index() * 4
    }

    /// Wire name of the channel, as exposed for by-name lookup.
    pub const fn name(self) -> &'static str {
        match self {
            DataKey::PositionX => "position_x",
            DataKey::PositionY => "position_y",
            DataKey::PositionZ => "position_z",
            DataKey::Pitch => "pitch",
            DataKey::Yaw => "yaw",
            DataKey::Roll => "roll",
            DataKey::LocalVelocityX => "local_velocity_x",
            DataKey::LocalVelocityY => "local_velocity_y",
            DataKey::LocalVelocityZ => "local_velocity_z",
            DataKey::GforceLateral => "gforce_lateral",
            DataKey::GforceVertical => "gforce_vertical",
            DataKey::GforceLongitudinal => "gforce_longitudinal",
            DataKey::Speed => "speed",
            DataKey::YawVelocity => "yaw_velocity",
            DataKey::PitchVelocity => "pitch_velocity",
            DataKey::RollVelocity => "roll_velocity",
            DataKey::YawAcceleration => "yaw_acceleration",
            DataKey::PitchAcceleration => "pitch_acceleration",
            DataKey::RollAcceleration => "roll_acceleration",
            DataKey::SuspensionPositionBl => "suspension_position_bl",
            DataKey::SuspensionPositionBr => "suspension_position_br",
            DataKey::SuspensionPositionFl => "suspension_position_fl",
            DataKey::SuspensionPositionFr => "suspension_position_fr",
            DataKey::SuspensionVelocityBl => "suspension_velocity_bl",
            DataKey::SuspensionVelocityBr => "suspension_velocity_br",
            DataKey::SuspensionVelocityFl => "suspension_velocity_fl",
            DataKey::SuspensionVelocityFr => "suspension_velocity_fr",
            DataKey::SuspensionAccelerationBl => "suspension_acceleration_bl",
            DataKey::SuspensionAccelerationBr => "suspension_acceleration_br",
            DataKey::SuspensionAccelerationFl => "suspension_acceleration_fl",
            DataKey::SuspensionAccelerationFr => "suspension_acceleration_fr",
            DataKey::WheelPatchSpeedBl => "wheel_patch_speed_bl",
            DataKey::WheelPatchSpeedBr => "wheel_patch_speed_br",
            DataKey::WheelPatchSpeedFl => "wheel_patch_speed_fl",
            DataKey::WheelPatchSpeedFr => "wheel_patch_speed_fr",
            DataKey::EngineRate => "engine_rate",
            DataKey::MaxRpm => "max_rpm",
            DataKey::IdleRpm => "idle_rpm",
            DataKey::Gear => "gear",
            DataKey::MaxGears => "max_gears",
            DataKey::SteeringInput => "steering_input",
            DataKey::ThrottleInput => "throttle_input",
            DataKey::BrakeInput => "brake_input",
            DataKey::Paused => "paused",
        }
    }

    /// Storage class of the channel.
    pub const fn kind(self) -> ChannelKind {
        match self {
            DataKey::MaxRpm
            | DataKey::IdleRpm
            | DataKey::Gear
            | DataKey::MaxGears
            | DataKey::Paused => ChannelKind::Int,
            _ => ChannelKind::Float,
        }
    }

    /// Functional group of the channel.
    pub const fn group(self) -> ChannelGroup {
        match self {
            DataKey::PositionX | DataKey::PositionY | DataKey::PositionZ => ChannelGroup::Position,
            DataKey::Pitch | DataKey::Yaw | DataKey::Roll => ChannelGroup::Orientation,
            DataKey::LocalVelocityX
            | DataKey::LocalVelocityY
            | DataKey::LocalVelocityZ
            | DataKey::Speed => ChannelGroup::Velocity,
            DataKey::GforceLateral | DataKey::GforceVertical | DataKey::GforceLongitudinal => {
                ChannelGroup::Gforce
            }
            DataKey::YawVelocity | DataKey::PitchVelocity | DataKey::RollVelocity => {
                ChannelGroup::AngularVelocity
            }
            DataKey::YawAcceleration
            | DataKey::PitchAcceleration
            | DataKey::RollAcceleration => ChannelGroup::AngularAcceleration,
            DataKey::SuspensionPositionBl
            | DataKey::SuspensionPositionBr
            | DataKey::SuspensionPositionFl
            | DataKey::SuspensionPositionFr
            | DataKey::SuspensionVelocityBl
            | DataKey::SuspensionVelocityBr
            | DataKey::SuspensionVelocityFl
            | DataKey::SuspensionVelocityFr
            | DataKey::SuspensionAccelerationBl
            | DataKey::SuspensionAccelerationBr
            | DataKey::SuspensionAccelerationFl
            | DataKey::SuspensionAccelerationFr
            | DataKey::WheelPatchSpeedBl
            | DataKey::WheelPatchSpeedBr
            | DataKey::WheelPatchSpeedFl
            | DataKey::WheelPatchSpeedFr => ChannelGroup::Suspension,
            DataKey::EngineRate | DataKey::MaxRpm | DataKey::IdleRpm | DataKey::Gear
            | DataKey::MaxGears => ChannelGroup::Engine,
            DataKey::SteeringInput | DataKey::ThrottleInput | DataKey::BrakeInput => {
                ChannelGroup::Input
            }
            DataKey::Paused => ChannelGroup::State,
        }
    }
}

/// Bitset over [`DataKey`] selecting which channels an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMask(pub u64);

impl KeyMask {
    /// Empty selection.
    pub const EMPTY: KeyMask = KeyMask(0);

    /// Every channel in the record.
    pub const ALL: KeyMask = {
        // CHANNEL_COUNT < 64, so the shift is always in range.
        KeyMask((1u64 << CHANNEL_COUNT) - 1)
    };

    /// World-position channels.
    pub const POSITION: KeyMask =
        KeyMask::of(&[DataKey::PositionX, DataKey::PositionY, DataKey::PositionZ]);

    /// Body-frame velocity channels.
    pub const LOCAL_VELOCITY: KeyMask = KeyMask::of(&[
        DataKey::LocalVelocityX,
        DataKey::LocalVelocityY,
        DataKey::LocalVelocityZ,
    ]);

    /// Linear acceleration channels, expressed in g.
    pub const GFORCE: KeyMask = KeyMask::of(&[
        DataKey::GforceLateral,
        DataKey::GforceVertical,
        DataKey::GforceLongitudinal,
    ]);

    /// Body-frame angular velocity channels.
    pub const ANGULAR_VELOCITY: KeyMask = KeyMask::of(&[
        DataKey::YawVelocity,
        DataKey::PitchVelocity,
        DataKey::RollVelocity,
    ]);

    /// Per-corner suspension travel velocity channels.
    pub const SUSPENSION_VELOCITY: KeyMask = KeyMask::of(&[
        DataKey::SuspensionVelocityBl,
        DataKey::SuspensionVelocityBr,
        DataKey::SuspensionVelocityFl,
        DataKey::SuspensionVelocityFr,
    ]);

    /// Per-corner wheel contact-patch speed channels.
    pub const WHEEL_PATCH: KeyMask = KeyMask::of(&[
        DataKey::WheelPatchSpeedBl,
        DataKey::WheelPatchSpeedBr,
        DataKey::WheelPatchSpeedFl,
        DataKey::WheelPatchSpeedFr,
    ]);

    /// Build a mask from a list of keys.
    pub const fn of(keys: &[DataKey]) -> KeyMask {
        let mut bits = 0u64;
        let mut i = 0;
        while i < keys.len() {
            bits |= 1u64 << (keys[i] as u64);
            i += 1;
        }
        KeyMask(bits)
    }

    /// Build a mask containing a single key.
    pub const fn single(key: DataKey) -> KeyMask {
        KeyMask(1u64 << (key as u64))
    }

    /// True if `key`'s bit is set.
    pub const fn contains(self, key: DataKey) -> bool {
        self.0 & (1u64 << (key as u64)) != 0
    }

    /// True if no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Channels in the record but not in this mask.
    pub const fn complement(self) -> KeyMask {
        KeyMask(!self.0 & KeyMask::ALL.0)
    }

    /// Number of selected channels.
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }
}

impl std::ops::BitOr for KeyMask {
    type Output = KeyMask;

    fn bitor(self, rhs: KeyMask) -> KeyMask {
        KeyMask(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for KeyMask {
    type Output = KeyMask;

    fn bitand(self, rhs: KeyMask) -> KeyMask {
        KeyMask(self.0 & rhs.0)
    }
}

impl FromIterator<DataKey> for KeyMask {
    fn from_iter<I: IntoIterator<Item = DataKey>>(iter: I) -> Self {
        let mut bits = 0u64;
        for key in iter {
            bits |= 1u64 << (key as u64);
        }
        KeyMask(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_key() -> impl Strategy<Value = DataKey> {
        prop::sample::select(DataKey::ALL.to_vec())
    }

    #[test]
    fn declaration_order_is_contiguous() {
        for (i, key) in DataKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
            assert_eq!(key.offset(), i * 4);
        }
        assert_eq!(CHANNEL_COUNT, 44);
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = DataKey::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CHANNEL_COUNT);
    }

    #[test]
    fn integer_channels_are_the_state_handful() {
        let ints: Vec<DataKey> = DataKey::ALL
            .iter()
            .copied()
            .filter(|k| k.kind() == ChannelKind::Int)
            .collect();
        assert_eq!(
            ints,
            vec![
                DataKey::MaxRpm,
                DataKey::IdleRpm,
                DataKey::Gear,
                DataKey::MaxGears,
                DataKey::Paused
            ]
        );
    }

    #[test]
    fn complement_partitions_the_record() {
        let mask = KeyMask::POSITION | KeyMask::GFORCE;
        let rest = mask.complement();
        assert_eq!(mask & rest, KeyMask::EMPTY);
        assert_eq!(mask | rest, KeyMask::ALL);
        assert_eq!(mask.len() + rest.len(), CHANNEL_COUNT as u32);
        assert!(KeyMask::EMPTY.is_empty());
        assert!(!KeyMask::ALL.is_empty());
    }

    #[test]
    fn every_channel_is_one_word_wide() {
        // The packed layout assumes a uniform 4-byte stride.
        for key in DataKey::ALL {
            assert_eq!(key.kind().size(), 4);
        }
    }

    proptest! {
        #[test]
        fn mask_union_matches_set_union(
            a in prop::collection::vec(arb_key(), 0..20),
            b in prop::collection::vec(arb_key(), 0..20),
        ) {
            let mask_a = KeyMask::of(&a);
            let mask_b = KeyMask::of(&b);

            let union: KeyMask = a.iter().chain(b.iter()).copied().collect();
            prop_assert_eq!(mask_a | mask_b, union);

            let intersection: KeyMask = a
                .iter()
                .copied()
                .filter(|k| mask_b.contains(*k))
                .collect();
            prop_assert_eq!(mask_a & mask_b, intersection);
        }

        #[test]
        fn disjoint_masks_are_orthogonal(split in 1..CHANNEL_COUNT) {
            let left = KeyMask::of(&DataKey::ALL[..split]);
            let right = KeyMask::of(&DataKey::ALL[split..]);
            prop_assert_eq!(left & right, KeyMask::EMPTY);
            prop_assert_eq!(left | right, KeyMask::ALL);
        }

        #[test]
        fn contains_matches_membership(key in arb_key(), keys in prop::collection::vec(arb_key(), 0..30)) {
            let mask = KeyMask::of(&keys);
            prop_assert_eq!(mask.contains(key), keys.contains(&key));
        }
    }
}
