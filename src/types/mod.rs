//! Core types for telemetry data representation.
//!
//! The type system maps directly onto the cross-process wire contract:
//! - [`DataKey`] is the ordered channel enumeration; its declaration order IS
//!   the packed layout, and its bit positions form [`KeyMask`] selections.
//! - [`TelemetryRecord`] is one frame of channels with little-endian packed
//!   (de)serialization, fade scaling, and per-key accessors.
//! - [`ChannelSchema`] is the once-per-process `(name -> offset, kind)` table
//!   used for by-name lookups without reflection.
//! - [`ControllerSnapshot`] carries driver inputs into the derivation stages.
//!
//! Producer and consumer both compile against this module, so the record size
//! and field ordering can never diverge between the two processes.

mod controller;
mod key;
mod record;
mod schema;

pub use controller::ControllerSnapshot;
pub use key::{ChannelGroup, ChannelKind, DataKey, KeyMask, CHANNEL_COUNT};
pub use record::{TelemetryRecord, RECORD_SIZE};
pub use schema::{ChannelEntry, ChannelSchema};
