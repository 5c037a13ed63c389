//! Telemetry event surface for the motion-platform SDK.
//!
//! Each post-fade record reaches the platform as one update carrying a
//! [`TelemetryInfo`]. The SDK looks channels up by name; the lookup table is
//! the shared [`ChannelSchema`], generated once per process, so no reflection
//! is involved.

use std::sync::Arc;

use crate::types::{ChannelSchema, TelemetryRecord};
use crate::{RelayError, Result};

/// A self-contained view over one telemetry record with by-name lookups.
#[derive(Debug, Clone)]
pub struct TelemetryInfo {
    record: TelemetryRecord,
    schema: Arc<ChannelSchema>,
}

impl TelemetryInfo {
    /// Wrap a record with the layout table.
    pub fn new(record: TelemetryRecord, schema: Arc<ChannelSchema>) -> Self {
        Self { record, schema }
    }

    /// Channel lookup by wire name.
    ///
    /// Integer channels come back as their exact value widened to `f32`.
    /// Returns `None` for names outside the layout.
    pub fn get(&self, name: &str) -> Option<f32> {
        let entry = self.schema.get(name)?;
        Some(self.record.get(entry.key))
    }

    /// Channel lookup that reports unknown names as errors.
    ///
    /// For callers that treat a misspelled channel as a configuration bug
    /// rather than missing data.
    pub fn try_get(&self, name: &str) -> Result<f32> {
        self.get(name).ok_or_else(|| RelayError::channel_not_found(name))
    }

    /// The underlying record.
    pub fn raw_record(&self) -> &TelemetryRecord {
        &self.record
    }

    /// The layout table backing `get`.
    pub fn schema(&self) -> &ChannelSchema {
        &self.schema
    }
}
