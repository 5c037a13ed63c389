//! Channel layout table for by-name access.
//!
//! The original system loads its field list from a schema file once per
//! process; here the runtime product of that load is generated from the
//! [`DataKey`] enumeration, which is the authoritative ordering. Consumers use
//! the table for reflection-free by-name lookups, and deployments that still
//! ship an external layout listing can cross-validate it with
//! [`ChannelSchema::validate_layout`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::key::{ChannelKind, DataKey, CHANNEL_COUNT};
use crate::types::record::RECORD_SIZE;
use crate::{RelayError, Result};

/// Metadata for one channel in the packed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEntry {
    /// Wire name of the channel.
    pub name: String,
    /// Key of the channel.
    pub key: DataKey,
    /// Byte offset within the packed record.
    pub offset: usize,
    /// Storage class of the channel.
    pub kind: ChannelKind,
}

/// Schema describing the packed record layout with O(1) name lookup.
#[derive(Debug, Clone)]
pub struct ChannelSchema {
    entries: HashMap<String, ChannelEntry>,
    /// Total size of a packed record in bytes.
    record_size: usize,
}

impl ChannelSchema {
    /// Build the schema from the channel enumeration.
    ///
    /// Called once per process; every lookup afterwards is a map access.
    pub fn from_layout() -> Self {
        let mut entries = HashMap::with_capacity(CHANNEL_COUNT);
        for key in DataKey::ALL {
            entries.insert(
                key.name().to_string(),
                ChannelEntry {
                    name: key.name().to_string(),
                    key: *key,
                    offset: key.offset(),
                    kind: key.kind(),
                },
            );
        }
        Self { entries, record_size: RECORD_SIZE }
    }

    /// Get channel metadata by wire name.
    pub fn get(&self, name: &str) -> Option<&ChannelEntry> {
        self.entries.get(name)
    }

    /// Check whether a channel exists.
    pub fn has_channel(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of channels in the layout.
    pub fn channel_count(&self) -> usize {
        self.entries.len()
    }

    /// Total size of a packed record in bytes.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Cross-check an externally shipped layout listing (names in wire order)
    /// against the built-in enumeration.
    ///
    /// The external file is an injected dependency of deployments that still
    /// distribute one; a mismatch is fatal because the two processes would
    /// disagree on byte offsets.
    pub fn validate_layout(&self, names: &[String]) -> Result<()> {
        if names.len() != CHANNEL_COUNT {
            return Err(RelayError::LayoutMismatch {
                reason: format!(
                    "external layout lists {} channels, expected {}",
                    names.len(),
                    CHANNEL_COUNT
                ),
            });
        }

        for (index, name) in names.iter().enumerate() {
            let expected = DataKey::ALL[index].name();
            if name != expected {
                return Err(RelayError::LayoutMismatch {
                    reason: format!("channel {} is '{}', expected '{}'", index, name, expected),
                });
            }
        }

        Ok(())
    }
}

impl Default for ChannelSchema {
    fn default() -> Self {
        Self::from_layout()
    }
}
