//! Error types for telemetry synthesis and relay.
//!
//! Every recoverable failure in a worker loop is absorbed with back-off; the
//! variants here exist so call sites can classify a failure before deciding.
//! Errors carry structured context and implement `std::error::Error`.
//!
//! ## Error Categories
//!
//! - **Transport Errors**: shared-memory mapping or UDP socket trouble
//! - **Config Errors**: malformed `GTPConfig.txt`
//! - **Record Errors**: wrong-sized buffers, unknown channel names
//! - **Platform Errors**: OS-specific mapping/lock failures
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use rigfeed::RelayError;
//!
//! let error = RelayError::mapping_unavailable("GenericTelemetryProviderFiltered");
//! if error.is_retryable() {
//!     // transient IPC absence: retry with 1 s back-off, no log spam
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T, E = RelayError> = std::result::Result<T, E>;

/// Main error type for telemetry relay operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Shared memory mapping '{name}' is not available")]
    MappingUnavailable {
        name: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Shared memory operation failed: {context}")]
    SharedMemory {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to bind UDP socket on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("UDP send to {target} failed")]
    UdpSend {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Record buffer has {actual} bytes, expected {expected}")]
    RecordSize { expected: usize, actual: usize },

    #[error("Channel '{name}' not found in the telemetry layout")]
    ChannelNotFound { name: String },

    #[error("Layout validation failed: {reason}")]
    LayoutMismatch { reason: String },

    #[error("Config file error: {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },

    #[error("Worker task failed: {context}")]
    Worker { context: String },
}

impl RelayError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Transient IPC absence (mapping not yet created, socket not yet bound by
    /// the peer) is retryable; contract violations are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            RelayError::MappingUnavailable { .. } => true,
            RelayError::SharedMemory { .. } => true,
            RelayError::UdpSend { .. } => true,
            RelayError::Worker { .. } => true,
            RelayError::Bind { .. } => false,
            RelayError::RecordSize { .. } => false,
            RelayError::ChannelNotFound { .. } => false,
            RelayError::LayoutMismatch { .. } => false,
            RelayError::Config { .. } => false,
            RelayError::UnsupportedPlatform { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            RelayError::MappingUnavailable { .. } => vec![
                "Start the telemetry producer first",
                "Check that both processes use the same mapping name",
            ],
            RelayError::SharedMemory { .. } => vec![
                "Verify the mapping is still valid",
                "Restart the producer to recreate the region",
            ],
            RelayError::Bind { .. } => vec![
                "Check that no other consumer is bound to the port",
                "Pick a different udpPort in GTPConfig.txt",
            ],
            RelayError::UdpSend { .. } => {
                vec!["Check the configured udpIP", "Verify the network path"]
            }
            RelayError::RecordSize { .. } => vec![
                "Producer and consumer must be built from the same channel layout",
                "Check for a stale process using an older record format",
            ],
            RelayError::ChannelNotFound { .. } => vec![
                "Check the channel name spelling",
                "Use the DataKey wire names",
            ],
            RelayError::LayoutMismatch { .. } => vec![
                "Regenerate the external layout listing",
                "Update both sides to the same crate version",
            ],
            RelayError::Config { .. } => {
                vec!["Fix the JSON in GTPConfig.txt", "Delete the file to fall back to defaults"]
            }
            RelayError::UnsupportedPlatform { .. } => {
                vec!["Use the UDP transport on this platform"]
            }
            RelayError::Worker { .. } => vec!["Restart the worker", "Check the logs for context"],
        }
    }

    /// Helper constructor for a mapping that does not exist yet.
    pub fn mapping_unavailable(name: impl Into<String>) -> Self {
        RelayError::MappingUnavailable { name: name.into(), source: None }
    }

    /// Helper constructor for shared-memory failures with context.
    pub fn shared_memory(context: impl Into<String>, source: std::io::Error) -> Self {
        RelayError::SharedMemory { context: context.into(), source }
    }

    /// Helper constructor for record-size contract violations.
    pub fn record_size(expected: usize, actual: usize) -> Self {
        RelayError::RecordSize { expected, actual }
    }

    /// Helper constructor for unknown channel names.
    pub fn channel_not_found(name: impl Into<String>) -> Self {
        RelayError::ChannelNotFound { name: name.into() }
    }

    /// Helper constructor for config failures with path context.
    pub fn config_error(
        path: PathBuf,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RelayError::Config { path, source: Box::new(source) }
    }

    /// Helper constructor for unsupported platform features.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        RelayError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<RelayError>();

        let error = RelayError::mapping_unavailable("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn retry_classification() {
        assert!(RelayError::mapping_unavailable("m").is_retryable());
        assert!(!RelayError::record_size(176, 10).is_retryable());
        assert!(!RelayError::channel_not_found("nope").is_retryable());

        let bind = RelayError::Bind {
            addr: "0.0.0.0:6969".into(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(!bind.is_retryable());
    }

    #[test]
    fn messages_carry_context() {
        let err = RelayError::record_size(176, 12);
        assert!(err.to_string().contains("176"));
        assert!(err.to_string().contains("12"));

        let err = RelayError::channel_not_found("wheel_patch_speed_xx");
        assert!(err.to_string().contains("wheel_patch_speed_xx"));
    }

    #[test]
    fn recovery_suggestions_are_actionable() {
        for err in [
            RelayError::mapping_unavailable("m"),
            RelayError::record_size(176, 0),
            RelayError::channel_not_found("x"),
        ] {
            for suggestion in err.recovery_suggestions() {
                assert!(suggestion.len() > 5);
            }
        }
    }
}
