//! Runtime configuration (`GTPConfig.txt`).
//!
//! Both processes read the same JSON file; each side only looks at its own
//! section of options. A missing file falls back to defaults; a malformed one
//! is fatal at startup, since a half-applied config would put producer and
//! consumer on different transports.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::{RelayError, Result};

/// Default UDP port shared by producer and consumer.
pub const DEFAULT_UDP_PORT: u16 = 6969;

/// Producer-side options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProducerConfig {
    /// Destination address for UDP publishing.
    #[serde(rename = "udpIP")]
    pub udp_ip: String,
    /// Destination port for UDP publishing.
    pub udp_port: u16,
    /// Publish each frame as a UDP datagram.
    #[serde(rename = "sendUDP")]
    pub send_udp: bool,
    /// Publish each frame into the shared-memory window.
    #[serde(rename = "fillMMF")]
    pub fill_mmf: bool,
    /// Pause-toggle hotkey registration, consumed by the host adapter.
    pub hotkey: HotkeyConfig,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            udp_ip: "127.0.0.1".to_string(),
            udp_port: DEFAULT_UDP_PORT,
            send_udp: false,
            fill_mmf: true,
            hotkey: HotkeyConfig::default(),
        }
    }
}

/// Hotkey registration options.
///
/// Registration itself is platform glue owned by the host adapter; the core
/// only carries the options through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HotkeyConfig {
    pub enabled: bool,
    pub key: String,
    pub windows: bool,
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key: "P".to_string(),
            windows: false,
            alt: false,
            shift: false,
            ctrl: true,
        }
    }
}

/// Consumer-side options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsumerConfig {
    /// Port to listen on when receiving over UDP.
    pub udp_port: u16,
    /// Ingest over UDP instead of the shared-memory window.
    #[serde(rename = "receiveUDP")]
    pub receive_udp: bool,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self { udp_port: DEFAULT_UDP_PORT, receive_udp: false }
    }
}

impl ProducerConfig {
    /// Load producer options from a config file.
    ///
    /// A missing file yields defaults; malformed JSON is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_section(path.as_ref())
    }
}

impl ConsumerConfig {
    /// Load consumer options from a config file.
    ///
    /// A missing file yields defaults; malformed JSON is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_section(path.as_ref())
    }
}

fn load_section<T: Default + serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(T::default());
        }
        Err(err) => return Err(RelayError::config_error(path.to_path_buf(), err)),
    };

    serde_json::from_str(&text).map_err(|err| RelayError::config_error(path.to_path_buf(), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let consumer = ConsumerConfig::default();
        assert_eq!(consumer.udp_port, 6969);
        assert!(!consumer.receive_udp);

        let producer = ProducerConfig::default();
        assert!(producer.fill_mmf);
        assert!(!producer.send_udp);
        assert_eq!(producer.udp_ip, "127.0.0.1");
    }

    #[test]
    fn parses_the_documented_spellings() {
        let consumer: ConsumerConfig =
            serde_json::from_str(r#"{"udpPort": 7777, "receiveUDP": true}"#).unwrap();
        assert_eq!(consumer.udp_port, 7777);
        assert!(consumer.receive_udp);

        let producer: ProducerConfig =
            serde_json::from_str(r#"{"udpIP": "10.0.0.2", "sendUDP": true, "fillMMF": false}"#)
                .unwrap();
        assert_eq!(producer.udp_ip, "10.0.0.2");
        assert!(producer.send_udp);
        assert!(!producer.fill_mmf);
    }

    #[test]
    fn partial_files_fill_from_defaults() {
        let producer: ProducerConfig = serde_json::from_str(r#"{"sendUDP": true}"#).unwrap();
        assert!(producer.send_udp);
        assert!(producer.fill_mmf);
        assert_eq!(producer.udp_port, DEFAULT_UDP_PORT);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let loaded = ConsumerConfig::load("/nonexistent/GTPConfig.txt").unwrap();
        assert_eq!(loaded.udp_port, DEFAULT_UDP_PORT);
    }
}
