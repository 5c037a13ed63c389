//! Real-time vehicle-telemetry synthesizer and relay for motion rigs.
//!
//! Rigfeed turns a stream of rigid-body world transforms, captured by a
//! per-game hook, into a complete filtered telemetry record (local velocity,
//! g-force, angular motion, synthesized suspension, engine proxies, driver
//! inputs) and relays it to motion-feedback consumers over shared memory
//! and/or UDP.
//!
//! # Features
//!
//! - **Derivation pipeline**: ~100 Hz transform-to-telemetry math with
//!   garbage- and stale-frame handling
//! - **Nested smoothing**: cascaded low-pass filtering per channel group
//! - **Dual transport**: named shared-memory window and fire-and-forget UDP,
//!   byte-identical records on both
//! - **Consumer fades**: start-up dead window, smooth-in ramp, hysteretic
//!   pause fade
//!
//! # Quick Start
//!
//! ## Producer (inside or alongside the game process)
//!
//! ```rust,no_run
//! use rigfeed::{ProducerConfig, Publisher};
//! use glam::Mat4;
//!
//! # fn capture_transform() -> (Mat4, f32) { (Mat4::IDENTITY, 0.01) }
//! fn main() -> rigfeed::Result<()> {
//!     let mut publisher = Publisher::new(ProducerConfig::default());
//!     publisher.start_sending()?;
//!
//!     loop {
//!         let (transform, dt) = capture_transform();
//!         if publisher.process_transform(transform, dt) {
//!             publisher.send_filtered_data()?;
//!         }
//!     }
//! }
//! ```
//!
//! ## Consumer (inside the motion-feedback application)
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use rigfeed::{ConsumerConfig, Rigfeed};
//!
//! #[tokio::main]
//! async fn main() -> rigfeed::Result<()> {
//!     let receiver = Rigfeed::receive(ConsumerConfig::default()).await?;
//!     let mut updates = receiver.subscribe();
//!
//!     while let Some(update) = updates.next().await {
//!         println!("speed: {:?}", update.get("speed"));
//!     }
//!     Ok(())
//! }
//! ```

// Core data model and error handling
pub mod config;
mod error;
pub mod event;
pub mod filter;
pub mod math;
pub mod types;

// Derivation pipeline
pub mod pipeline;

// Transport and process roles
pub mod consumer;
pub mod producer;
pub mod source;
pub mod transport;

// Core exports
pub use config::{ConsumerConfig, HotkeyConfig, ProducerConfig, DEFAULT_UDP_PORT};
pub use error::{RelayError, Result};
pub use event::TelemetryInfo;
pub use filter::{FilterConfig, FilterProfile, NoiseFilter};
pub use types::{
    ChannelGroup, ChannelKind, ChannelSchema, ControllerSnapshot, DataKey, KeyMask,
    TelemetryRecord, CHANNEL_COUNT, RECORD_SIZE,
};

// Pipeline exports
pub use pipeline::{FrameOutcome, TelemetryPipeline, PAUSE_FADE_SECS};

// Role exports
pub use consumer::{Receiver, StartupFade, TelemetryUpdates, DISPATCH_INTERVAL};
pub use producer::{ProducerDriver, ProducerHandle, Publisher};
pub use source::{GameSource, ReplaySource, TransformSample};
pub use transport::{SharedMemoryLink, UdpReceiver, UdpSender, MAPPING_NAME, MUTEX_NAME};

/// Unified entry point for the two process roles.
///
/// The producer side owns the pipeline and publishes; the consumer side polls
/// the producer's output and raises telemetry updates.
///
/// # Examples
///
/// ```rust,no_run
/// use rigfeed::{ConsumerConfig, ProducerConfig, Rigfeed};
///
/// # #[tokio::main]
/// # async fn main() -> rigfeed::Result<()> {
/// // Inside the game process:
/// let publisher = Rigfeed::publisher(ProducerConfig::default());
///
/// // Inside the motion-feedback application:
/// let receiver = Rigfeed::receive(ConsumerConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub struct Rigfeed;

impl Rigfeed {
    /// Create a publisher for the producer process.
    ///
    /// Transports open on [`Publisher::start_sending`]; configuration decides
    /// which of shared memory and UDP are filled.
    pub fn publisher(config: ProducerConfig) -> Publisher {
        Publisher::new(config)
    }

    /// Connect a receiver in the consumer process.
    ///
    /// Ingest mode follows the configuration: shared-memory polling by
    /// default, UDP when `receiveUDP` is set.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions (UDP bind failure); a
    /// missing producer is retried in the background.
    pub async fn receive(config: ConsumerConfig) -> Result<Receiver> {
        Receiver::connect(config).await
    }
}
