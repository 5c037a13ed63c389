//! Telemetry publisher and its driver task.
//!
//! [`Publisher`] owns the derivation pipeline and the enabled transports.
//! [`ProducerDriver`] wires a [`GameSource`] to a publisher on a spawned
//! task: pull a sample, run the derivation, publish when the frame produced
//! fresh output. Stale and garbage frames never reach the wire; consumers
//! keep replaying the last published record instead.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::ProducerConfig;
use crate::pipeline::{FrameOutcome, TelemetryPipeline};
use crate::source::GameSource;
use crate::transport::{SharedMemoryLink, UdpSender};
use crate::types::{ControllerSnapshot, TelemetryRecord};
use crate::{RelayError, Result};

/// Derivation pipeline plus transports for one producer process.
#[derive(Debug)]
pub struct Publisher {
    config: ProducerConfig,
    pipeline: TelemetryPipeline,
    shared_memory: Option<SharedMemoryLink>,
    udp: Option<UdpSender>,
    sending: bool,
}

impl Publisher {
    /// Create a publisher; transports stay closed until [`start_sending`].
    ///
    /// [`start_sending`]: Publisher::start_sending
    pub fn new(config: ProducerConfig) -> Self {
        Self {
            config,
            pipeline: TelemetryPipeline::with_defaults(),
            shared_memory: None,
            udp: None,
            sending: false,
        }
    }

    /// Open the configured transports and reset the derivation state.
    pub fn start_sending(&mut self) -> Result<()> {
        if self.sending {
            return Ok(());
        }

        self.pipeline.reset();

        if self.config.fill_mmf {
            self.shared_memory = Some(SharedMemoryLink::create()?);
        }
        if self.config.send_udp {
            self.udp = Some(UdpSender::connect(&self.config.udp_ip, self.config.udp_port)?);
        }
        self.sending = true;

        info!(
            fill_mmf = self.config.fill_mmf,
            send_udp = self.config.send_udp,
            "Telemetry publishing started"
        );
        Ok(())
    }

    /// Close the transports and drop all derivation history.
    pub fn stop_sending(&mut self) {
        if !self.sending {
            return;
        }
        self.shared_memory = None;
        self.udp = None;
        self.pipeline.reset();
        self.sending = false;
        info!("Telemetry publishing stopped");
    }

    /// Feed one captured frame through the derivation.
    ///
    /// Returns `true` if the frame was consumed (including stale frames),
    /// `false` only when the transform was rejected as garbage.
    pub fn process_transform(&mut self, transform: glam::Mat4, dt: f32) -> bool {
        self.ingest(transform, dt).is_consumed()
    }

    /// Feed one captured frame and report what became of it.
    pub fn ingest(&mut self, transform: glam::Mat4, dt: f32) -> FrameOutcome {
        self.pipeline.process_transform(transform, dt)
    }

    /// Publish the current filtered record on every enabled transport.
    pub fn send_filtered_data(&mut self) -> Result<()> {
        if !self.sending {
            return Err(RelayError::Worker { context: "publisher is stopped".to_string() });
        }

        let bytes = self.pipeline.filtered().to_bytes();

        if let Some(shared_memory) = &mut self.shared_memory {
            shared_memory.write_record(&bytes)?;
        }
        if let Some(udp) = &self.udp {
            if let Err(e) = udp.send(&bytes) {
                // Datagram loss is tolerated; keep the pipeline running.
                warn!(error = %e, "UDP publish failed");
            }
        }

        self.pipeline.commit_published();
        trace!("Published filtered record");
        Ok(())
    }

    /// Flip the pause fade. Hotkey and GUI adapters both land here.
    pub fn toggle_pause(&mut self) {
        self.pipeline.toggle_pause();
        debug!(paused = self.pipeline.is_paused(), "Pause toggled");
    }

    pub fn is_paused(&self) -> bool {
        self.pipeline.is_paused()
    }

    /// Latest driver-control snapshot for the input channels.
    pub fn set_controller(&mut self, snapshot: ControllerSnapshot) {
        self.pipeline.set_controller(snapshot);
    }

    /// Consecutive stale frames, or `u32::MAX` after a garbage frame.
    pub fn dropped_sample_count(&self) -> u32 {
        self.pipeline.dropped_sample_count()
    }

    /// The current filtered record.
    pub fn filtered(&self) -> &TelemetryRecord {
        self.pipeline.filtered()
    }
}

/// Handle to a running producer task.
pub struct ProducerHandle {
    cancel: CancellationToken,
}

impl ProducerHandle {
    /// Signal the producer task to stop after its current frame.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Token observed by the producer task.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawns and manages the producer feed task.
pub struct ProducerDriver;

impl ProducerDriver {
    /// Spawn the feed task for the given source and publisher.
    ///
    /// The publisher's transports are opened inside the task; the handle
    /// cancels it.
    pub fn spawn<S>(source: S, publisher: Publisher) -> ProducerHandle
    where
        S: GameSource,
    {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            Self::feed_task(source, publisher, task_cancel).await;
        });

        ProducerHandle { cancel }
    }

    async fn feed_task<S>(mut source: S, mut publisher: Publisher, cancel: CancellationToken)
    where
        S: GameSource,
    {
        info!(cadence_hz = source.cadence_hz(), "Producer feed task started");

        if let Err(e) = publisher.start_sending() {
            // Bind/create failures are fatal to the worker; the rest of the
            // host application stays alive.
            error!(error = %e, "Failed to open transports, producer aborting");
            return;
        }

        let mut frame_count = 0u64;

        loop {
            let sample = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Producer feed task cancelled");
                    break;
                }
                sample = source.next_sample() => sample,
            };

            match sample {
                Ok(Some(sample)) => {
                    let outcome = publisher.ingest(sample.transform, sample.dt);
                    if outcome.should_publish() {
                        frame_count += 1;
                        if let Err(e) = publisher.send_filtered_data() {
                            // Absorb and back off; the window may come back.
                            warn!(error = %e, "Publish failed, backing off");
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    } else {
                        trace!(?outcome, "Frame not published");
                    }
                }
                Ok(None) => {
                    info!("Game source ended after {} frames", frame_count);
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Source error, backing off");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        publisher.stop_sending();
        info!("Producer feed task ended (published {} frames)", frame_count);
    }
}
