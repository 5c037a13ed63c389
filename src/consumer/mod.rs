//! Consumer loop: ingest records, fade them in, dispatch updates.
//!
//! The receiver polls the producer's output over one of two ingest modes
//! (shared-memory window or UDP datagrams), applies the start-up fade, and
//! publishes each post-fade record as a telemetry update on a watch channel.
//! Subscribers get a paced, latest-wins stream of [`TelemetryInfo`] values,
//! the event shape the motion-platform SDK consumes.
//!
//! Absence of the producer is the normal cold-start condition: the mapping
//! open retries every second, a silent UDP port backs off the same way, and
//! neither path logs per-retry spam.

mod fade;
mod updates;

pub use fade::{StartupFade, SMOOTH_IN_SECS, START_WAIT_SECS};
pub use updates::TelemetryUpdates;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::ConsumerConfig;
use crate::event::TelemetryInfo;
use crate::transport::{SharedMemoryLink, UdpReceiver};
use crate::types::{ChannelSchema, TelemetryRecord, RECORD_SIZE};
use crate::Result;

/// Dispatch pacing interval (~100 Hz).
pub const DISPATCH_INTERVAL: Duration = Duration::from_millis(10);
/// Silence threshold before the stream counts as stalled.
const STALL_AFTER: Duration = Duration::from_millis(500);
/// Back-off while the source is absent, stalled or broken.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Consumer-side connection to a telemetry producer.
pub struct Receiver {
    updates: watch::Receiver<Option<Arc<TelemetryInfo>>>,
    schema: Arc<ChannelSchema>,
    connected: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
    worker: Option<tokio::task::JoinHandle<()>>,
}

impl Receiver {
    /// Start the ingest worker for the configured mode.
    ///
    /// In UDP mode a bind failure is fatal; in shared-memory mode the worker
    /// keeps retrying until the producer shows up, so this returns
    /// immediately.
    pub async fn connect(config: ConsumerConfig) -> Result<Self> {
        let schema = Arc::new(ChannelSchema::from_layout());
        let (tx, updates) = watch::channel(None);
        let connected = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();

        let ctx = WorkerContext {
            tx,
            schema: Arc::clone(&schema),
            connected: Arc::clone(&connected),
            running: Arc::clone(&running),
            cancel: cancel.clone(),
        };

        let worker = if config.receive_udp {
            let receiver = UdpReceiver::bind(config.udp_port).await?;
            info!(port = config.udp_port, "Consumer ingesting over UDP");
            tokio::spawn(udp_worker(receiver, ctx))
        } else {
            info!("Consumer ingesting from shared memory");
            tokio::spawn(shared_memory_worker(ctx))
        };

        Ok(Self { updates, schema, connected, running, cancel, worker: Some(worker) })
    }

    /// Subscribe to telemetry updates.
    ///
    /// The stream is paced to the dispatch interval with latest-wins
    /// semantics and stays pending through producer silence.
    pub fn subscribe(&self) -> TelemetryUpdates {
        TelemetryUpdates::new(self.updates.clone(), DISPATCH_INTERVAL)
    }

    /// The most recent update, if any arrived yet.
    pub fn current(&self) -> Option<Arc<TelemetryInfo>> {
        self.updates.borrow().clone()
    }

    /// True once the ingest source is open (socket bound / mapping mapped).
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// True while frames are actually arriving; cleared after 500 ms of
    /// silence or an ingest error.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// The channel layout table.
    pub fn schema(&self) -> Arc<ChannelSchema> {
        Arc::clone(&self.schema)
    }

    /// Signal the worker to stop after its current poll.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop the worker and wait for it to exit.
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        debug!("Dropping telemetry receiver");
        self.cancel.cancel();
    }
}

/// Shared plumbing handed to an ingest worker.
struct WorkerContext {
    tx: watch::Sender<Option<Arc<TelemetryInfo>>>,
    schema: Arc<ChannelSchema>,
    connected: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl WorkerContext {
    /// Decode, fade and publish one record.
    fn dispatch(&self, fade: &mut StartupFade, bytes: &[u8; RECORD_SIZE], dt: f32) {
        let Ok(mut record) = TelemetryRecord::from_bytes(bytes) else {
            return;
        };
        fade.apply(&mut record, dt);
        self.running.store(true, Ordering::Relaxed);
        let info = TelemetryInfo::new(record, Arc::clone(&self.schema));
        let _ = self.tx.send(Some(Arc::new(info)));
        trace!("Dispatched telemetry update");
    }

    /// Sleep that aborts early on cancellation. Returns false when cancelled.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

/// Shared-memory ingest: open by name with retry, then poll at the dispatch
/// cadence.
async fn shared_memory_worker(ctx: WorkerContext) {
    info!("Shared-memory ingest worker started");

    'reconnect: loop {
        let link = loop {
            if ctx.cancel.is_cancelled() {
                info!("Ingest worker cancelled while waiting for producer");
                return;
            }
            match SharedMemoryLink::open_existing() {
                Ok(link) => break link,
                Err(e) if e.is_retryable() => {
                    trace!("Mapping not available yet, retrying");
                    if !ctx.pause(RETRY_DELAY).await {
                        return;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Cannot open telemetry mapping, worker aborting");
                    return;
                }
            }
        };

        ctx.connected.store(true, Ordering::Relaxed);
        info!("Connected to shared telemetry mapping");

        let mut fade = StartupFade::new();
        let mut last_dispatch = Instant::now();

        loop {
            if ctx.cancel.is_cancelled() {
                info!("Ingest worker cancelled");
                return;
            }

            let started = Instant::now();
            match link.read_record() {
                Ok(bytes) => {
                    let dt = last_dispatch.elapsed().as_secs_f32();
                    last_dispatch = Instant::now();
                    ctx.dispatch(&mut fade, &bytes, dt);
                }
                Err(e) => {
                    // Absorb, dispose the mapping and reconnect from scratch.
                    warn!(error = %e, "Shared-memory read failed, reconnecting");
                    ctx.connected.store(false, Ordering::Relaxed);
                    ctx.running.store(false, Ordering::Relaxed);
                    drop(link);
                    if !ctx.pause(RETRY_DELAY).await {
                        return;
                    }
                    continue 'reconnect;
                }
            }

            let elapsed = started.elapsed();
            if elapsed < DISPATCH_INTERVAL && !ctx.pause(DISPATCH_INTERVAL - elapsed).await {
                return;
            }
        }
    }
}

/// UDP ingest: block on the socket with a stall timeout, drain any queued
/// datagrams without sleeping, back off through silence.
async fn udp_worker(receiver: UdpReceiver, ctx: WorkerContext) {
    info!("UDP ingest worker started");
    ctx.connected.store(true, Ordering::Relaxed);

    let mut fade = StartupFade::new();
    let mut last_frame = Instant::now();
    let mut last_dispatch = Instant::now();

    loop {
        let started = Instant::now();
        let result = tokio::select! {
            _ = ctx.cancel.cancelled() => {
                info!("UDP ingest worker cancelled");
                return;
            }
            result = tokio::time::timeout(STALL_AFTER, receiver.recv_record()) => result,
        };

        match result {
            Ok(Ok(bytes)) => {
                last_frame = Instant::now();
                let dt = last_dispatch.elapsed().as_secs_f32();
                last_dispatch = Instant::now();
                ctx.dispatch(&mut fade, &bytes, dt);

                // Drain mode: more datagrams already queued, skip the sleep.
                let mut drained = false;
                while let Some(queued) = receiver.try_recv_record() {
                    let dt = last_dispatch.elapsed().as_secs_f32();
                    last_dispatch = Instant::now();
                    ctx.dispatch(&mut fade, &queued, dt);
                    drained = true;
                }

                if !drained {
                    let elapsed = started.elapsed();
                    if elapsed < DISPATCH_INTERVAL
                        && !ctx.pause(DISPATCH_INTERVAL - elapsed).await
                    {
                        return;
                    }
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "UDP receive failed, backing off");
                ctx.running.store(false, Ordering::Relaxed);
                if !ctx.pause(RETRY_DELAY).await {
                    return;
                }
            }
            Err(_) => {
                // recv timeout: no datagram within the stall threshold.
                if last_frame.elapsed() >= STALL_AFTER {
                    debug!("No telemetry for 500 ms, backing off");
                    ctx.running.store(false, Ordering::Relaxed);
                    if !ctx.pause(RETRY_DELAY).await {
                        return;
                    }
                }
            }
        }
    }
}
