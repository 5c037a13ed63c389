//! Paced subscription stream over the update channel.
//!
//! Motion platforms want the freshest sample at a steady cadence, not a
//! backlog: the stream wakes once per dispatch interval, drains every update
//! the ingest worker published since the last tick, and yields only the
//! newest. A silent interval (producer paused, mapping gone) leaves the
//! stream pending; it ends only when the receiver's worker is gone.

use futures::{ready, Stream};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, Interval};
use tokio_stream::wrappers::WatchStream;

use crate::event::TelemetryInfo;

pin_project! {
    /// Latest-wins stream of telemetry updates at the dispatch cadence.
    pub struct TelemetryUpdates {
        #[pin]
        inner: WatchStream<Option<Arc<TelemetryInfo>>>,
        interval: Interval,
        pending: Option<Arc<TelemetryInfo>>,
    }
}

impl TelemetryUpdates {
    /// Pace the given update channel at `cadence`.
    pub(crate) fn new(
        updates: watch::Receiver<Option<Arc<TelemetryInfo>>>,
        cadence: Duration,
    ) -> Self {
        let mut interval = interval(cadence);
        // A slow subscriber should not be repaid with a burst of stale
        // records.
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        Self { inner: WatchStream::new(updates), interval, pending: None }
    }
}

impl Stream for TelemetryUpdates {
    type Item = Arc<TelemetryInfo>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Wait for the dispatch tick
        ready!(this.interval.poll_tick(cx));

        // Drain everything the worker published, keeping only the newest
        loop {
            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Some(update))) => {
                    *this.pending = Some(update);
                    // Continue draining
                }
                Poll::Ready(Some(None)) => {
                    // The worker has not dispatched anything yet
                }
                Poll::Ready(None) => {
                    // Worker gone; flush whatever is held, then end
                    return Poll::Ready(this.pending.take());
                }
                Poll::Pending => {
                    // A silent interval is not the end of the stream: hold
                    // the slot open until the worker dispatches again.
                    return match this.pending.take() {
                        Some(update) => Poll::Ready(Some(update)),
                        None => Poll::Pending,
                    };
                }
            }
        }
    }
}
