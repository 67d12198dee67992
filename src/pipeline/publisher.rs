//! Stream publisher
//!
//! Owns the capture device and the network session and drives the
//! capture-encode-transmit loop: connect with bounded retry, then one frame
//! in flight at a time until the device runs out, the session breaks, or a
//! stop is requested. Every exit path releases the device and closes the
//! session, in that order.

use crate::capture::{DeviceError, FrameSource};
use crate::encoder::FrameEncoder;
use crate::net::{ConnectError, EventSink, TransmitError};
use crate::pipeline::state::PublisherState;
use crate::pipeline::stats::PublishStats;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::select;
use tokio_util::sync::CancellationToken;

/// Event name used for published frames.
pub const DATA_EVENT: &str = "data";

/// Interval between stats summary log lines.
const STATS_LOG_INTERVAL: Duration = Duration::from_secs(30);

/// Fatal publish failure. Each category maps to a distinct exit code.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("capture device failure: {0}")]
    Device(#[from] DeviceError),
    #[error("session connect failure: {0}")]
    Connect(#[from] ConnectError),
    #[error("session transmit failure: {0}")]
    Transmit(#[from] TransmitError),
}

impl PublishError {
    /// Process exit code for this failure category.
    pub fn exit_code(&self) -> i32 {
        match self {
            PublishError::Connect(_) => 2,
            PublishError::Device(_) => 3,
            PublishError::Transmit(_) => 4,
        }
    }
}

/// Loop settings that belong to neither the device nor the session.
#[derive(Debug, Clone)]
pub struct PublisherOpts {
    /// Bounded retry cap for the initial connect
    pub connect_attempts: u32,
}

impl Default for PublisherOpts {
    fn default() -> Self {
        Self {
            connect_attempts: crate::config::DEFAULT_CONNECT_ATTEMPTS,
        }
    }
}

/// Cloneable stop trigger for a running publisher.
#[derive(Clone)]
pub struct StopHandle {
    cancel: CancellationToken,
}

impl StopHandle {
    /// Request the publisher to stop at its next checkpoint. Safe from any
    /// thread, including a signal handler.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// Drives one capture-encode-transmit run against an injected device and
/// session.
pub struct StreamPublisher<S, K> {
    source: S,
    sink: K,
    encoder: FrameEncoder,
    opts: PublisherOpts,
    state: PublisherState,
    stats: Arc<PublishStats>,
    cancel: CancellationToken,
    device_opened: bool,
}

impl<S: FrameSource, K: EventSink> StreamPublisher<S, K> {
    pub fn new(source: S, sink: K, encoder: FrameEncoder, opts: PublisherOpts) -> Self {
        Self {
            source,
            sink,
            encoder,
            opts,
            state: PublisherState::Disconnected,
            stats: Arc::new(PublishStats::new()),
            cancel: CancellationToken::new(),
            device_opened: false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PublisherState {
        self.state
    }

    /// Counters for this run.
    pub fn stats(&self) -> Arc<PublishStats> {
        Arc::clone(&self.stats)
    }

    /// Request a stop; honored at the next loop checkpoint.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Handle that lets another thread request a stop.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Run until the terminal state is reached.
    ///
    /// Returns `Ok(())` on a clean stop (user request or end-of-device),
    /// the fatal failure otherwise. The device release and the session
    /// disconnect have both been attempted by the time this returns.
    pub async fn run(&mut self) -> Result<(), PublishError> {
        self.transition(PublisherState::Connecting);

        match self.connect_with_backoff().await {
            Ok(true) => {}
            Ok(false) => {
                // Stop requested before the session came up.
                self.shutdown().await;
                return Ok(());
            }
            Err(e) => {
                self.shutdown().await;
                return Err(e.into());
            }
        }

        self.transition(PublisherState::Connected);

        if let Err(e) = self.source.open().await {
            error!("Failed to open capture device: {}", e);
            self.shutdown().await;
            return Err(e.into());
        }
        self.device_opened = true;

        let outcome = self.publish_loop().await;
        self.shutdown().await;

        info!("Publish run finished: {}", self.stats.summary());
        outcome
    }

    /// Bounded-retry connect with exponential backoff between attempts.
    /// Returns `Ok(false)` if a stop request arrived first.
    async fn connect_with_backoff(&mut self) -> Result<bool, ConnectError> {
        let attempts = self.opts.connect_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            if self.cancel.is_cancelled() {
                info!("Stop requested before the session was established");
                return Ok(false);
            }

            self.stats.record_connect_attempt();
            let err = match self.sink.connect().await {
                Ok(()) => return Ok(true),
                Err(e) => e,
            };

            if attempt >= attempts {
                error!("Connect attempt {}/{} failed: {}", attempt, attempts, err);
                return Err(err);
            }

            let delay = reconnect_delay(attempt);
            warn!(
                "Connect attempt {}/{} failed: {}; retrying in {:?}",
                attempt, attempts, err, delay
            );
            select! {
                _ = self.cancel.cancelled() => return Ok(false),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Steady-state loop: one frame in flight at a time, so memory stays
    /// bounded when the endpoint is slower than the camera.
    async fn publish_loop(&mut self) -> Result<(), PublishError> {
        let mut last_summary = tokio::time::Instant::now();

        loop {
            // The single cancellation checkpoint per iteration.
            if self.cancel.is_cancelled() {
                info!("Stop requested, leaving the capture loop");
                return Ok(());
            }

            let frame = match self.source.read_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!(
                        "Capture device exhausted after {} frames",
                        self.stats.frames_captured()
                    );
                    return Ok(());
                }
                Err(e) => {
                    error!("Frame read failed: {}", e);
                    return Err(e.into());
                }
            };
            self.stats.record_capture();

            let payload = match self.encoder.encode(&frame) {
                Ok(payload) => payload,
                Err(e) => {
                    // Single-frame failure: drop it and keep going.
                    warn!("Dropping frame: {}", e);
                    self.stats.record_encode_drop();
                    continue;
                }
            };

            let payload_bytes = payload.frame.len();
            if let Err(e) = self.sink.emit(DATA_EVENT, &payload).await {
                error!("Emit failed, session is no longer usable: {}", e);
                return Err(e.into());
            }
            self.stats.record_publish(payload_bytes);

            if last_summary.elapsed() >= STATS_LOG_INTERVAL {
                info!("Publisher: {}", self.stats.summary());
                last_summary = tokio::time::Instant::now();
            }
        }
    }

    /// Drain and close: release the device iff it was opened, then close
    /// the session, each exactly once and in that order.
    async fn shutdown(&mut self) {
        self.transition(PublisherState::Draining);
        if self.device_opened {
            self.source.release().await;
            self.device_opened = false;
        }
        self.sink.disconnect().await;
        self.transition(PublisherState::Closed);
    }

    fn transition(&mut self, next: PublisherState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        debug!("Publisher state: {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Exponential backoff between connect attempts: 1s, 2s, 4s, ... capped at
/// 30s.
fn reconnect_delay(attempt: u32) -> Duration {
    let secs = (1u64 << attempt.saturating_sub(1).min(5)).min(30);
    Duration::from_secs(secs)
}
