//! Publish run metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one publish run.
///
/// All fields are atomics so other threads (signal handlers, periodic log
/// readers) can observe them while the loop is running.
#[derive(Debug, Default)]
pub struct PublishStats {
    frames_captured: AtomicU64,
    frames_published: AtomicU64,
    encode_drops: AtomicU64,
    bytes_published: AtomicU64,
    connect_attempts: AtomicU64,
}

impl PublishStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully captured frame
    pub fn record_capture(&self) {
        self.frames_captured.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully emitted payload of the given size
    pub fn record_publish(&self, payload_bytes: usize) {
        self.frames_published.fetch_add(1, Ordering::Relaxed);
        self.bytes_published
            .fetch_add(payload_bytes as u64, Ordering::Relaxed);
    }

    /// Record a frame dropped because encoding failed
    pub fn record_encode_drop(&self) {
        self.encode_drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session connect attempt
    pub fn record_connect_attempt(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_captured(&self) -> u64 {
        self.frames_captured.load(Ordering::Relaxed)
    }

    pub fn frames_published(&self) -> u64 {
        self.frames_published.load(Ordering::Relaxed)
    }

    pub fn encode_drops(&self) -> u64 {
        self.encode_drops.load(Ordering::Relaxed)
    }

    pub fn bytes_published(&self) -> u64 {
        self.bytes_published.load(Ordering::Relaxed)
    }

    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    /// Encode-drop rate as a percentage of captured frames
    pub fn encode_drop_rate(&self) -> f64 {
        let captured = self.frames_captured();
        if captured == 0 {
            0.0
        } else {
            (self.encode_drops() as f64 / captured as f64) * 100.0
        }
    }

    /// One-line summary for periodic logging
    pub fn summary(&self) -> String {
        format!(
            "{} captured, {} published, {} dropped ({:.1}%), {} bytes on the wire",
            self.frames_captured(),
            self.frames_published(),
            self.encode_drops(),
            self.encode_drop_rate(),
            self.bytes_published()
        )
    }
}
