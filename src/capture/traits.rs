//! Traits for frame capture sources

use async_trait::async_trait;
use image::RgbImage;
use thiserror::Error;

/// Capture device failure. Fatal to the publish run that hits it.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to open capture device {index}: {reason}")]
    Open { index: u32, reason: String },
    #[error("failed to read frame from capture device: {0}")]
    Read(String),
}

/// Trait for frame capture implementations.
///
/// A source is opened once, read repeatedly, and released exactly once;
/// `release` must tolerate being called again.
#[async_trait]
pub trait FrameSource: Send {
    /// Acquire the capture device.
    async fn open(&mut self) -> Result<(), DeviceError>;

    /// Read the next frame.
    ///
    /// `Ok(None)` means the device is exhausted (end-of-stream) and no
    /// further reads will succeed; `Err` is a driver failure. May block up
    /// to one frame interval.
    async fn read_frame(&mut self) -> Result<Option<RgbImage>, DeviceError>;

    /// Release the capture device. Idempotent.
    async fn release(&mut self);
}
