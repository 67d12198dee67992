//! Webcam capture via nokhwa
//!
//! Opens a local camera by index and yields RGB frames. Driver reads are
//! blocking, so they run under `block_in_place` to keep the runtime
//! responsive.

use crate::capture::{DeviceError, FrameSource};
use async_trait::async_trait;
use image::RgbImage;
use log::{debug, info, warn};
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

/// Settings for a local camera device.
#[derive(Debug, Clone)]
pub struct CameraCaptureConfig {
    /// Device index (0 = default camera)
    pub index: u32,
}

impl Default for CameraCaptureConfig {
    fn default() -> Self {
        Self { index: 0 }
    }
}

/// Frame source backed by a local camera device.
///
/// The device is not touched until `open`; `release` stops the stream and
/// drops the handle, and further calls are no-ops.
pub struct CameraCapture {
    config: CameraCaptureConfig,
    camera: Option<Camera>,
}

impl CameraCapture {
    pub fn new(config: CameraCaptureConfig) -> Self {
        Self {
            config,
            camera: None,
        }
    }
}

#[async_trait]
impl FrameSource for CameraCapture {
    async fn open(&mut self) -> Result<(), DeviceError> {
        if self.camera.is_some() {
            return Ok(());
        }

        let index = self.config.index;
        let camera = tokio::task::block_in_place(|| {
            let requested =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
            let mut camera =
                Camera::new(CameraIndex::Index(index), requested).map_err(|e| DeviceError::Open {
                    index,
                    reason: e.to_string(),
                })?;
            camera.open_stream().map_err(|e| DeviceError::Open {
                index,
                reason: e.to_string(),
            })?;
            Ok::<_, DeviceError>(camera)
        })?;

        let resolution = camera.resolution();
        info!(
            "Camera {} opened: {}x{} @ {}fps",
            index,
            resolution.width(),
            resolution.height(),
            camera.frame_rate()
        );
        self.camera = Some(camera);
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Option<RgbImage>, DeviceError> {
        let Some(camera) = self.camera.as_mut() else {
            return Err(DeviceError::Read("capture device is not open".into()));
        };

        let frame = tokio::task::block_in_place(|| {
            let buffer = camera
                .frame()
                .map_err(|e| DeviceError::Read(e.to_string()))?;
            buffer
                .decode_image::<RgbFormat>()
                .map_err(|e| DeviceError::Read(e.to_string()))
        })?;
        Ok(Some(frame))
    }

    async fn release(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                warn!("Failed to stop camera stream: {}", e);
            }
            debug!("Camera {} released", self.config.index);
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            let _ = camera.stop_stream();
        }
    }
}
