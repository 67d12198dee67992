//! Frame encoding
//!
//! Converts a raw captured frame into a transport-ready payload: JPEG
//! compression followed by Base64, plus a freshly generated frame id.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Single-frame compression failure. The frame is dropped and the capture
/// loop continues.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot encode an empty frame")]
    EmptyFrame,
    #[error("jpeg compression failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Transport-ready encoded frame. This is the wire object carried by a
/// `"data"` event.
#[derive(Debug, Clone, Serialize)]
pub struct EncodedPayload {
    /// Unique identifier for this frame (UUID v4)
    pub frame_id: String,
    /// Base64-encoded JPEG bytes
    pub frame: String,
}

/// Stateless frame-to-payload transform.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    quality: u8,
}

impl FrameEncoder {
    /// Create an encoder with the given JPEG quality (clamped to 1-100).
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Compress `frame` as JPEG and wrap it into a payload with a fresh id.
    pub fn encode(&self, frame: &RgbImage) -> Result<EncodedPayload, EncodeError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(EncodeError::EmptyFrame);
        }

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality).encode_image(frame)?;

        Ok(EncodedPayload {
            frame_id: Uuid::new_v4().to_string(),
            frame: STANDARD.encode(&jpeg),
        })
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_JPEG_QUALITY)
    }
}
