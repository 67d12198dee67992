//! Frame capture
//!
//! The device boundary of the publisher: a `FrameSource` yields raw RGB
//! frames until it fails or runs out, and releases its device exactly once.

pub mod camera;
#[cfg(feature = "test-source")]
pub mod testsrc;
pub mod traits;

pub use camera::{CameraCapture, CameraCaptureConfig};
#[cfg(feature = "test-source")]
pub use testsrc::{TestFrameSource, TestSourceConfig};
pub use traits::{DeviceError, FrameSource};
