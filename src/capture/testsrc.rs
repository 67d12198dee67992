//! Synthetic frame source for development without camera hardware

use crate::capture::{DeviceError, FrameSource};
use async_trait::async_trait;
use image::{Rgb, RgbImage};
use log::info;
use std::time::Duration;

/// Settings for the synthetic test source.
#[derive(Debug, Clone)]
pub struct TestSourceConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frames per second
    pub fps: u32,
    /// Report end-of-stream after this many frames (None = unlimited)
    pub frame_budget: Option<u64>,
}

impl Default for TestSourceConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 15,
            frame_budget: None,
        }
    }
}

/// Frame source that renders a moving gradient pattern.
pub struct TestFrameSource {
    config: TestSourceConfig,
    frame_num: u64,
    open: bool,
}

impl TestFrameSource {
    pub fn new(config: TestSourceConfig) -> Self {
        Self {
            config,
            frame_num: 0,
            open: false,
        }
    }

    fn render(&self) -> RgbImage {
        let shift = (self.frame_num % 256) as u32;
        RgbImage::from_fn(self.config.width, self.config.height, |x, y| {
            Rgb([
                ((x + shift) % 256) as u8,
                ((y + shift) % 256) as u8,
                shift as u8,
            ])
        })
    }
}

#[async_trait]
impl FrameSource for TestFrameSource {
    async fn open(&mut self) -> Result<(), DeviceError> {
        self.open = true;
        info!(
            "Test source started: {}x{} @ {}fps",
            self.config.width, self.config.height, self.config.fps
        );
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Option<RgbImage>, DeviceError> {
        if !self.open {
            return Err(DeviceError::Read("test source is not open".into()));
        }
        if let Some(budget) = self.config.frame_budget {
            if self.frame_num >= budget {
                return Ok(None);
            }
        }

        tokio::time::sleep(Duration::from_micros(
            1_000_000 / u64::from(self.config.fps.max(1)),
        ))
        .await;

        let frame = self.render();
        self.frame_num += 1;
        Ok(Some(frame))
    }

    async fn release(&mut self) {
        if self.open {
            self.open = false;
            info!("Test source stopped after {} frames", self.frame_num);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhaustion_signals_end_of_stream() {
        let mut source = TestFrameSource::new(TestSourceConfig {
            width: 32,
            height: 24,
            fps: 30,
            frame_budget: Some(2),
        });
        source.open().await.unwrap();

        let first = source.read_frame().await.unwrap().unwrap();
        assert_eq!((first.width(), first.height()), (32, 24));
        assert!(source.read_frame().await.unwrap().is_some());
        assert!(source.read_frame().await.unwrap().is_none());

        source.release().await;
        source.release().await;
    }

    #[tokio::test]
    async fn test_read_before_open_fails() {
        let mut source = TestFrameSource::new(TestSourceConfig::default());
        assert!(source.read_frame().await.is_err());
    }
}
