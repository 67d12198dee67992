//! Runtime configuration
//!
//! Everything is read from the process environment at startup. `SOCKET_URL`
//! is required; the rest have defaults. Lookup is injected as a closure so
//! tests never have to touch the real environment.

use anyhow::{Context, Result, bail};
use std::time::Duration;

/// Capture device index used when `CAMERA_INDEX` is unset.
pub const DEFAULT_CAMERA_INDEX: u32 = 0;
/// JPEG quality used when `JPEG_QUALITY` is unset.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;
/// Per-attempt connect timeout used when `CONNECT_TIMEOUT_MS` is unset.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
/// Connect attempt cap used when `CONNECT_ATTEMPTS` is unset.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;

/// Settings for one publish run.
#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket endpoint for the publish session (`SOCKET_URL`)
    pub socket_url: String,
    /// Capture device index (`CAMERA_INDEX`)
    pub camera_index: u32,
    /// JPEG quality, 1-100 (`JPEG_QUALITY`)
    pub jpeg_quality: u8,
    /// Per-attempt session handshake timeout (`CONNECT_TIMEOUT_MS`)
    pub connect_timeout: Duration,
    /// Bounded retry cap for the initial connect (`CONNECT_ATTEMPTS`)
    pub connect_attempts: u32,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let socket_url = lookup("SOCKET_URL").context("SOCKET_URL is not set")?;
        if socket_url.trim().is_empty() {
            bail!("SOCKET_URL is empty");
        }

        let camera_index = parse_or("CAMERA_INDEX", &lookup, DEFAULT_CAMERA_INDEX)?;
        let jpeg_quality = parse_or("JPEG_QUALITY", &lookup, DEFAULT_JPEG_QUALITY)?;
        if !(1..=100).contains(&jpeg_quality) {
            bail!("JPEG_QUALITY must be within 1..=100, got {}", jpeg_quality);
        }

        let timeout_ms = parse_or("CONNECT_TIMEOUT_MS", &lookup, DEFAULT_CONNECT_TIMEOUT_MS)?;
        let connect_attempts = parse_or("CONNECT_ATTEMPTS", &lookup, DEFAULT_CONNECT_ATTEMPTS)?;
        if connect_attempts == 0 {
            bail!("CONNECT_ATTEMPTS must be at least 1");
        }

        Ok(Config {
            socket_url,
            camera_index,
            jpeg_quality,
            connect_timeout: Duration::from_millis(timeout_ms),
            connect_attempts,
        })
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
