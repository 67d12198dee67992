//! framecast
//!
//! Captures frames from a local camera, compresses each one as a Base64
//! JPEG, and publishes it as a `"data"` event over a persistent WebSocket
//! session. The endpoint comes from `SOCKET_URL`; see `config` for the
//! other recognized variables.

use clap::{Arg, Command};
use log::{error, info};
use std::process;

pub mod capture;
pub mod config;
pub mod encoder;
pub mod net;
pub mod pipeline;

use crate::capture::{CameraCapture, CameraCaptureConfig, FrameSource};
use crate::config::Config;
use crate::encoder::FrameEncoder;
use crate::net::{EventSink, WsSession};
use crate::pipeline::{PublisherOpts, StreamPublisher};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let command = Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new("camera-index")
                .short('c')
                .long("camera-index")
                .value_name("INDEX")
                .help("Capture device index (overrides CAMERA_INDEX).")
                .required(false),
        );
    #[cfg(feature = "test-source")]
    let command = command.arg(
        Arg::new("test-source")
            .short('t')
            .long("test-source")
            .help("Generate synthetic frames instead of opening a camera.")
            .action(clap::ArgAction::SetTrue),
    );
    let matches = command.get_matches();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            process::exit(1);
        }
    };

    if let Some(raw) = matches.get_one::<String>("camera-index") {
        match raw.parse() {
            Ok(index) => config.camera_index = index,
            Err(_) => {
                error!("Invalid --camera-index value: {}", raw);
                process::exit(1);
            }
        }
    }

    let sink = WsSession::new(config.socket_url.clone(), config.connect_timeout);
    let encoder = FrameEncoder::new(config.jpeg_quality);
    let opts = PublisherOpts {
        connect_attempts: config.connect_attempts,
    };

    #[cfg(feature = "test-source")]
    if matches.get_flag("test-source") {
        let source = capture::TestFrameSource::new(capture::TestSourceConfig::default());
        let mut publisher = StreamPublisher::new(source, sink, encoder, opts);
        process::exit(drive(&mut publisher).await);
    }

    let source = CameraCapture::new(CameraCaptureConfig {
        index: config.camera_index,
    });
    let mut publisher = StreamPublisher::new(source, sink, encoder, opts);
    process::exit(drive(&mut publisher).await);
}

/// Wire the shutdown signal to the publisher, run it, and translate the
/// outcome into a process exit code.
async fn drive<S: FrameSource, K: EventSink>(publisher: &mut StreamPublisher<S, K>) -> i32 {
    let stop = publisher.stop_handle();
    ctrlc::set_handler(move || {
        info!("Shutdown signal received");
        stop.stop();
    })
    .expect("Error setting Ctrl-C handler");

    match publisher.run().await {
        Ok(()) => 0,
        Err(e) => {
            error!("Publish run failed: {}", e);
            e.exit_code()
        }
    }
}
