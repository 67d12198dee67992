//! Publish pipeline
//!
//! Control and lifecycle for the capture-encode-transmit loop:
//! - `state`: the publisher lifecycle state machine
//! - `stats`: atomic counters for one publish run
//! - `publisher`: the loop itself, with bounded-retry connect and
//!   cooperative cancellation

pub mod publisher;
pub mod state;
pub mod stats;

pub use publisher::{DATA_EVENT, PublishError, PublisherOpts, StopHandle, StreamPublisher};
pub use state::PublisherState;
pub use stats::PublishStats;
