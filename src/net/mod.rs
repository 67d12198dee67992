//! Network session boundary
//!
//! The publisher talks to the remote endpoint through the `EventSink`
//! trait; `WsSession` is the WebSocket implementation.

pub mod session;

pub use session::{ConnectError, EventSink, TransmitError, WsSession};
