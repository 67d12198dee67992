//! WebSocket publish session
//!
//! One persistent connection to the remote endpoint. Every event is a
//! single JSON text message of the shape `{"event": ..., "data": {...}}`.

use crate::encoder::EncodedPayload;
use async_trait::async_trait;
use async_tungstenite::WebSocketStream;
use async_tungstenite::tokio::{ConnectStream, connect_async};
use async_tungstenite::tungstenite::Message;
use futures_util::SinkExt;
use log::{debug, info, warn};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// How long a graceful close may take before the session is abandoned.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Session handshake failure.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("connect to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("connect to {url} failed: {source}")]
    Handshake {
        url: String,
        source: async_tungstenite::tungstenite::Error,
    },
}

/// Mid-stream send failure: the session is no longer usable.
#[derive(Debug, Error)]
pub enum TransmitError {
    #[error("session is not connected")]
    NotConnected,
    #[error("event serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("send failed: {0}")]
    Send(#[from] async_tungstenite::tungstenite::Error),
}

/// One labeled event on the wire.
#[derive(Serialize)]
struct EventMessage<'a, T: Serialize> {
    event: &'a str,
    data: &'a T,
}

/// Sink for labeled payload events.
#[async_trait]
pub trait EventSink: Send {
    /// Establish the session: a single handshake attempt, bounded by the
    /// configured timeout.
    async fn connect(&mut self) -> Result<(), ConnectError>;

    /// Emit one labeled payload event. Returns once the transport has
    /// accepted the message.
    async fn emit(&mut self, event: &str, payload: &EncodedPayload)
        -> Result<(), TransmitError>;

    /// Gracefully close the session. Idempotent; safe when never connected.
    async fn disconnect(&mut self);
}

/// WebSocket-backed event sink.
pub struct WsSession {
    url: String,
    connect_timeout: Duration,
    stream: Option<WebSocketStream<ConnectStream>>,
}

impl WsSession {
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
            stream: None,
        }
    }
}

#[async_trait]
impl EventSink for WsSession {
    async fn connect(&mut self) -> Result<(), ConnectError> {
        match tokio::time::timeout(self.connect_timeout, connect_async(self.url.as_str())).await {
            Ok(Ok((stream, _response))) => {
                info!("Session established with {}", self.url);
                self.stream = Some(stream);
                Ok(())
            }
            Ok(Err(source)) => Err(ConnectError::Handshake {
                url: self.url.clone(),
                source,
            }),
            Err(_) => Err(ConnectError::Timeout {
                url: self.url.clone(),
                timeout: self.connect_timeout,
            }),
        }
    }

    async fn emit(
        &mut self,
        event: &str,
        payload: &EncodedPayload,
    ) -> Result<(), TransmitError> {
        let stream = self.stream.as_mut().ok_or(TransmitError::NotConnected)?;
        let json = serde_json::to_string(&EventMessage {
            event,
            data: payload,
        })?;
        stream.send(Message::text(json)).await?;
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            match tokio::time::timeout(CLOSE_TIMEOUT, stream.close(None)).await {
                Ok(Ok(())) => debug!("Session with {} closed", self.url),
                Ok(Err(e)) => warn!("Session close failed: {}", e),
                Err(_) => warn!("Session close timed out after {:?}", CLOSE_TIMEOUT),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use tokio::net::TcpListener;

    fn payload(frame_id: &str, frame: &str) -> EncodedPayload {
        EncodedPayload {
            frame_id: frame_id.to_string(),
            frame: frame.to_string(),
        }
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_a_noop() {
        let mut session = WsSession::new("ws://127.0.0.1:9", Duration::from_millis(100));
        session.disconnect().await;
        session.disconnect().await;
    }

    #[tokio::test]
    async fn test_emit_before_connect_fails() {
        let mut session = WsSession::new("ws://127.0.0.1:9", Duration::from_millis(100));
        let err = session.emit("data", &payload("id", "AAAA")).await.unwrap_err();
        assert!(matches!(err, TransmitError::NotConnected));
    }

    #[tokio::test]
    async fn test_connect_refused_reports_a_handshake_error() {
        // Bind to grab a free port, then drop the listener so the connect
        // is refused.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut session = WsSession::new(format!("ws://{}", addr), Duration::from_secs(1));
        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, ConnectError::Handshake { .. }));
    }

    #[tokio::test]
    async fn test_emit_round_trips_as_a_labeled_json_event() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = async_tungstenite::tokio::accept_async(stream).await.unwrap();
            let msg = ws.next().await.unwrap().unwrap();
            msg.to_text().unwrap().to_string()
        });

        let mut session = WsSession::new(format!("ws://{}", addr), Duration::from_secs(5));
        session.connect().await.unwrap();
        session
            .emit("data", &payload("frame-1", "Zm9v"))
            .await
            .unwrap();

        let text = server.await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["event"], "data");
        assert_eq!(value["data"]["frame_id"], "frame-1");
        assert_eq!(value["data"]["frame"], "Zm9v");

        session.disconnect().await;
        session.disconnect().await;
    }
}
