/// WebSocket connection to the captioning service
///
/// This module provides the raw connection used by the session client:
/// connect, send/receive of protocol messages, and splitting into halves
/// for concurrent send and receive tasks.
use crate::network::error::{NetworkError, NetworkResult};
use crate::network::messages::ServerMessage;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the WebSocket stream
pub type WsWriter = SplitSink<WsStream, Message>;

/// Read half of the WebSocket stream
pub type WsReader = SplitStream<WsStream>;

/// Configuration for the connection to the captioning service
///
/// # Example
/// ```
/// use livecap::network::ConnectionConfig;
///
/// let config = ConnectionConfig::new("ws://127.0.0.1:5000/stream")
///     .with_timeout(5000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// WebSocket address of the captioning service (ws:// or wss://)
    pub server_address: String,

    /// Connection timeout in milliseconds
    pub timeout_ms: u64,
}

impl ConnectionConfig {
    /// Create a configuration for the given server address
    pub fn new(server_address: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            timeout_ms: 10000, // 10 seconds default
        }
    }

    /// Set the connection timeout in milliseconds
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Validate the configured address
    pub fn validate(&self) -> NetworkResult<()> {
        if self.server_address.is_empty() {
            return Err(NetworkError::InvalidConfig(
                "Server address is empty".to_string(),
            ));
        }

        if !self.server_address.starts_with("ws://") && !self.server_address.starts_with("wss://") {
            return Err(NetworkError::InvalidConfig(format!(
                "Server address must use ws:// or wss://: {}",
                self.server_address
            )));
        }

        Ok(())
    }
}

/// WebSocket connection to the captioning service
///
/// Manages the connection lifecycle and provides methods for sending and
/// receiving protocol messages. The underlying transport's own connect
/// behavior applies; no retry layer is added here.
#[derive(Debug)]
pub struct CaptionConnection {
    /// WebSocket stream
    ws_stream: WsStream,

    /// Whether the connection is open
    is_open: bool,
}

impl CaptionConnection {
    /// Connect to the captioning service.
    ///
    /// # Errors
    /// Returns `NetworkError::InvalidConfig` for a malformed address,
    /// `NetworkError::Timeout` if the connect timeout elapses, or
    /// `NetworkError::ConnectionFailed` if the transport cannot connect.
    pub async fn connect(config: &ConnectionConfig) -> NetworkResult<Self> {
        config.validate()?;

        info!("Connecting to captioning service: {}", config.server_address);

        let connect_future = connect_async(config.server_address.as_str());
        let timeout = tokio::time::Duration::from_millis(config.timeout_ms);

        let (ws_stream, response) = tokio::time::timeout(timeout, connect_future)
            .await
            .map_err(|_| NetworkError::Timeout(config.timeout_ms))?
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;

        info!(
            "Connected to captioning service (status: {})",
            response.status()
        );

        Ok(Self {
            ws_stream,
            is_open: true,
        })
    }

    /// Serialize a message to JSON and send it as one text frame.
    ///
    /// # Errors
    /// Returns `NetworkError::ConnectionClosed` if the connection was
    /// closed, or serialization/transport errors.
    pub async fn send<T: Serialize>(&mut self, message: &T) -> NetworkResult<()> {
        if !self.is_open {
            return Err(NetworkError::ConnectionClosed);
        }

        let json = serde_json::to_string(message)?;
        debug!("Sending message: {}", json);

        self.ws_stream
            .send(Message::Text(json.into()))
            .await
            .map_err(NetworkError::WebSocketError)?;

        Ok(())
    }

    /// Receive the next protocol message.
    ///
    /// Ping/pong frames are handled transparently.
    ///
    /// # Returns
    /// * `Ok(Some(message))` - a message was received
    /// * `Ok(None)` - connection closed gracefully
    pub async fn recv(&mut self) -> NetworkResult<Option<ServerMessage>> {
        if !self.is_open {
            return Ok(None);
        }

        loop {
            match self.ws_stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    debug!("Received message: {}", text);
                    let message: ServerMessage = serde_json::from_str(&text)?;
                    return Ok(Some(message));
                }
                Some(Ok(Message::Close(frame))) => {
                    info!("Received close frame: {:?}", frame);
                    self.is_open = false;
                    return Ok(None);
                }
                Some(Ok(Message::Ping(data))) => {
                    debug!("Received ping, sending pong");
                    self.ws_stream.send(Message::Pong(data)).await?;
                }
                Some(Ok(Message::Pong(_))) => {
                    debug!("Received pong");
                }
                Some(Ok(msg)) => {
                    warn!("Received unexpected message type: {:?}", msg);
                }
                Some(Err(e)) => {
                    self.is_open = false;
                    return Err(NetworkError::WebSocketError(e));
                }
                None => {
                    info!("WebSocket stream ended");
                    self.is_open = false;
                    return Ok(None);
                }
            }
        }
    }

    /// Close the WebSocket connection.
    ///
    /// # Errors
    /// Returns `NetworkError::WebSocketError` if the close handshake fails.
    pub async fn close(&mut self) -> NetworkResult<()> {
        if !self.is_open {
            return Ok(());
        }

        info!("Closing WebSocket connection");

        self.ws_stream
            .close(None)
            .await
            .map_err(NetworkError::WebSocketError)?;

        self.is_open = false;
        Ok(())
    }

    /// Check if the connection is open
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Split the connection into separate read and write halves for
    /// concurrent sending and receiving tasks.
    pub fn split(self) -> (WsWriter, WsReader) {
        self.ws_stream.split()
    }
}
