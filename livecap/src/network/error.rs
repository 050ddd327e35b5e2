/// Network error types for WebSocket communication
///
/// This module defines error types used throughout the network layer.
use thiserror::Error;

/// Network-related errors
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Failed to connect to the captioning service
    #[error("Failed to connect to server: {0}")]
    ConnectionFailed(String),

    /// Connection timeout
    #[error("Connection timeout after {0}ms")]
    Timeout(u64),

    /// The connection ended before the service acknowledged the session
    #[error("Session start failed: {0}")]
    SessionStartFailed(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocketError(#[from] tokio_tungstenite::tungstenite::Error),

    /// Failed to serialize or deserialize a message
    #[error("Failed to serialize message: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Connection closed unexpectedly
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No session with the given id is active
    #[error("No active session with id {0}")]
    NoActiveSession(String),
}

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;
