/// Network communication with the captioning service
///
/// This module provides the WebSocket transport, the tagged protocol
/// messages, and the streaming session client built on top of them.

/// Streaming session client
pub mod client;

/// WebSocket connection management
pub mod connection;

/// Network error types
pub mod error;

/// Wire protocol message definitions
pub mod messages;

// Re-export commonly used types
pub use client::{ClientState, SessionClient, SessionEvent};
pub use connection::{CaptionConnection, ConnectionConfig, WsReader, WsWriter};
pub use error::{NetworkError, NetworkResult};
pub use messages::{CaptionUpdate, ClientMessage, ServerMessage};
