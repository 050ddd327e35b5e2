//! Streaming session client for the captioning service
//!
//! Owns one WebSocket connection and one captioning session on it. The
//! client walks an explicit state machine:
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> SessionPending -> SessionActive
//!       ^                                                          |
//!       +------------------- stop / error / remote close ----------+
//! ```
//!
//! After connecting, a sender task drains outbound messages in order and a
//! receiver task parses inbound frames: the `stream_started` ack resolves a
//! oneshot held by the session starter, and everything else is forwarded
//! upward as [`SessionEvent`]s. Closing the connection ends the receiver,
//! which drops the ack sender and fails any pending session start; that is
//! how a concurrent stop unparks a start waiting on an unresponsive
//! service.

use crate::network::connection::{CaptionConnection, ConnectionConfig, WsReader, WsWriter};
use crate::network::error::{NetworkError, NetworkResult};
use crate::network::messages::{CaptionUpdate, ClientMessage, ServerMessage};
use crate::captions::Caption;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Capacity of the outbound message channel
const OUTBOUND_CAPACITY: usize = 100;

/// Client connection lifecycle states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientState {
    /// No connection
    Disconnected,
    /// TCP/WebSocket connect in progress
    Connecting,
    /// Connected, no session requested yet
    Connected,
    /// `start_stream` sent, awaiting `stream_started`
    SessionPending,
    /// Session acknowledged; audio may flow
    SessionActive,
}

/// Inbound events surfaced to the owner of the client
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new caption arrived
    CaptionResult(Caption),
    /// A partial update for a known caption arrived
    CaptionUpdate(CaptionUpdate),
    /// The service reported an error; informational, the stream continues
    ServiceError {
        /// Error description from the service
        message: String,
    },
    /// The connection dropped without a client-initiated close
    Disconnected,
}

/// Client for one captioning session over one WebSocket connection
pub struct SessionClient {
    state: ClientState,
    session_id: Option<String>,
    outbound_tx: Option<mpsc::Sender<ClientMessage>>,
    session_ack_rx: Option<oneshot::Receiver<String>>,
    sender_task: Option<JoinHandle<()>>,
    receiver_task: Option<JoinHandle<()>>,
}

impl SessionClient {
    /// Create a disconnected client
    pub fn new() -> Self {
        Self {
            state: ClientState::Disconnected,
            session_id: None,
            outbound_tx: None,
            session_ack_rx: None,
            sender_task: None,
            receiver_task: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Session id of the active session, if any
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Open the WebSocket connection and spawn the send/receive tasks.
    ///
    /// Inbound caption/error/disconnect events are delivered to `event_tx`.
    /// The transport's own connect behavior (including the configured
    /// timeout) applies; no retry layer is added.
    ///
    /// # Errors
    /// `NetworkError::ConnectionFailed` / `NetworkError::Timeout` if the
    /// transport cannot connect, `NetworkError::InvalidConfig` if called
    /// while not disconnected.
    pub async fn connect(
        &mut self,
        config: &ConnectionConfig,
        event_tx: mpsc::Sender<SessionEvent>,
    ) -> NetworkResult<()> {
        if self.state != ClientState::Disconnected {
            return Err(NetworkError::InvalidConfig(format!(
                "Client is not disconnected (state: {:?})",
                self.state
            )));
        }

        self.state = ClientState::Connecting;

        let connection = match CaptionConnection::connect(config).await {
            Ok(connection) => connection,
            Err(e) => {
                self.state = ClientState::Disconnected;
                return Err(e);
            }
        };

        let (writer, reader) = connection.split();
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (ack_tx, ack_rx) = oneshot::channel();

        self.sender_task = Some(tokio::spawn(sender_task(writer, outbound_rx)));
        self.receiver_task = Some(tokio::spawn(receiver_task(reader, ack_tx, event_tx)));
        self.outbound_tx = Some(outbound_tx);
        self.session_ack_rx = Some(ack_rx);
        self.state = ClientState::Connected;

        Ok(())
    }

    /// Queue the `start_stream` request and hand back the ack receiver.
    ///
    /// The receiver resolves with the server-assigned session id, or fails
    /// if the connection ends first. The caller decides where to await it;
    /// no timeout bounds the wait.
    ///
    /// # Errors
    /// `NetworkError::InvalidConfig` if the client is not in `Connected`.
    pub fn begin_session(
        &mut self,
        source_language: &str,
        target_language: &str,
        simplify: bool,
    ) -> NetworkResult<oneshot::Receiver<String>> {
        if self.state != ClientState::Connected {
            return Err(NetworkError::InvalidConfig(format!(
                "Cannot start session in state {:?}",
                self.state
            )));
        }

        let ack_rx = self
            .session_ack_rx
            .take()
            .ok_or_else(|| NetworkError::InvalidConfig("Session already requested".to_string()))?;

        let request = ClientMessage::start_stream(source_language, target_language, simplify);
        self.queue(request);

        self.state = ClientState::SessionPending;
        info!("Session start requested");

        Ok(ack_rx)
    }

    /// Mark the session acknowledged by the server
    pub fn activate(&mut self, session_id: String) {
        info!(session_id = %session_id, "Session active");
        self.session_id = Some(session_id);
        self.state = ClientState::SessionActive;
    }

    /// Connect, request a session, and wait for the acknowledgement.
    ///
    /// Convenience composition of [`connect`](Self::connect),
    /// [`begin_session`](Self::begin_session) and
    /// [`activate`](Self::activate); resolves with the session id.
    ///
    /// # Errors
    /// `ConnectionFailed`/`Timeout` if the transport cannot connect;
    /// `SessionStartFailed` if the connection ends before a session id
    /// arrives.
    pub async fn start_session(
        &mut self,
        config: &ConnectionConfig,
        source_language: &str,
        target_language: &str,
        simplify: bool,
        event_tx: mpsc::Sender<SessionEvent>,
    ) -> NetworkResult<String> {
        self.connect(config, event_tx).await?;

        let ack_rx = self.begin_session(source_language, target_language, simplify)?;

        match ack_rx.await {
            Ok(session_id) => {
                self.activate(session_id.clone());
                Ok(session_id)
            }
            Err(_) => {
                self.disconnect().await;
                Err(NetworkError::SessionStartFailed(
                    "Connection ended before the session was acknowledged".to_string(),
                ))
            }
        }
    }

    /// Forward one transport-encoded audio chunk for the given session.
    ///
    /// Chunks for a session other than the current one are discarded with a
    /// log line; this guards against late sends after a stop. Delivery is
    /// fire-and-forget: a chunk lost to a dying connection is logged, and
    /// the drop itself is surfaced separately as a `Disconnected` event.
    pub async fn send_chunk(&self, session_id: &str, audio: String) {
        if self.session_id.as_deref() != Some(session_id) {
            warn!(
                chunk_session = %session_id,
                current_session = ?self.session_id,
                "Discarding audio chunk for inactive session"
            );
            return;
        }

        let Some(outbound_tx) = &self.outbound_tx else {
            warn!("Discarding audio chunk: no connection");
            return;
        };

        if outbound_tx
            .send(ClientMessage::audio_chunk(session_id, audio))
            .await
            .is_err()
        {
            warn!("Discarding audio chunk: connection is closing");
        }
    }

    /// Best-effort session stop: notify the service, then close.
    ///
    /// Errors in the stop notification are logged and swallowed; the
    /// connection is closed regardless.
    pub async fn stop_session(&mut self, session_id: &str) {
        if self.session_id.as_deref() == Some(session_id) {
            info!(session_id = %session_id, "Stopping session");
            self.queue(ClientMessage::stop_stream(session_id));
        } else {
            warn!(
                requested = %session_id,
                current = ?self.session_id,
                "Stop requested for a session that is not current"
            );
        }

        self.disconnect().await;
    }

    /// Close the connection and return to `Disconnected`.
    ///
    /// Queued outbound messages (including a pending `stop_stream`) are
    /// drained before the close frame goes out. Ending the receiver fails
    /// any pending session-start wait.
    pub async fn disconnect(&mut self) {
        if self.state == ClientState::Disconnected {
            return;
        }

        debug!("Disconnecting session client");

        // Dropping the last outbound sender lets the sender task drain the
        // queue and close the socket
        self.outbound_tx = None;
        self.session_ack_rx = None;

        if let Some(task) = self.sender_task.take() {
            if let Err(e) = task.await {
                warn!("Sender task failed: {}", e);
            }
        }

        if let Some(task) = self.receiver_task.take() {
            // The close frame is out; the receiver either winds down on the
            // peer's close or is cancelled here
            task.abort();
            let _ = task.await;
        }

        self.session_id = None;
        self.state = ClientState::Disconnected;
        info!("Session client disconnected");
    }

    /// Queue an outbound message, logging if the connection is gone
    fn queue(&self, message: ClientMessage) {
        let Some(outbound_tx) = &self.outbound_tx else {
            warn!("Dropping outbound message: no connection");
            return;
        };

        if outbound_tx.try_send(message).is_err() {
            warn!("Dropping outbound message: channel full or closing");
        }
    }
}

impl Default for SessionClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Sender task: serialize outbound messages in order, then close the socket
/// once the channel is drained and closed.
async fn sender_task(mut writer: WsWriter, mut outbound_rx: mpsc::Receiver<ClientMessage>) {
    debug!("Sender task started");

    let mut sent = 0u64;

    while let Some(message) = outbound_rx.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize outbound message: {}", e);
                continue;
            }
        };

        if let Err(e) = writer.send(Message::Text(json.into())).await {
            warn!("Failed to send message: {}", e);
            break;
        }

        sent += 1;
    }

    if let Err(e) = writer.close().await {
        debug!("WebSocket writer close: {}", e);
    }

    debug!("Sender task finished after {} messages", sent);
}

/// Receiver task: parse inbound frames, resolve the session ack, forward
/// caption and error events, and report unsolicited disconnects.
async fn receiver_task(
    mut reader: WsReader,
    ack_tx: oneshot::Sender<String>,
    event_tx: mpsc::Sender<SessionEvent>,
) {
    debug!("Receiver task started");

    let mut ack_tx = Some(ack_tx);

    while let Some(frame) = reader.next().await {
        let message = match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Ignoring unparseable message: {} ({})", text, e);
                    continue;
                }
            },
            Ok(Message::Close(frame)) => {
                info!("Received close frame: {:?}", frame);
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(other) => {
                warn!("Ignoring unexpected frame: {:?}", other);
                continue;
            }
            Err(e) => {
                warn!("WebSocket read error: {}", e);
                break;
            }
        };

        let event = match message {
            ServerMessage::Connected { message } => {
                debug!("Service greeting: {:?}", message);
                continue;
            }
            ServerMessage::StreamStarted { session_id } => {
                match ack_tx.take() {
                    Some(tx) => {
                        if tx.send(session_id).is_err() {
                            debug!("Session ack arrived after the starter gave up");
                        }
                    }
                    None => warn!("Duplicate stream_started ignored"),
                }
                continue;
            }
            ServerMessage::StreamStopped { status } => {
                debug!("Stream stopped by service: {:?}", status);
                continue;
            }
            ServerMessage::CaptionResult(caption) => SessionEvent::CaptionResult(caption),
            ServerMessage::CaptionUpdate(update) => SessionEvent::CaptionUpdate(update),
            ServerMessage::Error { message } => SessionEvent::ServiceError { message },
        };

        if event_tx.send(event).await.is_err() {
            warn!("Event receiver dropped, stopping receiver task");
            return;
        }
    }

    // Unsolicited end of stream; a client-initiated disconnect cancels this
    // task before it gets here
    let _ = event_tx.send(SessionEvent::Disconnected).await;
    debug!("Receiver task finished");
}
