//! Capture coordinator
//!
//! The coordinator owns the capture lifecycle: the single [`CaptureState`],
//! the active [`CaptureSession`], the device pipeline, the session client,
//! and the recent-caption store. It runs as an actor: callers hold a
//! cloneable [`CoordinatorHandle`] and every mutation funnels through one
//! serialized command channel, dispatched by exhaustive match.
//!
//! Lifecycle rules:
//! - `start` is valid only from Idle; a second start is rejected without
//!   any state change.
//! - The session handshake waits off the actor loop, so a concurrent
//!   `stop` stays serviceable: it closes the connection, which fails the
//!   pending handshake, and the actor swallows that failure.
//! - `stop` always reaches Idle; every teardown sub-step is independently
//!   caught and logged.
//! - Device, pipeline, and connection are released together; never
//!   partially.

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::audio::{AudioPipeline, DeviceTarget};
use crate::captions::{Caption, RecentCaptions};
use crate::network::client::{SessionClient, SessionEvent};
use crate::state::{CaptureState, StateManager};

/// Capture session configuration
pub mod config;

/// Coordinator error types
pub mod error;

pub use config::CaptureConfig;
pub use error::{CaptureError, CaptureResult};

/// Capacity of the command channel
const COMMAND_CAPACITY: usize = 32;

/// Capacity of the per-session chunk channel
const CHUNK_CAPACITY: usize = 64;

/// Capacity of the caption/error broadcast channel
const EVENT_CAPACITY: usize = 64;

/// One active captioning session, as acknowledged by the service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureSession {
    /// Server-assigned opaque session identifier
    pub session_id: String,
    /// Source language requested for recognition
    pub source_language: String,
    /// Target language requested for translation
    pub target_language: String,
    /// Whether simplified captions were requested
    pub simplify: bool,
}

/// Read-only capture status snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureStatus {
    /// Current lifecycle state
    pub state: CaptureState,
    /// Whether a capture lifecycle is underway
    pub is_capturing: bool,
    /// Whether a service-acknowledged session is active
    pub has_session: bool,
}

/// Events republished to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    /// A new or freshly merged caption record
    Caption(Caption),
    /// The service reported an error; the stream continues
    ServiceError {
        /// Error description from the service
        message: String,
    },
    /// The connection dropped mid-stream; no automatic restart occurs
    Disconnected,
}

/// Commands accepted by the coordinator actor
enum Command {
    Start {
        device: DeviceTarget,
        config: CaptureConfig,
        reply: oneshot::Sender<CaptureResult<String>>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    Status {
        reply: oneshot::Sender<CaptureStatus>,
    },
    Recent {
        reply: oneshot::Sender<Vec<Caption>>,
    },
    Subscribe {
        reply: oneshot::Sender<broadcast::Receiver<CoordinatorEvent>>,
    },
}

/// Internal messages from spawned lifecycle tasks back to the actor
enum Internal {
    /// The session handshake resolved (or failed with the connection)
    SessionAck {
        result: Result<String, ()>,
        reply: oneshot::Sender<CaptureResult<String>>,
    },
}

/// Resources held while a capture lifecycle is underway
struct ActiveCapture {
    pipeline: AudioPipeline,
    client: SessionClient,
    session: Option<CaptureSession>,
    config: CaptureConfig,
}

/// Cloneable handle to a running capture coordinator
#[derive(Clone)]
pub struct CoordinatorHandle {
    command_tx: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    /// Start capturing from `device` and stream to the configured service.
    ///
    /// Resolves with the server-assigned session id once the service
    /// acknowledges the session and audio begins streaming.
    ///
    /// # Errors
    /// `AlreadyCapturing` if a lifecycle is underway, `DeviceAccess` /
    /// `Connection` / `SessionStart` for failures along the start chain.
    pub async fn start_capture(
        &self,
        device: DeviceTarget,
        config: CaptureConfig,
    ) -> CaptureResult<String> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Start {
            device,
            config,
            reply,
        })
        .await?;
        response.await.map_err(|_| CaptureError::CoordinatorClosed)?
    }

    /// Stop capturing and release all resources. Always succeeds; from
    /// Idle it is a no-op.
    ///
    /// # Errors
    /// Only `CoordinatorClosed` if the coordinator task is gone.
    pub async fn stop_capture(&self) -> CaptureResult<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Stop { reply }).await?;
        response.await.map_err(|_| CaptureError::CoordinatorClosed)
    }

    /// Read-only capture status
    ///
    /// # Errors
    /// Only `CoordinatorClosed` if the coordinator task is gone.
    pub async fn status(&self) -> CaptureResult<CaptureStatus> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Status { reply }).await?;
        response.await.map_err(|_| CaptureError::CoordinatorClosed)
    }

    /// Snapshot of recent captions, most-recent-first (at most 5)
    ///
    /// # Errors
    /// Only `CoordinatorClosed` if the coordinator task is gone.
    pub async fn recent_captions(&self) -> CaptureResult<Vec<Caption>> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Recent { reply }).await?;
        response.await.map_err(|_| CaptureError::CoordinatorClosed)
    }

    /// Subscribe to live caption and stream events
    ///
    /// # Errors
    /// Only `CoordinatorClosed` if the coordinator task is gone.
    pub async fn subscribe(&self) -> CaptureResult<broadcast::Receiver<CoordinatorEvent>> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Subscribe { reply }).await?;
        response.await.map_err(|_| CaptureError::CoordinatorClosed)
    }

    async fn send(&self, command: Command) -> CaptureResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| CaptureError::CoordinatorClosed)
    }
}

/// The capture coordinator actor
pub struct CaptureCoordinator {
    state: StateManager,
    captions: RecentCaptions,
    active: Option<ActiveCapture>,
    chunk_rx: Option<mpsc::Receiver<String>>,
    events_tx: broadcast::Sender<CoordinatorEvent>,
    session_event_tx: mpsc::Sender<SessionEvent>,
    internal_tx: mpsc::Sender<Internal>,
}

impl CaptureCoordinator {
    /// Spawn the coordinator actor and return a handle to it.
    ///
    /// The actor runs until every handle is dropped, releasing any held
    /// resources on the way out.
    pub fn spawn() -> CoordinatorHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (session_event_tx, session_event_rx) = mpsc::channel(EVENT_CAPACITY);
        let (internal_tx, internal_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let coordinator = Self {
            state: StateManager::new(),
            captions: RecentCaptions::new(),
            active: None,
            chunk_rx: None,
            events_tx,
            session_event_tx,
            internal_tx,
        };

        tokio::spawn(coordinator.run(command_rx, session_event_rx, internal_rx));

        CoordinatorHandle { command_tx }
    }

    /// Actor loop: one serialized point of mutation for state, session,
    /// and the caption store.
    async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<Command>,
        mut session_event_rx: mpsc::Receiver<SessionEvent>,
        mut internal_rx: mpsc::Receiver<Internal>,
    ) {
        info!("Capture coordinator started");

        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    let Some(command) = command else {
                        // All handles dropped
                        break;
                    };
                    self.handle_command(command).await;
                }

                Some(internal) = internal_rx.recv() => {
                    self.handle_internal(internal).await;
                }

                Some(event) = session_event_rx.recv() => {
                    self.handle_session_event(event);
                }

                Some(chunk) = next_chunk(&mut self.chunk_rx) => {
                    self.route_chunk(chunk).await;
                }
            }
        }

        // Shutdown: release whatever is still held
        if self.active.is_some() {
            self.teardown().await;
        }
        info!("Capture coordinator stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start {
                device,
                config,
                reply,
            } => {
                self.handle_start(device, config, reply).await;
            }
            Command::Stop { reply } => {
                self.handle_stop().await;
                let _ = reply.send(());
            }
            Command::Status { reply } => {
                let state = (*self.state.current()).clone();
                let _ = reply.send(CaptureStatus {
                    is_capturing: state.is_capturing(),
                    has_session: self
                        .active
                        .as_ref()
                        .is_some_and(|active| active.session.is_some()),
                    state,
                });
            }
            Command::Recent { reply } => {
                let _ = reply.send(self.captions.snapshot());
            }
            Command::Subscribe { reply } => {
                let _ = reply.send(self.events_tx.subscribe());
            }
        }
    }

    /// Start chain: acquire device, connect, request the session, then hand
    /// the unbounded handshake wait to a spawned task.
    async fn handle_start(
        &mut self,
        device: DeviceTarget,
        config: CaptureConfig,
        reply: oneshot::Sender<CaptureResult<String>>,
    ) {
        if !self.state.current().is_idle() {
            debug!("Rejecting start: capture already in progress");
            let _ = reply.send(Err(CaptureError::AlreadyCapturing));
            return;
        }

        if self.state.transition(CaptureState::AcquiringDevice).is_err() {
            let _ = reply.send(Err(CaptureError::AlreadyCapturing));
            return;
        }

        info!(device = ?device, server = %config.server_address, "Starting capture");

        // 1. Acquire the audio device. Denial acquires nothing, so the
        // state falls straight back to Idle.
        let pipeline = match AudioPipeline::new(&device) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                warn!("Device acquisition failed: {}", e);
                let _ = self.state.transition(CaptureState::Idle);
                let _ = reply.send(Err(CaptureError::DeviceAccess(e.to_string())));
                return;
            }
        };

        if let Err(e) = self.state.transition(CaptureState::AwaitingSessionStart) {
            error!("State machine out of sync: {}", e);
            let _ = reply.send(Err(CaptureError::AlreadyCapturing));
            return;
        }

        // 2. Connect to the service (bounded by the transport timeout).
        let mut client = SessionClient::new();
        if let Err(e) = client
            .connect(&config.connection_config(), self.session_event_tx.clone())
            .await
        {
            warn!("Connection failed: {}", e);
            drop(pipeline);
            let _ = self
                .state
                .transition(CaptureState::error(format!("connection failed: {}", e)));
            let _ = reply.send(Err(e.into()));
            return;
        }

        // 3. Request the session; the ack wait must not block this loop.
        let ack_rx = match client.begin_session(
            &config.source_language,
            &config.target_language,
            config.simplify,
        ) {
            Ok(ack_rx) => ack_rx,
            Err(e) => {
                warn!("Session request failed: {}", e);
                client.disconnect().await;
                drop(pipeline);
                let _ = self
                    .state
                    .transition(CaptureState::error(format!("session request failed: {}", e)));
                let _ = reply.send(Err(e.into()));
                return;
            }
        };

        self.active = Some(ActiveCapture {
            pipeline,
            client,
            session: None,
            config,
        });

        let internal_tx = self.internal_tx.clone();
        tokio::spawn(async move {
            // No timeout bounds this wait; a concurrent stop fails it by
            // closing the connection
            let result = ack_rx.await.map_err(|_| ());
            let _ = internal_tx
                .send(Internal::SessionAck { result, reply })
                .await;
        });
    }

    async fn handle_internal(&mut self, internal: Internal) {
        match internal {
            Internal::SessionAck { result, reply } => {
                self.handle_session_ack(result, reply).await;
            }
        }
    }

    /// Complete (or fail) the start chain when the handshake resolves
    async fn handle_session_ack(
        &mut self,
        result: Result<String, ()>,
        reply: oneshot::Sender<CaptureResult<String>>,
    ) {
        if !matches!(*self.state.current(), CaptureState::AwaitingSessionStart) {
            // A concurrent stop already tore the lifecycle down; the start
            // resolves to failure and the outcome is otherwise swallowed
            debug!("Session ack after stop; discarding");
            let _ = reply.send(Err(CaptureError::SessionStart(
                "capture stopped before the session was acknowledged".to_string(),
            )));
            return;
        }

        let session_id = match result {
            Ok(session_id) => session_id,
            Err(()) => {
                warn!("Connection ended before session acknowledgement");
                self.fail_start("session start failed: connection ended before acknowledgement")
                    .await;
                let _ = reply.send(Err(CaptureError::SessionStart(
                    "connection ended before the session was acknowledged".to_string(),
                )));
                return;
            }
        };

        let Some(active) = self.active.as_mut() else {
            error!("Session acknowledged but no active capture resources");
            let _ = reply.send(Err(CaptureError::SessionStart(
                "capture resources were released".to_string(),
            )));
            return;
        };

        active.client.activate(session_id.clone());
        active.session = Some(CaptureSession {
            session_id: session_id.clone(),
            source_language: active.config.source_language.clone(),
            target_language: active.config.target_language.clone(),
            simplify: active.config.simplify,
        });

        // 4. Begin routing frames now that the session is acknowledged
        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_CAPACITY);
        if let Err(e) = active.pipeline.start(chunk_tx) {
            error!("Audio pipeline failed to start: {}", e);
            let reason = format!("audio pipeline failed: {}", e);
            self.fail_start(&reason).await;
            let _ = reply.send(Err(CaptureError::DeviceAccess(reason)));
            return;
        }
        self.chunk_rx = Some(chunk_rx);

        if let Err(e) = self.state.transition(CaptureState::Streaming) {
            error!("State machine out of sync: {}", e);
        }

        info!(session_id = %session_id, "Capture streaming");
        let _ = reply.send(Ok(session_id));
    }

    /// Roll back a failed start: release everything, then record the reason
    async fn fail_start(&mut self, reason: &str) {
        if let Some(mut active) = self.active.take() {
            active.pipeline.stop().await;
            active.client.disconnect().await;
        }
        self.chunk_rx = None;

        let _ = self.state.transition(CaptureState::error(reason));
    }

    /// Teardown sequence for stop(): every sub-step independently logged,
    /// the sequence always completes.
    async fn handle_stop(&mut self) {
        if self.state.current().is_idle() {
            debug!("Stop requested while idle; nothing to do");
            return;
        }

        info!("Stopping capture");
        if let Err(e) = self.state.transition(CaptureState::Stopping) {
            warn!("Stop transition: {}", e);
        }

        self.teardown().await;

        if let Err(e) = self.state.transition(CaptureState::Idle) {
            warn!("Idle transition after stop: {}", e);
            self.state.force_set(CaptureState::Idle);
        }
        info!("Capture stopped");
    }

    /// Release device, pipeline, session, and connection together
    async fn teardown(&mut self) {
        self.chunk_rx = None;

        let Some(mut active) = self.active.take() else {
            return;
        };

        // Device and pipeline task first; frame production ends here
        active.pipeline.stop().await;

        // Best-effort session stop; also closes the connection, failing a
        // handshake still in flight
        match active.session.as_ref() {
            Some(session) => {
                let session_id = session.session_id.clone();
                active.client.stop_session(&session_id).await;
            }
            None => active.client.disconnect().await,
        }
    }

    /// Caption ingestion and republication; the only writer of the store
    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::CaptionResult(caption) => {
                debug!(id = %caption.id, "Caption result");
                self.captions.insert(caption.clone());
                let _ = self.events_tx.send(CoordinatorEvent::Caption(caption));
            }
            SessionEvent::CaptionUpdate(update) => {
                match self.captions.apply_update(&update) {
                    Some(merged) => {
                        debug!(id = %merged.id, "Caption updated");
                        let _ = self.events_tx.send(CoordinatorEvent::Caption(merged));
                    }
                    None => {
                        debug!(id = %update.id, "Update for unknown caption ignored");
                    }
                }
            }
            SessionEvent::ServiceError { message } => {
                warn!("Captioning service error: {}", message);
                let _ = self
                    .events_tx
                    .send(CoordinatorEvent::ServiceError { message });
            }
            SessionEvent::Disconnected => {
                // Informational only: no automatic retry or stop
                warn!("Captioning service disconnected");
                let _ = self.events_tx.send(CoordinatorEvent::Disconnected);
            }
        }
    }

    /// Forward one encoded chunk to the service, but only while Streaming
    async fn route_chunk(&mut self, chunk: String) {
        if !self.state.current().is_streaming() {
            debug!("Discarding chunk produced outside Streaming");
            return;
        }

        let Some(active) = self.active.as_ref() else {
            return;
        };
        let Some(session) = active.session.as_ref() else {
            return;
        };

        active.client.send_chunk(&session.session_id, chunk).await;
    }
}

/// Await the next chunk, or park forever while no pipeline is running
async fn next_chunk(chunk_rx: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match chunk_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
