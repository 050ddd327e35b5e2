/// Wire protocol messages for the captioning service
///
/// JSON text frames tagged by a `type` field, exchanged over a WebSocket.
/// The session protocol: the client opens a stream with `start_stream`, the
/// service acknowledges with `stream_started {session_id}`, audio flows as
/// fire-and-forget `audio_chunk` messages tagged with that session id, and
/// caption events come back keyed by caption id.
use serde::{Deserialize, Serialize};

use crate::captions::Caption;

// ============================================================================
// Client -> Server Messages
// ============================================================================

/// Messages sent from the client to the captioning service
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Open a captioning session
    #[serde(rename = "start_stream")]
    StartStream {
        /// Source language code (e.g. "en-IN")
        source_language: String,
        /// Target language code for translation (e.g. "hi")
        target_language: String,
        /// Whether the service should also produce simplified captions
        simplify: bool,
    },

    /// One transport-encoded audio frame (fire-and-forget)
    #[serde(rename = "audio_chunk")]
    AudioChunk {
        /// Session the chunk belongs to
        session_id: String,
        /// Base64-encoded PCM audio data (i16 little-endian)
        audio: String,
    },

    /// Close the captioning session (fire-and-forget)
    #[serde(rename = "stop_stream")]
    StopStream {
        /// Session to stop
        session_id: String,
    },
}

impl ClientMessage {
    /// Create a session-start request
    pub fn start_stream(
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        simplify: bool,
    ) -> Self {
        Self::StartStream {
            source_language: source_language.into(),
            target_language: target_language.into(),
            simplify,
        }
    }

    /// Create an audio chunk message for the given session
    pub fn audio_chunk(session_id: impl Into<String>, audio: impl Into<String>) -> Self {
        Self::AudioChunk {
            session_id: session_id.into(),
            audio: audio.into(),
        }
    }

    /// Create a session-stop notification
    pub fn stop_stream(session_id: impl Into<String>) -> Self {
        Self::StopStream {
            session_id: session_id.into(),
        }
    }
}

// ============================================================================
// Server -> Client Messages
// ============================================================================

/// Messages received from the captioning service
///
/// Uses serde's tagged enum feature to deserialize based on the `type`
/// field, replacing string-compared event dispatch with exhaustive matching.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Greeting emitted by the service on connect; informational only
    #[serde(rename = "connected")]
    Connected {
        /// Optional human-readable greeting
        #[serde(default)]
        message: Option<String>,
    },

    /// The session has been opened
    #[serde(rename = "stream_started")]
    StreamStarted {
        /// Server-assigned opaque session identifier
        session_id: String,
    },

    /// A new caption for a recognized utterance
    #[serde(rename = "caption_result")]
    CaptionResult(Caption),

    /// Partial update for a previously delivered caption
    #[serde(rename = "caption_update")]
    CaptionUpdate(CaptionUpdate),

    /// Acknowledgement of `stop_stream`; informational only
    #[serde(rename = "stream_stopped")]
    StreamStopped {
        /// Optional status text
        #[serde(default)]
        status: Option<String>,
    },

    /// Error reported by the service
    #[serde(rename = "error")]
    Error {
        /// Error message description
        message: String,
    },
}

impl ServerMessage {
    /// Get the session ID if this is a stream-started message
    pub fn session_id(&self) -> Option<&str> {
        match self {
            ServerMessage::StreamStarted { session_id } => Some(session_id),
            _ => None,
        }
    }

    /// Check if this is a caption message (result or update)
    pub fn is_caption(&self) -> bool {
        matches!(
            self,
            ServerMessage::CaptionResult(_) | ServerMessage::CaptionUpdate(_)
        )
    }

    /// Get the error message if this is an error
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ServerMessage::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Partial caption update keyed by caption id
///
/// Only the fields present override the stored caption; absent fields are
/// preserved by the merge.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct CaptionUpdate {
    /// Identity of the caption being updated
    pub id: String,

    /// Replacement original text, if re-recognized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,

    /// Translated text, delivered when translation completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated: Option<String>,

    /// Simplified text, delivered when simplification completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplified: Option<String>,
}

impl CaptionUpdate {
    /// Create an empty update for the given caption id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the translated text
    pub fn with_translated(mut self, text: impl Into<String>) -> Self {
        self.translated = Some(text.into());
        self
    }

    /// Set the simplified text
    pub fn with_simplified(mut self, text: impl Into<String>) -> Self {
        self.simplified = Some(text.into());
        self
    }
}
