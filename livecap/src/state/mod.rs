//! Capture lifecycle state machine
//!
//! A single [`CaptureState`] instance, owned by the coordinator, describes
//! where the capture lifecycle currently is. [`StateManager`] validates
//! transitions and keeps the current state readable lock-free from any
//! thread.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

/// State machine error types
pub mod error;

pub use error::{StateError, StateResult};

/// Capture lifecycle states
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CaptureState {
    /// Nothing captured, no session, no resources held
    Idle,

    /// Opening the audio input device
    AcquiringDevice,

    /// Device acquired; waiting for the service to acknowledge the session
    AwaitingSessionStart,

    /// Session acknowledged; audio chunks are flowing
    Streaming,

    /// Teardown in progress
    Stopping,

    /// A start attempt failed after resources were acquired; everything has
    /// been rolled back and the reason is kept for inspection
    Error(String),
}

impl CaptureState {
    /// Create an error state with the given reason
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    /// Check if this is the idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if audio is actively streaming
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Whether a capture lifecycle is underway (anything but Idle/Error)
    pub fn is_capturing(&self) -> bool {
        !matches!(self, Self::Idle | Self::Error(_))
    }

    /// Get the error reason, if in the error state
    pub fn error_reason(&self) -> Option<&str> {
        match self {
            Self::Error(reason) => Some(reason),
            _ => None,
        }
    }

    /// Short state name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::AcquiringDevice => "AcquiringDevice",
            Self::AwaitingSessionStart => "AwaitingSessionStart",
            Self::Streaming => "Streaming",
            Self::Stopping => "Stopping",
            Self::Error(_) => "Error",
        }
    }
}

impl Default for CaptureState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Validated holder of the single capture state
///
/// Reads are lock-free via `ArcSwap`; writes happen only from the
/// coordinator, which serializes them.
pub struct StateManager {
    state: ArcSwap<CaptureState>,
}

impl StateManager {
    /// Create a manager starting in `Idle`
    pub fn new() -> Self {
        Self {
            state: ArcSwap::new(Arc::new(CaptureState::Idle)),
        }
    }

    /// Get the current state (lock-free)
    pub fn current(&self) -> Arc<CaptureState> {
        self.state.load_full()
    }

    /// Transition to a new state, validating the edge.
    ///
    /// # Errors
    /// Returns [`StateError::InvalidTransition`] if the state machine does
    /// not allow the edge.
    pub fn transition(&self, new_state: CaptureState) -> StateResult<()> {
        let current = self.current();

        if !Self::is_valid_transition(&current, &new_state) {
            return Err(StateError::InvalidTransition {
                from: (*current).clone(),
                to: new_state,
            });
        }

        tracing::debug!(from = current.name(), to = new_state.name(), "State transition");
        self.state.store(Arc::new(new_state));
        Ok(())
    }

    /// Set the state without validation.
    ///
    /// Reserved for error recovery paths where the machine must be forced
    /// back to a known state.
    pub fn force_set(&self, new_state: CaptureState) {
        tracing::debug!(to = new_state.name(), "State forced");
        self.state.store(Arc::new(new_state));
    }

    /// Validate a transition against the lifecycle graph
    fn is_valid_transition(from: &CaptureState, to: &CaptureState) -> bool {
        use CaptureState::*;

        match (from, to) {
            // Start chain
            (Idle, AcquiringDevice) => true,
            (AcquiringDevice, AwaitingSessionStart) => true,
            (AwaitingSessionStart, Streaming) => true,

            // Device denial acquires nothing, so it falls straight back
            (AcquiringDevice, Idle) => true,

            // stop() is valid from any non-idle state
            (AcquiringDevice, Stopping) => true,
            (AwaitingSessionStart, Stopping) => true,
            (Streaming, Stopping) => true,
            (Error(_), Stopping) => true,

            // Teardown always completes
            (Stopping, Idle) => true,

            // Post-acquisition start failures land in Error
            (AcquiringDevice, Error(_)) => true,
            (AwaitingSessionStart, Error(_)) => true,
            (Streaming, Error(_)) => true,

            _ => false,
        }
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
