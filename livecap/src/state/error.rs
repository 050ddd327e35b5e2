use thiserror::Error;

use super::CaptureState;

/// State machine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// The requested state transition is not allowed
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// State the machine was in
        from: CaptureState,
        /// State that was requested
        to: CaptureState,
    },
}

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;
