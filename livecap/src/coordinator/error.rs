use thiserror::Error;

use crate::network::NetworkError;

/// Errors returned by the capture coordinator's command surface
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The audio input device was denied or unavailable
    #[error("Device access failed: {0}")]
    DeviceAccess(String),

    /// The transport could not connect to the captioning service
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The connection ended before the service acknowledged the session
    #[error("Session start failed: {0}")]
    SessionStart(String),

    /// A capture lifecycle is already in progress
    #[error("Capture is already in progress")]
    AlreadyCapturing,

    /// The coordinator task has shut down
    #[error("Coordinator is not running")]
    CoordinatorClosed,
}

impl From<NetworkError> for CaptureError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::SessionStartFailed(reason) => CaptureError::SessionStart(reason),
            other => CaptureError::Connection(other.to_string()),
        }
    }
}

/// Result type for coordinator operations
pub type CaptureResult<T> = Result<T, CaptureError>;
