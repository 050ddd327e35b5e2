//! Audio capture and encoding
//!
//! Everything between the input device and the transport-encoded chunk:
//! device selection, the real-time capture stream, frame accumulation,
//! sample-rate conversion and PCM/base64 encoding.

/// Audio capture stream management
pub mod capture;

/// Input device enumeration and selection
pub mod device;

/// PCM and transport encoding
pub mod encoder;

/// Audio-related error types
pub mod error;

/// Fixed-size frame accumulation
pub mod frame;

/// Audio processing pipeline
pub mod pipeline;

/// Sample-rate conversion
pub mod resampler;

// Re-export commonly used types
pub use capture::AudioCapture;
pub use device::{AudioDevice, DeviceTarget, list_input_devices};
pub use error::{AudioError, AudioResult};
pub use frame::{FRAME_SIZE, FrameBuffer};
pub use pipeline::AudioPipeline;
pub use resampler::{SERVICE_SAMPLE_RATE, resample};
