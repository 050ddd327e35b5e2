//! LiveCap - real-time live captioning core
//!
//! Captures device audio, downsamples and PCM-encodes it, streams it over a
//! session-scoped WebSocket protocol to a captioning service, and
//! aggregates the caption events the service returns.
//!
//! The [`coordinator::CaptureCoordinator`] is the entry point: spawn it,
//! then drive it through the returned handle.
//!
//! ```no_run
//! use livecap::audio::DeviceTarget;
//! use livecap::coordinator::{CaptureConfig, CaptureCoordinator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = CaptureCoordinator::spawn();
//!
//!     let config = CaptureConfig::new("ws://127.0.0.1:5000/stream")
//!         .with_languages("en-IN", "hi");
//!
//!     let session_id = handle
//!         .start_capture(DeviceTarget::Default, config)
//!         .await
//!         .unwrap();
//!     println!("Streaming in session {}", session_id);
//!
//!     for caption in handle.recent_captions().await.unwrap() {
//!         println!("{}: {}", caption.id, caption.original);
//!     }
//!
//!     handle.stop_capture().await.unwrap();
//! }
//! ```

/// Audio capture and encoding
pub mod audio;

/// Caption model and recent-caption store
pub mod captions;

/// Capture lifecycle coordination
pub mod coordinator;

/// Network communication with the captioning service
pub mod network;

/// Capture lifecycle state machine
pub mod state;

/// Utility modules
pub mod utils;
