//! PCM and transport encoding
//!
//! Converts resampled f32 samples into the signed 16-bit little-endian wire
//! format expected by the captioning service, and wraps the raw bytes in
//! base64 so a frame can be embedded in a JSON message as one atomic unit.

use base64::{Engine, engine::general_purpose::STANDARD};

/// Convert f32 samples (nominal range -1.0..=1.0) to i16 PCM.
///
/// Samples are clamped first; negative values scale by 32768 and
/// non-negative values by 32767, so -1.0 maps to -32768 and 1.0 to 32767.
/// Fractional results truncate toward zero.
pub fn encode_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&sample| {
            let clamped = sample.clamp(-1.0, 1.0);
            let scaled = if clamped < 0.0 {
                clamped * 32768.0
            } else {
                clamped * 32767.0
            };
            scaled as i16
        })
        .collect()
}

/// Convert i16 PCM samples back to f32, dividing by the same asymmetric
/// factors used by [`encode_pcm16`]. Used by tests and diagnostics.
pub fn decode_pcm16(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&sample| {
            if sample < 0 {
                sample as f32 / 32768.0
            } else {
                sample as f32 / 32767.0
            }
        })
        .collect()
}

/// Convert i16 samples to little-endian bytes (2 bytes per sample)
pub fn pcm16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Parse little-endian bytes back into i16 samples.
///
/// A trailing odd byte is ignored; the wire format always carries whole
/// samples.
pub fn bytes_to_pcm16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Encode raw PCM bytes as standard base64 for transport
pub fn encode_transport(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a transport payload back to raw PCM bytes
pub fn decode_transport(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(payload)
}

/// Full frame encoding: f32 samples -> i16 PCM -> LE bytes -> base64
pub fn encode_frame(samples: &[f32]) -> String {
    encode_transport(&pcm16_to_bytes(&encode_pcm16(samples)))
}
