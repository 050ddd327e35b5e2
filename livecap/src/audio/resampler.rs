//! Sample-rate conversion for the capture pipeline
//!
//! Converts captured audio from the device rate to the service rate
//! (typically 16 kHz) with a deterministic box filter: each output sample is
//! the mean of the input samples falling into its window. There is no
//! anti-aliasing filter; this trades some fidelity for exact, reproducible
//! output, which is sufficient for speech recognition input.

use tracing::debug;

/// Target sample rate expected by the captioning service
pub const SERVICE_SAMPLE_RATE: u32 = 16_000;

/// Resample `input` from `input_rate` to `output_rate`.
///
/// The output length is `round(input.len() / ratio)` where
/// `ratio = input_rate / output_rate`. Output sample `i` is the mean of the
/// input window `[floor(i * ratio), ceil((i + 1) * ratio))`, clipped to the
/// input; an empty window produces 0.0. Equal rates return the input
/// unchanged.
///
/// # Example
/// ```
/// use livecap::audio::resampler::resample;
///
/// let input = vec![1.0f32; 4096];
/// let output = resample(&input, 48_000, 16_000);
/// assert_eq!(output.len(), 1365); // round(4096 / 3)
/// ```
pub fn resample(input: &[f32], input_rate: u32, output_rate: u32) -> Vec<f32> {
    if input_rate == output_rate {
        return input.to_vec();
    }

    let ratio = input_rate as f64 / output_rate as f64;
    let output_len = (input.len() as f64 / ratio).round() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let start = (i as f64 * ratio).floor() as usize;
        let end = ((i + 1) as f64 * ratio).ceil() as usize;

        let mut sum = 0.0f64;
        let mut count = 0usize;
        for &sample in input.iter().take(end.min(input.len())).skip(start) {
            sum += sample as f64;
            count += 1;
        }

        output.push(if count > 0 {
            (sum / count as f64) as f32
        } else {
            0.0
        });
    }

    debug!(
        input_len = input.len(),
        output_len = output.len(),
        input_rate,
        output_rate,
        "Resampled frame"
    );

    output
}
