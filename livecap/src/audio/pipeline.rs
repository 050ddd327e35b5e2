use crate::audio::capture::AudioCapture;
use crate::audio::device::DeviceTarget;
use crate::audio::encoder::encode_frame;
use crate::audio::error::{AudioError, AudioResult};
use crate::audio::resampler::{SERVICE_SAMPLE_RATE, resample};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capacity of the frame handoff channel between the capture callback and
/// the processing task
const FRAME_CHANNEL_CAPACITY: usize = 32;

/// Audio processing pipeline from device to transport-encoded chunks
///
/// The pipeline:
/// 1. Captures fixed-size frames from the device (via [`AudioCapture`])
/// 2. Resamples each frame to the service rate
/// 3. Converts f32 samples to i16 little-endian PCM
/// 4. Base64-encodes the PCM bytes
/// 5. Sends one encoded chunk per frame through the output channel
///
/// One frame always becomes exactly one chunk; chunks leave the pipeline in
/// capture order.
pub struct AudioPipeline {
    /// Audio capture instance
    capture: AudioCapture,
    /// Processing task handle
    processing_task: Option<JoinHandle<()>>,
    /// Stop signal sender
    stop_signal: Option<oneshot::Sender<()>>,
    /// Whether the pipeline is currently running
    is_running: bool,
}

impl AudioPipeline {
    /// Acquire the capture device and prepare the pipeline.
    ///
    /// # Errors
    /// Propagates device acquisition errors from [`AudioCapture::new`].
    pub fn new(target: &DeviceTarget) -> AudioResult<Self> {
        info!("Creating audio pipeline");

        let capture = AudioCapture::new(target)?;
        info!("Audio capture created: {} Hz", capture.sample_rate());

        Ok(Self {
            capture,
            processing_task: None,
            stop_signal: None,
            is_running: false,
        })
    }

    /// Start capture and processing, sending encoded chunks to `output`.
    ///
    /// # Errors
    /// Returns `AudioError::StreamBuildFailed` if already running or if the
    /// capture stream fails to start.
    pub fn start(&mut self, output: mpsc::Sender<String>) -> AudioResult<()> {
        if self.is_running {
            return Err(AudioError::StreamBuildFailed(
                "Pipeline already running".to_string(),
            ));
        }

        info!("Starting audio pipeline");

        let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = oneshot::channel();

        self.capture.start(frame_tx)?;

        let input_rate = self.capture.sample_rate();
        let processing_task = tokio::spawn(async move {
            Self::processing_loop(frame_rx, output, stop_rx, input_rate).await;
        });

        self.processing_task = Some(processing_task);
        self.stop_signal = Some(stop_tx);
        self.is_running = true;

        info!("Audio pipeline started");
        Ok(())
    }

    /// Stop capture and wait for the processing task to drain
    pub async fn stop(&mut self) {
        if !self.is_running {
            return;
        }

        info!("Stopping audio pipeline");

        self.capture.stop();

        if let Some(stop_tx) = self.stop_signal.take() {
            let _ = stop_tx.send(());
        }

        if let Some(task) = self.processing_task.take() {
            let _ = task.await;
        }

        self.is_running = false;
        info!("Audio pipeline stopped");
    }

    /// Whether the pipeline is running
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Sample rate of the capture device
    pub fn input_sample_rate(&self) -> u32 {
        self.capture.sample_rate()
    }

    /// Sample rate of the encoded output
    pub fn output_sample_rate(&self) -> u32 {
        SERVICE_SAMPLE_RATE
    }

    /// Frame consumer: resample, encode and forward each frame as one chunk
    async fn processing_loop(
        mut frame_rx: mpsc::Receiver<Vec<f32>>,
        output_tx: mpsc::Sender<String>,
        mut stop_rx: oneshot::Receiver<()>,
        input_rate: u32,
    ) {
        info!("Processing loop started");

        let mut frame_count = 0u64;

        loop {
            tokio::select! {
                maybe_frame = frame_rx.recv() => {
                    let Some(frame) = maybe_frame else {
                        info!("Frame channel closed");
                        break;
                    };

                    frame_count += 1;

                    let resampled = resample(&frame, input_rate, SERVICE_SAMPLE_RATE);
                    let chunk = encode_frame(&resampled);

                    debug!(
                        frame = frame_count,
                        samples = resampled.len(),
                        encoded_len = chunk.len(),
                        "Encoded frame"
                    );

                    if output_tx.send(chunk).await.is_err() {
                        warn!("Chunk channel closed, stopping processing loop");
                        break;
                    }
                }

                _ = &mut stop_rx => {
                    info!("Stop signal received");
                    break;
                }
            }
        }

        info!("Processing loop finished after {} frames", frame_count);
    }
}

impl Drop for AudioPipeline {
    fn drop(&mut self) {
        if self.is_running {
            // Cannot await the task in Drop; stopping capture and firing
            // the stop signal lets it wind down on its own
            self.capture.stop();

            if let Some(stop_tx) = self.stop_signal.take() {
                let _ = stop_tx.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::encoder::{bytes_to_pcm16, decode_transport};

    #[tokio::test]
    async fn test_processing_loop_one_chunk_per_frame() {
        let (frame_tx, frame_rx) = mpsc::channel(8);
        let (chunk_tx, mut chunk_rx) = mpsc::channel(8);
        let (_stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(AudioPipeline::processing_loop(
            frame_rx, chunk_tx, stop_rx, 48000,
        ));

        frame_tx.send(vec![1.0f32; 4096]).await.unwrap();
        frame_tx.send(vec![0.0f32; 4096]).await.unwrap();
        drop(frame_tx);

        let first = chunk_rx.recv().await.expect("first chunk");
        let second = chunk_rx.recv().await.expect("second chunk");
        assert!(chunk_rx.recv().await.is_none(), "exactly one chunk per frame");

        // 4096 samples at 48k -> 1365 samples at 16k -> 2730 bytes
        let bytes = decode_transport(&first).unwrap();
        assert_eq!(bytes.len(), 1365 * 2);

        // Full-scale input stays full-scale through the box filter
        let pcm = bytes_to_pcm16(&bytes);
        assert!(pcm.iter().all(|&s| s == 0x7FFF));

        let silent = bytes_to_pcm16(&decode_transport(&second).unwrap());
        assert!(silent.iter().all(|&s| s == 0));

        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_processing_loop_stop_signal() {
        let (frame_tx, frame_rx) = mpsc::channel::<Vec<f32>>(8);
        let (chunk_tx, _chunk_rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(AudioPipeline::processing_loop(
            frame_rx, chunk_tx, stop_rx, 48000,
        ));

        stop_tx.send(()).unwrap();
        task.await.unwrap();

        // Keep the producer alive until here to show the stop signal, not
        // channel closure, ended the loop
        drop(frame_tx);
    }

    #[tokio::test]
    async fn test_processing_loop_chunk_order() {
        let (frame_tx, frame_rx) = mpsc::channel(8);
        let (chunk_tx, mut chunk_rx) = mpsc::channel(8);
        let (_stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(AudioPipeline::processing_loop(
            frame_rx, chunk_tx, stop_rx, 16000,
        ));

        // Distinguishable frames at the passthrough rate
        for level in [0.1f32, 0.2, 0.3] {
            frame_tx.send(vec![level; 16]).await.unwrap();
        }
        drop(frame_tx);

        let mut levels = Vec::new();
        while let Some(chunk) = chunk_rx.recv().await {
            let pcm = bytes_to_pcm16(&decode_transport(&chunk).unwrap());
            levels.push(pcm[0]);
        }

        assert_eq!(levels.len(), 3);
        assert!(levels[0] < levels[1] && levels[1] < levels[2], "order preserved");

        task.await.unwrap();
    }
}
