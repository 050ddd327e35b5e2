//! Fixed-size frame accumulation for the real-time capture callback
//!
//! The capture callback delivers sample blocks of arbitrary sizes. The
//! frame buffer accumulates them into fixed-capacity frames and hands each
//! completed frame off by value. It allocates only when a frame completes
//! and never blocks, so it is safe to run inside the audio callback.

/// Default frame capacity in samples (~85 ms at 48 kHz)
pub const FRAME_SIZE: usize = 4096;

/// Accumulates arbitrary sample blocks into fixed-size frames.
///
/// When an incoming block overflows the remaining capacity, the completed
/// frame is emitted and the remainder starts the next frame; no samples are
/// dropped at frame boundaries.
///
/// Not internally synchronized: the buffer lives on the capture thread and
/// completed frames cross the thread boundary by value.
#[derive(Debug)]
pub struct FrameBuffer {
    buffer: Vec<f32>,
    capacity: usize,
}

impl FrameBuffer {
    /// Create a frame buffer with the given frame capacity in samples
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a block of samples, invoking `emit` once per completed frame.
    ///
    /// Each emitted frame contains exactly `capacity` samples. Samples
    /// beyond a frame boundary carry into the next frame.
    pub fn push_block<F>(&mut self, mut block: &[f32], mut emit: F)
    where
        F: FnMut(Vec<f32>),
    {
        while !block.is_empty() {
            let remaining = self.capacity - self.buffer.len();
            let take = remaining.min(block.len());

            self.buffer.extend_from_slice(&block[..take]);
            block = &block[take..];

            if self.buffer.len() == self.capacity {
                let frame = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.capacity));
                emit(frame);
            }
        }
    }

    /// Number of samples accumulated toward the next frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Frame capacity in samples
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard any partially accumulated frame
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(FRAME_SIZE)
    }
}
