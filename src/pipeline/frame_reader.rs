//! Assembles fixed-size frames from the capture ring buffer.

use ringbuf::traits::{Consumer, Observer};

use crate::Frame;

/// Reads whole frames of `block_size` samples out of the ring consumer.
///
/// The device callback pushes samples in whatever granularity the OS
/// delivers; this reader re-blocks them into the session's fixed frame size
/// so each [`Frame`] corresponds to one callback period of the configured
/// cadence.
pub(crate) struct FrameReader {
    consumer: ringbuf::HeapCons<i16>,
    block_size: usize,
}

impl FrameReader {
    pub fn new(consumer: ringbuf::HeapCons<i16>, block_size: usize) -> Self {
        debug_assert!(block_size > 0);
        Self {
            consumer,
            block_size,
        }
    }

    /// Number of samples currently buffered.
    pub fn available(&self) -> usize {
        self.consumer.occupied_len()
    }

    /// Reads one complete frame, or `None` if fewer than `block_size`
    /// samples are buffered.
    pub fn try_read_frame(&mut self) -> Option<Frame> {
        if self.available() < self.block_size {
            return None;
        }

        let mut samples = Vec::with_capacity(self.block_size);
        for _ in 0..self.block_size {
            match self.consumer.try_pop() {
                Some(sample) => samples.push(sample),
                None => break,
            }
        }

        Some(Frame::new(samples))
    }

    /// Reads whatever remains as one final short frame.
    ///
    /// Called once at shutdown after the source has been halted, so the
    /// tail of the capture is persisted instead of discarded. Returns
    /// `None` if the ring is empty.
    pub fn drain_partial(&mut self) -> Option<Frame> {
        let remaining = self.available();
        if remaining == 0 {
            return None;
        }

        let mut samples = Vec::with_capacity(remaining);
        while let Some(sample) = self.consumer.try_pop() {
            samples.push(sample);
        }

        Some(Frame::new(samples))
    }
}
