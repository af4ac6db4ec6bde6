//! Captured audio frame.

use std::sync::Arc;
use std::time::Duration;

/// One fixed-size block of PCM samples delivered by a single callback period.
///
/// `Frame` is the unit of handoff between the capture path and the
/// segmentation buffer. Samples are stored in an `Arc<Vec<i16>>` so that
/// ownership transfer into a closed segment and later into a write task is
/// a pointer copy, never a sample copy.
///
/// A frame is immutable after construction.
///
/// # Example
///
/// ```
/// use segment_audio::Frame;
///
/// let frame = Frame::new(vec![0i16; 16000]);
/// assert_eq!(frame.len(), 16000);
/// assert_eq!(frame.byte_len(), 32000);
/// ```
#[derive(Debug, Clone)]
pub struct Frame {
    samples: Arc<Vec<i16>>,
}

impl Frame {
    /// Creates a frame from captured samples.
    pub fn new(samples: Vec<i16>) -> Self {
        Self {
            samples: Arc::new(samples),
        }
    }

    /// Returns the samples in capture order.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns the sample payload length in bytes (16-bit PCM).
    pub fn byte_len(&self) -> usize {
        self.samples.len() * 2
    }

    /// Returns `true` if the frame contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the frame duration at the given sample rate and channel count.
    pub fn duration(&self, sample_rate: u32, channels: u16) -> Duration {
        if sample_rate == 0 || channels == 0 {
            return Duration::ZERO;
        }
        let points = self.samples.len() / channels as usize;
        Duration::from_secs_f64(points as f64 / f64::from(sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_len() {
        let frame = Frame::new(vec![1, 2, 3]);
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.byte_len(), 6);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_frame_clone_shares_samples() {
        let frame = Frame::new(vec![1, 2, 3]);
        let clone = frame.clone();
        assert_eq!(frame.samples(), clone.samples());
        assert!(Arc::ptr_eq(&frame.samples, &clone.samples));
    }

    #[test]
    fn test_frame_duration_mono_16khz() {
        let frame = Frame::new(vec![0i16; 16000]);
        assert_eq!(frame.duration(16000, 1), Duration::from_secs(1));
    }

    #[test]
    fn test_frame_duration_zero_rate() {
        let frame = Frame::new(vec![0i16; 100]);
        assert_eq!(frame.duration(0, 1), Duration::ZERO);
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::new(vec![]);
        assert!(frame.is_empty());
        assert_eq!(frame.duration(16000, 1), Duration::ZERO);
    }
}
