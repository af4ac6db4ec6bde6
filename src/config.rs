//! Capture configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one capture session.
///
/// All format parameters are fixed for a session's lifetime; they are read at
/// [`CaptureSession::start()`] and never renegotiated mid-session. There is no
/// process-wide mutable state - every component receives what it needs from
/// this struct at construction.
///
/// # Example
///
/// ```
/// use segment_audio::CaptureConfig;
///
/// let config = CaptureConfig {
///     segment_capacity: 60,
///     ..Default::default()
/// };
/// assert_eq!(config.block_size(), 16000);
/// ```
///
/// [`CaptureSession::start()`]: crate::CaptureSession::start
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Sample rate in Hz.
    ///
    /// Default: 16000
    pub sample_rate: u32,

    /// Number of channels (1 = mono).
    ///
    /// Default: 1
    pub channels: u16,

    /// Duration of one frame, i.e. one callback delivery period.
    ///
    /// Default: 1 second (16000 samples at the default rate)
    pub block_duration: Duration,

    /// Number of frames per segment before rollover.
    ///
    /// Default: 120 (about 2 minutes per file at the default block duration)
    pub segment_capacity: usize,

    /// Directory segment files are written into. Created at start if missing.
    ///
    /// Default: `audio/`
    pub output_dir: PathBuf,

    /// Ring buffer headroom between the audio callback and the delivery
    /// task, in frames. The delivery task never blocks on disk I/O, so a few
    /// frames of slack is enough to ride out scheduling jitter.
    ///
    /// Default: 8
    pub ring_buffer_frames: usize,
}

impl CaptureConfig {
    /// Samples per frame (all channels interleaved).
    pub fn block_size(&self) -> usize {
        let points = (f64::from(self.sample_rate) * self.block_duration.as_secs_f64()) as usize;
        points * self.channels as usize
    }

    /// Ring buffer capacity in samples.
    pub fn ring_capacity(&self) -> usize {
        self.block_size() * self.ring_buffer_frames.max(2)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            block_duration: Duration::from_secs(1),
            segment_capacity: 120,
            output_dir: PathBuf::from("audio"),
            ring_buffer_frames: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.channels, 1);
        assert_eq!(config.block_duration, Duration::from_secs(1));
        assert_eq!(config.segment_capacity, 120);
        assert_eq!(config.output_dir, PathBuf::from("audio"));
    }

    #[test]
    fn test_block_size_default() {
        let config = CaptureConfig::default();
        assert_eq!(config.block_size(), 16000);
    }

    #[test]
    fn test_block_size_stereo() {
        let config = CaptureConfig {
            channels: 2,
            block_duration: Duration::from_millis(100),
            ..Default::default()
        };
        assert_eq!(config.block_size(), 3200);
    }

    #[test]
    fn test_ring_capacity_has_headroom() {
        let config = CaptureConfig::default();
        assert_eq!(config.ring_capacity(), 16000 * 8);

        let cramped = CaptureConfig {
            ring_buffer_frames: 0,
            ..Default::default()
        };
        assert_eq!(cramped.ring_capacity(), 16000 * 2);
    }
}
