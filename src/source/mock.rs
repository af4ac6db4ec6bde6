//! Mock audio source for testing without hardware.

use ringbuf::traits::{Producer, Split};
use ringbuf::HeapRb;

/// A mock audio source that supplies pre-baked samples to a session.
///
/// This stands in for the device callback so the full
/// buffering/segmentation/handoff path can be exercised in CI without audio
/// hardware. Samples are loaded up front; the session's delivery task slices
/// them into frames exactly as it would for live capture.
///
/// # Example
///
/// ```
/// use segment_audio::MockSource;
///
/// let mut mock = MockSource::new(16000);
/// mock.generate_sine(440.0, 100);
/// mock.generate_silence(100);
/// assert_eq!(mock.sample_count(), 3200);
/// ```
#[derive(Debug, Clone)]
pub struct MockSource {
    sample_rate: u32,
    samples: Vec<i16>,
}

impl MockSource {
    /// Creates a mock source at the given sample rate (mono).
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            samples: Vec::new(),
        }
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Generates silence for the given duration in milliseconds.
    pub fn generate_silence(&mut self, duration_ms: u64) {
        let n = self.samples_for_duration(duration_ms);
        self.samples.extend(std::iter::repeat(0i16).take(n));
    }

    /// Generates a sine wave at the given frequency for the given duration.
    pub fn generate_sine(&mut self, frequency: f64, duration_ms: u64) {
        let n = self.samples_for_duration(duration_ms);
        let rate = f64::from(self.sample_rate);

        for i in 0..n {
            let t = i as f64 / rate;
            let value = (2.0 * std::f64::consts::PI * frequency * t).sin();
            self.samples.push((value * 32767.0) as i16);
        }
    }

    /// Generates a deterministic ramp, useful for bit-exact assertions.
    pub fn generate_ramp(&mut self, count: usize) {
        self.samples.extend((0..count).map(|i| i as i16));
    }

    /// Adds raw samples directly.
    pub fn add_samples(&mut self, samples: &[i16]) {
        self.samples.extend_from_slice(samples);
    }

    /// Returns the accumulated samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Returns the number of accumulated samples.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Moves the accumulated samples into a ring buffer consumer, as the
    /// session would receive from a live device callback.
    pub(crate) fn into_ring_buffer(self) -> ringbuf::HeapCons<i16> {
        let capacity = self.samples.len().max(1024);
        let ring = HeapRb::<i16>::new(capacity);
        let (mut producer, consumer) = ring.split();

        for sample in self.samples {
            let _ = producer.try_push(sample);
        }

        consumer
    }

    fn samples_for_duration(&self, duration_ms: u64) -> usize {
        (u64::from(self.sample_rate) * duration_ms / 1000) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::traits::Consumer;

    #[test]
    fn test_silence() {
        let mut mock = MockSource::new(16000);
        mock.generate_silence(100);

        assert_eq!(mock.sample_count(), 1600);
        assert!(mock.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn test_sine_has_signal() {
        let mut mock = MockSource::new(16000);
        mock.generate_sine(440.0, 100);

        assert_eq!(mock.sample_count(), 1600);
        assert!(mock.samples().iter().any(|&s| s > 0));
        assert!(mock.samples().iter().any(|&s| s < 0));
    }

    #[test]
    fn test_ramp_deterministic() {
        let mut mock = MockSource::new(16000);
        mock.generate_ramp(5);
        assert_eq!(mock.samples(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_into_ring_buffer_preserves_order() {
        let mut mock = MockSource::new(16000);
        mock.add_samples(&[1, 2, 3, 4, 5]);

        let mut consumer = mock.into_ring_buffer();
        let mut output = Vec::new();
        while let Some(sample) = consumer.try_pop() {
            output.push(sample);
        }

        assert_eq!(output, vec![1, 2, 3, 4, 5]);
    }
}
