//! Frame accumulation and segment boundary detection.

use crate::{ClosedSegment, Frame};

/// Accumulates frames into the open segment and detaches it at boundaries.
///
/// The buffer owns exactly one open segment at a time. [`append`] moves a
/// frame in; when the open segment reaches the configured capacity it is
/// detached as an immutable [`ClosedSegment`] and a fresh open segment with
/// the next sequence number takes its place. The detach is a `Vec` move, so
/// no frame is copied, lost, or duplicated across the open→closed transition.
///
/// The buffer is exclusively owned by the delivery path; it is not shared
/// with write tasks and needs no locking.
///
/// [`append`]: FrameBuffer::append
#[derive(Debug)]
pub struct FrameBuffer {
    capacity: usize,
    open: Vec<Frame>,
    next_seq: u32,
}

impl FrameBuffer {
    /// Creates a buffer that closes segments after `capacity` frames.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "segment capacity must be at least 1 frame");
        Self {
            capacity,
            open: Vec::with_capacity(capacity),
            next_seq: 1,
        }
    }

    /// Appends a frame to the open segment.
    ///
    /// Returns the detached segment when the append filled the open segment
    /// to capacity, otherwise `None`.
    pub fn append(&mut self, frame: Frame) -> Option<ClosedSegment> {
        self.open.push(frame);
        if self.open.len() < self.capacity {
            return None;
        }
        Some(self.detach())
    }

    /// Closes the buffer, detaching the final partial segment.
    ///
    /// Returns `None` if no frames were accumulated since the last boundary.
    /// Consuming `self` makes append-after-close unrepresentable; the caller
    /// closes exactly once, at session stop.
    pub fn close(mut self) -> Option<ClosedSegment> {
        if self.open.is_empty() {
            return None;
        }
        Some(self.detach())
    }

    /// Number of frames currently in the open segment.
    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Sequence number the next detached segment will carry.
    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }

    fn detach(&mut self) -> ClosedSegment {
        let frames = std::mem::replace(&mut self.open, Vec::with_capacity(self.capacity));
        let seq = self.next_seq;
        self.next_seq += 1;
        ClosedSegment::new(seq, frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tag: i16) -> Frame {
        Frame::new(vec![tag; 4])
    }

    #[test]
    fn test_append_below_capacity_returns_none() {
        let mut buffer = FrameBuffer::new(3);
        assert!(buffer.append(frame(1)).is_none());
        assert!(buffer.append(frame(2)).is_none());
        assert_eq!(buffer.open_len(), 2);
    }

    #[test]
    fn test_boundary_detaches_full_segment() {
        let mut buffer = FrameBuffer::new(3);
        buffer.append(frame(1));
        buffer.append(frame(2));
        let segment = buffer.append(frame(3)).expect("boundary reached");

        assert_eq!(segment.seq(), 1);
        assert_eq!(segment.frame_count(), 3);
        assert_eq!(buffer.open_len(), 0);
        assert_eq!(buffer.next_seq(), 2);
    }

    #[test]
    fn test_emitted_segments_equal_floor_n_over_c() {
        // N appended frames with capacity C emit floor(N/C) segments.
        for (n, c, expected) in [(7usize, 3usize, 2usize), (9, 3, 3), (2, 3, 0), (120, 120, 1)] {
            let mut buffer = FrameBuffer::new(c);
            let mut closed = 0;
            for i in 0..n {
                if let Some(segment) = buffer.append(frame(i as i16)) {
                    assert_eq!(segment.frame_count(), c);
                    closed += 1;
                }
            }
            assert_eq!(closed, expected, "N={n} C={c}");
        }
    }

    #[test]
    fn test_frames_preserved_in_order_across_boundaries() {
        let mut buffer = FrameBuffer::new(3);
        let mut segments = Vec::new();
        for tag in 1..=7i16 {
            if let Some(segment) = buffer.append(frame(tag)) {
                segments.push(segment);
            }
        }
        if let Some(segment) = buffer.close() {
            segments.push(segment);
        }

        // F1..F7 at capacity 3: [F1,F2,F3] seq 1, [F4,F5,F6] seq 2, [F7] seq 3.
        let tags: Vec<Vec<i16>> = segments
            .iter()
            .map(|s| s.frames().iter().map(|f| f.samples()[0]).collect())
            .collect();
        assert_eq!(tags, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
        let seqs: Vec<u32> = segments.iter().map(ClosedSegment::seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn test_close_partial_segment() {
        let mut buffer = FrameBuffer::new(5);
        buffer.append(frame(1));
        buffer.append(frame(2));
        let segment = buffer.close().expect("partial segment");
        assert_eq!(segment.seq(), 1);
        assert_eq!(segment.frame_count(), 2);
    }

    #[test]
    fn test_close_empty_returns_none() {
        let buffer = FrameBuffer::new(3);
        assert!(buffer.close().is_none());
    }

    #[test]
    fn test_close_after_exact_multiple_emits_nothing() {
        let mut buffer = FrameBuffer::new(2);
        buffer.append(frame(1));
        assert!(buffer.append(frame(2)).is_some());
        assert!(buffer.close().is_none());
    }

    #[test]
    fn test_sequence_numbers_contiguous() {
        let mut buffer = FrameBuffer::new(1);
        for expected_seq in 1..=10u32 {
            let segment = buffer.append(frame(0)).expect("capacity 1 closes every append");
            assert_eq!(segment.seq(), expected_seq);
        }
    }

    #[test]
    #[should_panic(expected = "at least 1 frame")]
    fn test_zero_capacity_panics() {
        let _ = FrameBuffer::new(0);
    }
}
