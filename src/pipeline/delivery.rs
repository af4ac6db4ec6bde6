//! Delivery task - forwards frames from the ring buffer into the segment
//! buffer and schedules a write task at each boundary.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::buffer::FrameBuffer;
use crate::event::{EventCallback, SessionEvent};
use crate::pipeline::FrameReader;
use crate::scheduler::WriteScheduler;
use crate::session::SessionState;
use crate::Frame;

/// The delivery task owns the open segment for the session's lifetime.
///
/// It is the only code that touches the [`FrameBuffer`], so append and close
/// are mutually exclusive by construction - no frame can be appended to a
/// segment concurrently with its detachment. On each boundary the detached
/// segment moves into an independent write task; the delivery task itself
/// never performs disk I/O and never waits on one.
///
/// Shutdown sequence (after the source has been halted): drain the ring,
/// close the buffer, schedule the final partial segment like any rollover,
/// then wait on the scheduler's drain barrier.
pub(crate) struct DeliveryLoop {
    reader: FrameReader,
    buffer: FrameBuffer,
    scheduler: WriteScheduler,
    state: Arc<SessionState>,
    event_callback: Option<EventCallback>,
    poll_interval: Duration,
    reported_drops: u64,
}

impl DeliveryLoop {
    pub fn new(
        reader: FrameReader,
        buffer: FrameBuffer,
        scheduler: WriteScheduler,
        state: Arc<SessionState>,
        event_callback: Option<EventCallback>,
        block_duration: Duration,
    ) -> Self {
        // Poll at half the frame cadence for responsiveness
        let poll_interval = (block_duration / 2).max(Duration::from_millis(1));

        Self {
            reader,
            buffer,
            scheduler,
            state,
            event_callback,
            poll_interval,
            reported_drops: 0,
        }
    }

    /// Runs until the session clears the running flag, then drains.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.poll_interval);

        while self.state.running.load(Ordering::SeqCst) {
            interval.tick().await;

            while let Some(frame) = self.reader.try_read_frame() {
                self.deliver(frame);
            }
            self.report_drops();
        }

        // The source is halted by the time running is cleared; whatever is
        // still in the ring is the tail of the capture.
        while let Some(frame) = self.reader.try_read_frame() {
            self.deliver(frame);
        }
        if let Some(frame) = self.reader.drain_partial() {
            self.deliver(frame);
        }
        self.report_drops();

        self.finish().await;
    }

    /// Appends one frame; on a boundary, hands the closed segment off.
    fn deliver(&mut self, frame: Frame) {
        self.state.frames_captured.fetch_add(1, Ordering::SeqCst);

        if let Some(segment) = self.buffer.append(frame) {
            self.state.segments_rolled.fetch_add(1, Ordering::SeqCst);
            tracing::info!(
                seq = segment.seq(),
                frames = segment.frame_count(),
                "segment boundary reached"
            );
            self.emit(SessionEvent::SegmentRolled {
                seq: segment.seq(),
                frames: segment.frame_count(),
            });
            self.scheduler.schedule(segment);
        }
    }

    /// Closes the final partial segment and waits out all in-flight writes.
    async fn finish(self) {
        let Self {
            buffer,
            mut scheduler,
            state,
            event_callback,
            ..
        } = self;

        if let Some(segment) = buffer.close() {
            state.segments_rolled.fetch_add(1, Ordering::SeqCst);
            tracing::info!(
                seq = segment.seq(),
                frames = segment.frame_count(),
                "closing final partial segment"
            );
            if let Some(ref callback) = event_callback {
                callback(SessionEvent::SegmentRolled {
                    seq: segment.seq(),
                    frames: segment.frame_count(),
                });
            }
            scheduler.schedule(segment);
        }

        scheduler.drain().await;
    }

    /// Surfaces ring overruns counted by the device callback.
    fn report_drops(&mut self) {
        let total = self.state.samples_dropped.load(Ordering::Relaxed);
        if total > self.reported_drops {
            let delta = total - self.reported_drops;
            self.reported_drops = total;
            tracing::warn!(samples = delta, "ring buffer overrun, samples dropped");
            self.emit(SessionEvent::FrameDropped {
                samples: delta as usize,
            });
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }
}
