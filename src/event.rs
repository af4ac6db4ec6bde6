//! Runtime events for observing session health.
//!
//! Events are non-fatal notifications. The session keeps recording after any
//! event is emitted - they exist so that failures (a lost segment write, a
//! ring overrun) are observable instead of silently swallowed.

use std::path::PathBuf;
use std::sync::Arc;

/// Runtime events emitted during a capture session.
///
/// # Example
///
/// ```
/// use segment_audio::SessionEvent;
///
/// fn handle_event(event: SessionEvent) {
///     match event {
///         SessionEvent::SegmentRolled { seq, frames } => {
///             println!("segment {seq} closed with {frames} frames");
///         }
///         SessionEvent::SegmentWritten { seq, path } => {
///             println!("segment {seq} saved to {}", path.display());
///         }
///         SessionEvent::WriteFailed { seq, error } => {
///             eprintln!("segment {seq} lost: {error}");
///         }
///         SessionEvent::SourceError { reason } => {
///             eprintln!("audio source error: {reason}");
///         }
///         SessionEvent::FrameDropped { samples } => {
///             eprintln!("ring overrun, dropped {samples} samples");
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The open segment reached capacity and was handed off for writing.
    SegmentRolled {
        /// Sequence number of the detached segment.
        seq: u32,
        /// Number of frames in the segment.
        frames: usize,
    },

    /// A segment write task completed and the file is durable under its
    /// final name.
    SegmentWritten {
        /// Sequence number of the written segment.
        seq: u32,
        /// Destination the segment was written to.
        path: PathBuf,
    },

    /// A segment write task failed.
    ///
    /// The failure is local to this segment: sibling segments are still
    /// buffered, closed, and written. The core does not retry.
    WriteFailed {
        /// Sequence number of the lost segment.
        seq: u32,
        /// Description of the failure.
        error: String,
    },

    /// The audio source reported a stream error.
    ///
    /// Treated as fatal to frame intake: no further frames will be
    /// delivered, but segments already detached are still written out.
    SourceError {
        /// Description of the source failure.
        reason: String,
    },

    /// The audio callback dropped samples because the ring buffer was full.
    ///
    /// With a correctly sized ring this indicates the delivery task was
    /// starved for longer than the configured headroom.
    FrameDropped {
        /// Number of samples dropped.
        samples: usize,
    },
}

/// Callback type for receiving runtime events.
///
/// Register via [`CaptureSessionBuilder::on_event()`]. The callback is
/// invoked from background tasks and must be cheap and non-blocking.
///
/// [`CaptureSessionBuilder::on_event()`]: crate::CaptureSessionBuilder::on_event
pub type EventCallback = Arc<dyn Fn(SessionEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// # Example
///
/// ```
/// use segment_audio::{event_callback, SessionEvent};
///
/// let callback = event_callback(|event| {
///     println!("got event: {event:?}");
/// });
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(SessionEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}
