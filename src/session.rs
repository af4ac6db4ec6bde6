//! Capture session lifecycle and state machine.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::buffer::FrameBuffer;
use crate::builder::{CaptureSessionBuilder, SourceSelection};
use crate::event::EventCallback;
use crate::pipeline::{DeliveryLoop, FrameReader};
use crate::scheduler::WriteScheduler;
use crate::sink::{SegmentSink, WriteContext};
use crate::source::{AudioDevice, CaptureStream};
use crate::{CaptureConfig, CaptureError, SessionId};

/// Statistics for a capture session.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Frames delivered into the segment buffer.
    pub frames_captured: u64,
    /// Segments closed (rollovers plus the final partial, if any).
    pub segments_rolled: u64,
    /// Segment writes that failed.
    pub write_failures: u64,
    /// Samples dropped by the device callback on ring overrun.
    pub samples_dropped: u64,
    /// Whether the audio source reported a fatal stream error.
    pub source_failed: bool,
}

/// Internal state shared between the session and its background tasks.
pub(crate) struct SessionState {
    pub running: AtomicBool,
    pub frames_captured: AtomicU64,
    pub segments_rolled: AtomicU64,
    pub write_failures: AtomicU64,
    /// Shared with the device callback, which has no access to the rest of
    /// this struct.
    pub samples_dropped: Arc<AtomicU64>,
    /// Set by the stream error callback; frames stop arriving after this.
    pub source_failed: Arc<AtomicBool>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            frames_captured: AtomicU64::new(0),
            segments_rolled: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            samples_dropped: Arc::new(AtomicU64::new(0)),
            source_failed: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Everything owned by one active recording.
struct ActiveCapture {
    session_id: SessionId,
    state: Arc<SessionState>,
    delivery_handle: JoinHandle<()>,
    /// Dropping this halts the source; stop() does so before draining.
    capture_stream: CaptureStream,
}

/// Records an input device to bounded WAV segments.
///
/// The session is a restartable state machine: `Idle -> Recording -> Idle`.
/// [`start()`] acquires the source and begins capture under a fresh
/// [`SessionId`]; [`stop()`] halts the source, drains the final partial
/// segment through the normal handoff path, waits for all in-flight segment
/// writes, and returns the session to `Idle`. A stopped session may be
/// started again and will record under a new identifier.
///
/// # Example
///
/// ```ignore
/// use segment_audio::CaptureSession;
/// use std::time::Duration;
///
/// let mut session = CaptureSession::builder().build();
/// session.start().await?;
/// tokio::time::sleep(Duration::from_secs(65)).await;
/// session.stop().await?;
/// ```
///
/// [`start()`]: CaptureSession::start
/// [`stop()`]: CaptureSession::stop
pub struct CaptureSession {
    config: CaptureConfig,
    source: SourceSelection,
    sink: Arc<dyn SegmentSink>,
    event_callback: Option<EventCallback>,
    active: Option<ActiveCapture>,
    /// State of the current or most recent recording, for stats().
    latest_state: Option<Arc<SessionState>>,
    /// Last issued id; the next start bumps past it if the clock hasn't.
    last_session_id: Option<SessionId>,
}

impl CaptureSession {
    /// Returns a builder with default configuration.
    pub fn builder() -> CaptureSessionBuilder {
        CaptureSessionBuilder::new()
    }

    pub(crate) fn new(
        config: CaptureConfig,
        source: SourceSelection,
        sink: Arc<dyn SegmentSink>,
        event_callback: Option<EventCallback>,
    ) -> Self {
        Self {
            config,
            source,
            sink,
            event_callback,
            active: None,
            latest_state: None,
            last_session_id: None,
        }
    }

    /// Starts recording.
    ///
    /// Creates the output directory if needed, acquires the audio source,
    /// derives a new [`SessionId`], and spawns the delivery task. Frame
    /// sequence numbering starts at 1. The id is guaranteed to differ from
    /// the previous recording's even within the same wall-clock second, so
    /// a restart never resolves to the prior session's destination names.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::AlreadyRecording`] if called while recording
    /// (never silently replaces a live source handle), or a device/backend
    /// error if the source cannot be acquired.
    pub async fn start(&mut self) -> Result<SessionId, CaptureError> {
        if self.active.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }

        std::fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            CaptureError::OutputDir {
                path: self.config.output_dir.clone(),
                source: e,
            }
        })?;

        let session_id = match &self.last_session_id {
            Some(prev) => SessionId::distinct_from(chrono::Local::now(), prev),
            None => SessionId::now(),
        };
        let state = Arc::new(SessionState::new());

        let (capture_stream, consumer) = match &self.source {
            SourceSelection::SystemDefault => AudioDevice::default_device()?.start_capture(
                &self.config,
                Arc::clone(&state.samples_dropped),
                Arc::clone(&state.source_failed),
                self.event_callback.clone(),
            )?,
            SourceSelection::ByName(name) => AudioDevice::by_name(name)?.start_capture(
                &self.config,
                Arc::clone(&state.samples_dropped),
                Arc::clone(&state.source_failed),
                self.event_callback.clone(),
            )?,
            SourceSelection::Mock(mock) => {
                (CaptureStream::detached(), mock.clone().into_ring_buffer())
            }
        };

        let ctx = WriteContext {
            session_id: session_id.clone(),
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
            output_dir: Arc::new(self.config.output_dir.clone()),
        };

        let scheduler = WriteScheduler::new(
            Arc::clone(&self.sink),
            ctx,
            Arc::clone(&state),
            self.event_callback.clone(),
        );
        let delivery = DeliveryLoop::new(
            FrameReader::new(consumer, self.config.block_size()),
            FrameBuffer::new(self.config.segment_capacity),
            scheduler,
            Arc::clone(&state),
            self.event_callback.clone(),
            self.config.block_duration,
        );
        let delivery_handle = tokio::spawn(delivery.run());

        tracing::info!(%session_id, "recording started");

        self.latest_state = Some(Arc::clone(&state));
        self.last_session_id = Some(session_id.clone());
        self.active = Some(ActiveCapture {
            session_id: session_id.clone(),
            state,
            delivery_handle,
            capture_stream,
        });

        Ok(session_id)
    }

    /// Stops recording.
    ///
    /// Halts the source first so no further frames arrive, then lets the
    /// delivery task drain the ring, close the final partial segment, and
    /// wait for every scheduled write (including the final one) to complete
    /// or fail. The session is back in `Idle` when this returns.
    ///
    /// This is also the recovery path after a fatal source error: frames
    /// stop arriving, [`stats()`](CaptureSession::stats) reports
    /// `source_failed`, and stop still drains everything captured so far.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::NotRecording`] if called while idle - stop
    /// is not a silent no-op, so state machine misuse is visible.
    pub async fn stop(&mut self) -> Result<(), CaptureError> {
        let active = self.active.take().ok_or(CaptureError::NotRecording)?;

        // Halt the source before draining; the ring now holds the capture tail
        drop(active.capture_stream);
        active.state.running.store(false, Ordering::SeqCst);

        active
            .delivery_handle
            .await
            .map_err(|e| CaptureError::Backend(format!("delivery task failed: {e}")))?;

        tracing::info!(session_id = %active.session_id, "recording stopped");
        Ok(())
    }

    /// Returns `true` while recording.
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Identifier of the active session, if recording.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.active.as_ref().map(|a| &a.session_id)
    }

    /// Statistics for the current or most recent recording.
    pub fn stats(&self) -> SessionStats {
        match &self.latest_state {
            Some(state) => SessionStats {
                frames_captured: state.frames_captured.load(Ordering::SeqCst),
                segments_rolled: state.segments_rolled.load(Ordering::SeqCst),
                write_failures: state.write_failures.load(Ordering::SeqCst),
                samples_dropped: state.samples_dropped.load(Ordering::SeqCst),
                source_failed: state.source_failed.load(Ordering::SeqCst),
            },
            None => SessionStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_new() {
        let state = SessionState::new();
        assert!(state.running.load(Ordering::SeqCst));
        assert_eq!(state.frames_captured.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_session_stats_default() {
        let stats = SessionStats::default();
        assert_eq!(stats.frames_captured, 0);
        assert_eq!(stats.segments_rolled, 0);
        assert_eq!(stats.write_failures, 0);
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_an_error() {
        let mut session = CaptureSession::builder().build();
        assert!(matches!(
            session.stop().await,
            Err(CaptureError::NotRecording)
        ));
    }

    #[tokio::test]
    async fn test_idle_session_reports_no_id() {
        let session = CaptureSession::builder().build();
        assert!(!session.is_recording());
        assert!(session.session_id().is_none());
    }
}
