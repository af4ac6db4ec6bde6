//! Segment sink trait and the built-in WAV implementation.
//!
//! A [`SegmentSink`] durably persists one closed segment per call. The crate
//! ships [`WavSink`], which writes each segment as a standalone WAV file.
//! Implement the trait yourself to send segments elsewhere (object storage,
//! a transcription queue, etc.).

mod wav;

pub use wav::WavSink;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{ClosedSegment, SessionId, WriteError};

/// Naming and format context handed to every write.
///
/// Fixed for the session's lifetime; the sink never renegotiates format
/// mid-session. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct WriteContext {
    /// Identifier shared by all of this session's segments.
    pub session_id: SessionId,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u16,
    /// Directory destination names are resolved against.
    pub output_dir: Arc<PathBuf>,
}

impl WriteContext {
    /// Resolves the full destination path for a segment.
    ///
    /// The file name is `{session_id}_{seq:02}.wav`, unique per
    /// (session, sequence) pair - the contract that lets concurrent write
    /// tasks run without coordinating.
    pub fn destination(&self, segment: &ClosedSegment) -> PathBuf {
        self.output_dir.join(segment.file_name(&self.session_id))
    }
}

/// A destination that durably persists closed segments.
///
/// Each write receives one whole segment and must be all-or-nothing from the
/// caller's perspective: either the full ordered frame sequence reaches
/// durable storage under the derived name, or the call reports failure. A
/// partial file must never be left looking like a success.
///
/// # Implementation notes
///
/// - Methods take `&self`; writes for different segments run concurrently
/// - Runs off the real-time path; blocking I/O belongs in `spawn_blocking`
/// - Do not retry internally - failures are reported to the session, and
///   retry policy belongs to the caller
#[async_trait]
pub trait SegmentSink: Send + Sync {
    /// Human-readable name for logging and error messages.
    fn name(&self) -> &str;

    /// Persists one closed segment under its derived destination name.
    async fn write(&self, segment: &ClosedSegment, ctx: &WriteContext)
        -> Result<(), WriteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frame;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink {
        name: String,
        count: AtomicUsize,
    }

    impl CountingSink {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SegmentSink for CountingSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(
            &self,
            _segment: &ClosedSegment,
            _ctx: &WriteContext,
        ) -> Result<(), WriteError> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_ctx() -> WriteContext {
        WriteContext {
            session_id: SessionId::new("260830120000"),
            sample_rate: 16000,
            channels: 1,
            output_dir: Arc::new(PathBuf::from("audio")),
        }
    }

    #[test]
    fn test_destination_path() {
        let ctx = test_ctx();
        let segment = ClosedSegment::new(7, vec![Frame::new(vec![0i16; 4])]);
        assert_eq!(
            ctx.destination(&segment),
            PathBuf::from("audio/260830120000_07.wav")
        );
    }

    #[tokio::test]
    async fn test_sink_object_safety() {
        let sink: Arc<dyn SegmentSink> = Arc::new(CountingSink::new("counter"));
        let segment = ClosedSegment::new(1, vec![Frame::new(vec![1, 2])]);
        sink.write(&segment, &test_ctx()).await.unwrap();
        assert_eq!(sink.name(), "counter");
    }

    #[test]
    fn test_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Arc<dyn SegmentSink>>();
    }
}
