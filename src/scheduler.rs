//! Per-segment write task scheduling.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::event::{EventCallback, SessionEvent};
use crate::session::SessionState;
use crate::sink::{SegmentSink, WriteContext};
use crate::ClosedSegment;

/// Schedules one independent task per closed segment and provides the
/// shutdown drain barrier.
///
/// Scheduling is fire-and-forget from the delivery path's perspective: a
/// detached segment moves into its task and the caller continues accepting
/// frames immediately. Tasks complete in any order - each segment writes to
/// a distinct destination, so there is no cross-segment dependency. A failed
/// write is reported through the event callback and never aborts siblings.
///
/// [`drain`](WriteScheduler::drain) waits for every scheduled task before
/// the session's stop completes, so no write is orphaned on process exit.
pub(crate) struct WriteScheduler {
    tasks: JoinSet<()>,
    sink: Arc<dyn SegmentSink>,
    ctx: WriteContext,
    state: Arc<SessionState>,
    event_callback: Option<EventCallback>,
}

impl WriteScheduler {
    pub fn new(
        sink: Arc<dyn SegmentSink>,
        ctx: WriteContext,
        state: Arc<SessionState>,
        event_callback: Option<EventCallback>,
    ) -> Self {
        Self {
            tasks: JoinSet::new(),
            sink,
            ctx,
            state,
            event_callback,
        }
    }

    /// Spawns the write task for one detached segment.
    ///
    /// Ownership of the segment transfers fully into the task; the segment
    /// is written exactly once, to completion or failure.
    pub fn schedule(&mut self, segment: ClosedSegment) {
        let sink = Arc::clone(&self.sink);
        let ctx = self.ctx.clone();
        let state = Arc::clone(&self.state);
        let callback = self.event_callback.clone();

        self.tasks.spawn(async move {
            let seq = segment.seq();
            match sink.write(&segment, &ctx).await {
                Ok(()) => {
                    let path = ctx.destination(&segment);
                    tracing::info!(seq, path = %path.display(), "segment written");
                    if let Some(ref callback) = callback {
                        callback(SessionEvent::SegmentWritten { seq, path });
                    }
                }
                Err(e) => {
                    state.write_failures.fetch_add(1, Ordering::SeqCst);
                    tracing::error!(seq, error = %e, "segment write failed");
                    if let Some(ref callback) = callback {
                        callback(SessionEvent::WriteFailed {
                            seq,
                            error: e.to_string(),
                        });
                    }
                }
            }
        });
    }

    /// Number of writes still in flight.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for all scheduled writes to finish.
    ///
    /// Task-level failures were already reported when they happened; only a
    /// panicked task surfaces here.
    pub async fn drain(mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                self.state.write_failures.fetch_add(1, Ordering::SeqCst);
                tracing::error!(error = %e, "segment write task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Frame, SessionId, WriteError};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records completion order and can delay or fail specific sequences.
    struct ProbeSink {
        completed: Mutex<Vec<u32>>,
        delay_seq: Option<u32>,
        fail_seq: Option<u32>,
        writes: AtomicUsize,
    }

    impl ProbeSink {
        fn new(delay_seq: Option<u32>, fail_seq: Option<u32>) -> Self {
            Self {
                completed: Mutex::new(Vec::new()),
                delay_seq,
                fail_seq,
                writes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SegmentSink for ProbeSink {
        fn name(&self) -> &str {
            "probe"
        }

        async fn write(
            &self,
            segment: &ClosedSegment,
            _ctx: &WriteContext,
        ) -> Result<(), WriteError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.delay_seq == Some(segment.seq()) {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            if self.fail_seq == Some(segment.seq()) {
                return Err(WriteError::custom("intentional failure"));
            }
            self.completed.lock().unwrap().push(segment.seq());
            Ok(())
        }
    }

    fn test_ctx() -> WriteContext {
        WriteContext {
            session_id: SessionId::new("S"),
            sample_rate: 16000,
            channels: 1,
            output_dir: Arc::new(PathBuf::from("audio")),
        }
    }

    fn segment(seq: u32) -> ClosedSegment {
        ClosedSegment::new(seq, vec![Frame::new(vec![seq as i16])])
    }

    #[tokio::test]
    async fn test_drain_waits_for_all_tasks() {
        let sink = Arc::new(ProbeSink::new(Some(3), None));
        let state = Arc::new(SessionState::new());
        let mut scheduler =
            WriteScheduler::new(sink.clone(), test_ctx(), state.clone(), None);

        scheduler.schedule(segment(3));
        scheduler.schedule(segment(4));
        assert_eq!(scheduler.pending(), 2);
        scheduler.drain().await;

        // Both completed even though 3 was delayed past 4
        let completed = sink.completed.lock().unwrap().clone();
        assert_eq!(completed.len(), 2);
        assert!(completed.contains(&3));
        assert!(completed.contains(&4));
    }

    #[tokio::test]
    async fn test_out_of_order_completion_allowed() {
        let sink = Arc::new(ProbeSink::new(Some(1), None));
        let state = Arc::new(SessionState::new());
        let mut scheduler =
            WriteScheduler::new(sink.clone(), test_ctx(), state.clone(), None);

        scheduler.schedule(segment(1));
        scheduler.schedule(segment(2));
        scheduler.drain().await;

        // Segment 2 finishes first; that's fine, destinations are distinct
        let completed = sink.completed.lock().unwrap().clone();
        assert_eq!(completed, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_failure_reported_and_does_not_block_siblings() {
        let events: Arc<Mutex<Vec<SessionEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        let callback = crate::event_callback(move |e| {
            events_clone.lock().unwrap().push(e);
        });

        let sink = Arc::new(ProbeSink::new(None, Some(2)));
        let state = Arc::new(SessionState::new());
        let mut scheduler =
            WriteScheduler::new(sink.clone(), test_ctx(), state.clone(), Some(callback));

        scheduler.schedule(segment(1));
        scheduler.schedule(segment(2));
        scheduler.schedule(segment(3));
        scheduler.drain().await;

        assert_eq!(sink.writes.load(Ordering::SeqCst), 3);
        assert_eq!(state.write_failures.load(Ordering::SeqCst), 1);

        let events = events.lock().unwrap();
        let failed: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::WriteFailed { seq, .. } => Some(*seq),
                _ => None,
            })
            .collect();
        assert_eq!(failed, vec![2]);
        let written: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::SegmentWritten { seq, .. } => Some(*seq),
                _ => None,
            })
            .collect();
        assert!(written.contains(&1));
        assert!(written.contains(&3));
    }
}
