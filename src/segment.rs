//! Closed segments and session identity.

use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::Frame;

/// File extension for persisted segments.
pub const FILE_EXTENSION: &str = "wav";

/// Identifier for one recording session.
///
/// Derived from the session start time as a fixed-width local timestamp
/// (`%y%m%d%H%M%S`, 12 characters). All segment files of a session share this
/// identifier as their name prefix, which is what keeps destination names
/// unique per (session, sequence) pair.
///
/// Cloning is cheap (`Arc<str>` internally).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(Arc<str>);

impl SessionId {
    /// Derives a session id from the current local time.
    pub fn now() -> Self {
        Self::from_time(Local::now())
    }

    /// Derives a session id from an explicit timestamp.
    pub fn from_time(time: DateTime<Local>) -> Self {
        Self(time.format("%y%m%d%H%M%S").to_string().into())
    }

    /// Derives a session id from `time`, bumping by whole seconds until it
    /// differs from `prev`.
    ///
    /// Ids have one-second resolution, so a stop/start cycle inside the same
    /// second would otherwise reuse the previous id and its destination
    /// names. The bumped id keeps the fixed-width name format.
    pub(crate) fn distinct_from(mut time: DateTime<Local>, prev: &SessionId) -> Self {
        loop {
            let id = Self::from_time(time);
            if id != *prev {
                return id;
            }
            time += chrono::Duration::seconds(1);
        }
    }

    /// Creates a session id from a raw string. Intended for tests.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered, finite run of frames detached from the open segment.
///
/// A segment is closed either when the open segment reaches capacity or when
/// the session stops with frames still accumulated. Once closed it is never
/// mutated again; ownership moves into exactly one write task.
#[derive(Debug)]
pub struct ClosedSegment {
    seq: u32,
    frames: Vec<Frame>,
    created_at: DateTime<Local>,
}

impl ClosedSegment {
    pub(crate) fn new(seq: u32, frames: Vec<Frame>) -> Self {
        Self {
            seq,
            frames,
            created_at: Local::now(),
        }
    }

    /// Sequence number within the session, starting at 1.
    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// Frames in original capture order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames in this segment.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total sample count across all frames.
    pub fn sample_count(&self) -> usize {
        self.frames.iter().map(Frame::len).sum()
    }

    /// Time at which the segment was closed.
    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Destination file name: `{session_id}_{seq:02}.wav`.
    ///
    /// This format is a compatibility contract; downstream consumers parse
    /// the session prefix and zero-padded sequence out of the name.
    pub fn file_name(&self, session_id: &SessionId) -> String {
        format!("{session_id}_{:02}.{FILE_EXTENSION}", self.seq)
    }
}
