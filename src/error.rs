//! Error types for segment-audio.
//!
//! Errors are split into two categories:
//! - **Fatal errors** ([`CaptureError`]): end or prevent a session
//! - **Per-segment errors** ([`WriteError`]): local to one segment's write,
//!   surfaced via [`SessionEvent::WriteFailed`](crate::SessionEvent::WriteFailed)
//!   and never fatal to the session

use std::path::PathBuf;

/// Fatal errors that prevent a session from starting or stopping cleanly.
///
/// A failed segment write is deliberately *not* represented here; it is
/// reported through the event callback so sibling segments keep flowing.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No default input device is configured on this system.
    #[error("no default input device configured")]
    NoDefaultDevice,

    /// The requested audio device was not found.
    #[error("device not found: {name}")]
    DeviceNotFound {
        /// Name of the device that wasn't found.
        name: String,
    },

    /// The device does not deliver a sample format this crate captures.
    #[error("unsupported sample format: {format}")]
    UnsupportedFormat {
        /// The format that wasn't supported.
        format: String,
    },

    /// An error from the underlying audio library (CPAL).
    #[error("audio backend error: {0}")]
    Backend(String),

    /// `start()` was called while the session was already recording.
    #[error("session is already recording")]
    AlreadyRecording,

    /// `stop()` was called while the session was idle.
    #[error("session is not recording")]
    NotRecording,

    /// The output directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors local to one segment's write task.
///
/// The write path reports these and moves on; retry policy belongs to the
/// caller. A failed write never leaves a partial file under the final
/// destination name.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// File I/O failed while producing the segment.
    #[error("segment file error: {path}: {source}")]
    Io {
        /// Path being written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The completed temp file could not be moved to its final name.
    #[error("cannot finalize {path}: {source}")]
    Rename {
        /// Final destination path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The blocking write task panicked.
    #[error("write task panicked: {0}")]
    TaskPanicked(String),

    /// Custom error for user-implemented sinks.
    #[error("{0}")]
    Custom(String),
}

impl WriteError {
    /// Creates a custom write error with the given message.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Creates an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_display() {
        let err = CaptureError::DeviceNotFound {
            name: "USB Mic".to_string(),
        };
        assert_eq!(err.to_string(), "device not found: USB Mic");
    }

    #[test]
    fn test_state_errors_display() {
        assert_eq!(
            CaptureError::AlreadyRecording.to_string(),
            "session is already recording"
        );
        assert_eq!(
            CaptureError::NotRecording.to_string(),
            "session is not recording"
        );
    }

    #[test]
    fn test_write_error_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = WriteError::io("/tmp/s_01.wav", io_err);
        assert!(err.to_string().contains("/tmp/s_01.wav"));
    }

    #[test]
    fn test_write_error_custom() {
        let err = WriteError::custom("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }
}
