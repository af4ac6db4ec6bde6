//! # segment-audio
//!
//! Gapless audio capture with bounded-size WAV segment rollover.
//!
//! `segment-audio` records a continuous stream from an input device and
//! persists it as a series of fixed-capacity WAV segments
//! (`{session_id}_{seq:02}.wav`), handing each completed segment to an
//! independent write task so capture never pauses or drops audio while a
//! file is being written.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use segment_audio::{CaptureSession, CaptureConfig};
//! use std::time::Duration;
//!
//! let mut session = CaptureSession::builder()
//!     .config(CaptureConfig::default()) // 16kHz mono, 2 minutes per file
//!     .on_event(|e| tracing::warn!(?e, "session event"))
//!     .build();
//!
//! session.start().await?;
//! tokio::time::sleep(Duration::from_secs(65)).await;
//! session.stop().await?; // drains the final partial segment
//! ```
//!
//! ## Architecture
//!
//! The crate maintains a strict thread boundary:
//!
//! - **CPAL Thread**: High-priority audio callback that only pushes into a
//!   lock-free ring buffer and never blocks
//! - **Delivery Task**: Assembles fixed-size frames, detects segment
//!   boundaries, and hands closed segments off
//! - **Write Tasks**: One Tokio task per closed segment performs all disk
//!   I/O, in any order, each to its own uniquely named destination
//!
//! On stop, the source is halted first, the final partial segment flows
//! through the same handoff path, and a drain barrier waits for every
//! in-flight write before the session returns to idle.

#![warn(missing_docs)]
// Audio code requires intentional numeric casts between sample formats
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless
)]
// unwrap/expect allowed in tests only
#![allow(clippy::unwrap_used)]
// These doc lints are too strict for internal implementation details
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod buffer;
mod builder;
mod config;
mod error;
mod event;
mod frame;
mod pipeline;
mod scheduler;
mod segment;
mod session;
mod sink;
pub mod source;

pub use buffer::FrameBuffer;
pub use builder::CaptureSessionBuilder;
pub use config::CaptureConfig;
pub use error::{CaptureError, WriteError};
pub use event::{event_callback, EventCallback, SessionEvent};
pub use frame::Frame;
pub use segment::{ClosedSegment, SessionId, FILE_EXTENSION};
pub use session::{CaptureSession, SessionStats};
pub use sink::{SegmentSink, WavSink, WriteContext};
pub use source::{default_input_device_name, list_input_devices, AudioDevice, MockSource};
