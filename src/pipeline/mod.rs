//! Capture pipeline internals.
//!
//! The pipeline connects the audio source to segment writes:
//!
//! ```text
//! device callback → ring buffer → delivery task → FrameBuffer
//!                                      │ boundary reached
//!                                      └→ write task per segment → WavSink
//! ```
//!
//! - **Ring buffer**: lock-free SPSC queue; the audio callback never blocks
//! - **FrameReader**: assembles fixed-size frames out of the ring
//! - **DeliveryLoop**: appends frames, detaches segments, schedules writes
//!
//! The delivery task never performs disk I/O; every closed segment moves
//! into its own write task.

mod delivery;
mod frame_reader;

pub(crate) use delivery::DeliveryLoop;
pub(crate) use frame_reader::FrameReader;
