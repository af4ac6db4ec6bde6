//! Records the default microphone for 65 seconds into `audio/`.
//!
//! With the default configuration (16kHz mono, 1s frames, 120 frames per
//! segment) a 65 second run produces a single partial segment; let it run
//! past two minutes to see rollover.
//!
//! ```sh
//! cargo run --example record
//! ```

use std::time::Duration;

use segment_audio::{CaptureSession, SessionEvent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut session = CaptureSession::builder()
        .default_device()
        .on_event(|event| match event {
            SessionEvent::SegmentWritten { seq, path } => {
                println!("segment {seq} written to {}", path.display());
            }
            SessionEvent::WriteFailed { seq, error } => {
                eprintln!("segment {seq} failed: {error}");
            }
            other => {
                tracing::debug!(?other, "session event");
            }
        })
        .build();

    let session_id = session.start().await?;
    println!("recording session {session_id} (65 seconds, ctrl-c to abort)");

    tokio::time::sleep(Duration::from_secs(65)).await;

    session.stop().await?;

    let stats = session.stats();
    println!(
        "done: {} frames captured, {} segments, {} write failures",
        stats.frames_captured, stats.segments_rolled, stats.write_failures
    );
    if stats.samples_dropped > 0 {
        println!("warning: {} samples dropped", stats.samples_dropped);
    }

    Ok(())
}
