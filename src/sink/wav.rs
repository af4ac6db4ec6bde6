//! WAV segment sink.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::sink::{SegmentSink, WriteContext};
use crate::{ClosedSegment, Frame, WriteError};

// WAV file format constants
// See: http://soundfile.sapp.org/doc/WaveFormat/

/// Size of the WAV header in bytes (RIFF + fmt + data chunk headers).
const WAV_HEADER_SIZE: u32 = 44;

/// Size of the fmt chunk data (16 bytes for PCM).
const WAV_FMT_CHUNK_SIZE: u32 = 16;

/// Audio format code for PCM (uncompressed).
const WAV_FORMAT_PCM: u16 = 1;

/// Bits per sample for 16-bit audio.
const WAV_BITS_PER_SAMPLE: u16 = 16;

/// Bytes per sample (16-bit = 2 bytes).
const BYTES_PER_SAMPLE: u32 = 2;

/// Suffix for the in-progress temp file next to the final destination.
const TMP_SUFFIX: &str = ".tmp";

/// Writes each closed segment as one standalone WAV file.
///
/// A segment's length is known before the first byte is written, so the
/// header carries the final sizes up front - no seek-back pass. The file is
/// produced under a temp name and renamed into place once complete, so the
/// contract-named destination either holds the full segment or does not
/// exist. All I/O runs in the blocking thread pool.
///
/// # Example
///
/// ```no_run
/// use segment_audio::WavSink;
///
/// let sink = WavSink::new();
/// // Use with CaptureSession::builder()...
/// ```
#[derive(Debug, Default)]
pub struct WavSink {
    name: String,
}

impl WavSink {
    /// Creates a WAV sink. Destinations are resolved from the per-session
    /// [`WriteContext`].
    pub fn new() -> Self {
        Self {
            name: "wav".to_string(),
        }
    }

    /// Writes the 44-byte header followed by all frames in order.
    fn write_file(
        path: &Path,
        frames: &[Frame],
        sample_rate: u32,
        channels: u16,
        data_size: u32,
    ) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // RIFF container header
        writer.write_all(b"RIFF")?;
        writer.write_all(&(WAV_HEADER_SIZE - 8 + data_size).to_le_bytes())?;
        writer.write_all(b"WAVE")?;

        // fmt subchunk (format specification)
        writer.write_all(b"fmt ")?;
        writer.write_all(&WAV_FMT_CHUNK_SIZE.to_le_bytes())?;
        writer.write_all(&WAV_FORMAT_PCM.to_le_bytes())?;
        writer.write_all(&channels.to_le_bytes())?;
        writer.write_all(&sample_rate.to_le_bytes())?;

        let byte_rate = sample_rate * u32::from(channels) * BYTES_PER_SAMPLE;
        writer.write_all(&byte_rate.to_le_bytes())?;

        let block_align = channels * BYTES_PER_SAMPLE as u16;
        writer.write_all(&block_align.to_le_bytes())?;
        writer.write_all(&WAV_BITS_PER_SAMPLE.to_le_bytes())?;

        // data subchunk
        writer.write_all(b"data")?;
        writer.write_all(&data_size.to_le_bytes())?;

        for frame in frames {
            for sample in frame.samples() {
                writer.write_all(&sample.to_le_bytes())?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Produces the segment under a temp name, then renames into place.
    fn write_blocking(
        destination: &Path,
        frames: &[Frame],
        sample_rate: u32,
        channels: u16,
        data_size: u32,
    ) -> Result<(), WriteError> {
        let mut tmp = destination.as_os_str().to_owned();
        tmp.push(TMP_SUFFIX);
        let tmp = PathBuf::from(tmp);

        if let Err(e) = Self::write_file(&tmp, frames, sample_rate, channels, data_size) {
            // Don't leave a partial temp file behind
            let _ = std::fs::remove_file(&tmp);
            return Err(WriteError::io(&tmp, e));
        }

        std::fs::rename(&tmp, destination).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            WriteError::Rename {
                path: destination.to_path_buf(),
                source: e,
            }
        })
    }
}

#[async_trait]
impl SegmentSink for WavSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(
        &self,
        segment: &ClosedSegment,
        ctx: &WriteContext,
    ) -> Result<(), WriteError> {
        let destination = ctx.destination(segment);
        let data_size = segment.sample_count() as u32 * BYTES_PER_SAMPLE;

        tracing::debug!(
            seq = segment.seq(),
            frames = segment.frame_count(),
            bytes = data_size,
            path = %destination.display(),
            "writing segment"
        );

        // Arc clones only - the sample data itself is not copied
        let frames: Vec<Frame> = segment.frames().to_vec();
        let sample_rate = ctx.sample_rate;
        let channels = ctx.channels;
        let dest = destination.clone();

        tokio::task::spawn_blocking(move || {
            Self::write_blocking(&dest, &frames, sample_rate, channels, data_size)
        })
        .await
        .map_err(|e| WriteError::TaskPanicked(e.to_string()))?
    }
}
