//! CPAL device wrapper for audio capture.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SampleRate, Stream, StreamConfig as CpalStreamConfig};
use ringbuf::traits::{Producer, Split};
use ringbuf::HeapRb;

use crate::event::{EventCallback, SessionEvent};
use crate::{CaptureConfig, CaptureError};

/// Symmetric i16 max for f32 conversion (avoids asymmetric clipping).
const I16_MAX_SYMMETRIC: f32 = i16::MAX as f32;
/// Minimum i16 as f32 for clamping.
const I16_MIN_F32: f32 = i16::MIN as f32;
/// Maximum i16 as f32 for clamping.
const I16_MAX_F32: f32 = i16::MAX as f32;

/// Wrapper around a CPAL audio input device.
///
/// The device is opened with the session format directly (rate, channels);
/// there is no resampling or channel conversion downstream, so a device that
/// cannot deliver the requested format fails at start rather than producing
/// a stream in the wrong format.
#[must_use]
pub struct AudioDevice {
    device: Device,
}

impl AudioDevice {
    /// Opens the default input device.
    ///
    /// # Errors
    ///
    /// Returns `NoDefaultDevice` if no default input device is configured.
    pub fn default_device() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDefaultDevice)?;

        Ok(Self { device })
    }

    /// Opens a specific input device by name.
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` if no device with the given name exists.
    pub fn by_name(name: &str) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        for device in devices {
            if let Ok(device_name) = device.name() {
                if device_name == name {
                    return Ok(Self { device });
                }
            }
        }

        Err(CaptureError::DeviceNotFound {
            name: name.to_string(),
        })
    }

    /// Returns the device name.
    pub fn name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "unknown".to_string())
    }

    /// Starts capturing at the session format and returns a running stream.
    ///
    /// The returned `CaptureStream` must be kept alive for capture to
    /// continue; dropping it halts the source. Samples flow into the ring
    /// buffer whose consumer is returned alongside. The real-time callback
    /// only pushes into the ring - no allocation, no locks shared with the
    /// write path. Overruns are counted in `dropped` instead of blocking.
    /// A stream error sets `source_failed` and no further samples arrive.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the format or the stream
    /// cannot be built or started.
    pub fn start_capture(
        &self,
        config: &CaptureConfig,
        dropped: Arc<AtomicU64>,
        source_failed: Arc<AtomicBool>,
        event_callback: Option<EventCallback>,
    ) -> Result<(CaptureStream, ringbuf::HeapCons<i16>), CaptureError> {
        let ring = HeapRb::<i16>::new(config.ring_capacity());
        let (producer, consumer) = ring.split();

        let sample_format = self
            .device
            .default_input_config()
            .map_err(|e| CaptureError::Backend(e.to_string()))?
            .sample_format();

        let cpal_config = CpalStreamConfig {
            channels: config.channels,
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let on_error = error_handler(source_failed, event_callback);

        let stream = match sample_format {
            SampleFormat::I16 => {
                self.build_i16_stream(&cpal_config, producer, dropped, on_error)?
            }
            SampleFormat::F32 => {
                self.build_f32_stream(&cpal_config, producer, dropped, on_error)?
            }
            format => {
                return Err(CaptureError::UnsupportedFormat {
                    format: format!("{format:?}"),
                });
            }
        };

        stream
            .play()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        tracing::info!(
            device = %self.name(),
            rate = config.sample_rate,
            channels = config.channels,
            "audio capture started"
        );

        Ok((CaptureStream::device(stream), consumer))
    }

    fn build_i16_stream(
        &self,
        config: &CpalStreamConfig,
        mut producer: ringbuf::HeapProd<i16>,
        dropped: Arc<AtomicU64>,
        on_error: impl FnMut(cpal::StreamError) + Send + 'static,
    ) -> Result<Stream, CaptureError> {
        let stream = self
            .device
            .build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    // Non-blocking push; count rather than wait on overrun
                    let pushed = producer.push_slice(data);
                    if pushed < data.len() {
                        dropped.fetch_add((data.len() - pushed) as u64, Ordering::Relaxed);
                    }
                },
                on_error,
                None,
            )
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        Ok(stream)
    }

    fn build_f32_stream(
        &self,
        config: &CpalStreamConfig,
        mut producer: ringbuf::HeapProd<i16>,
        dropped: Arc<AtomicU64>,
        on_error: impl FnMut(cpal::StreamError) + Send + 'static,
    ) -> Result<Stream, CaptureError> {
        let stream = self
            .device
            .build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Inline conversion to keep the audio callback cheap
                    for &sample in data {
                        let converted =
                            (sample * I16_MAX_SYMMETRIC).clamp(I16_MIN_F32, I16_MAX_F32) as i16;
                        if producer.try_push(converted).is_err() {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                },
                on_error,
                None,
            )
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        Ok(stream)
    }
}

/// Builds the CPAL error callback: mark the session failed, log, then
/// surface as a session event. The caller observes the failure via
/// `stats()` and recovers by stopping the session.
fn error_handler(
    source_failed: Arc<AtomicBool>,
    event_callback: Option<EventCallback>,
) -> impl FnMut(cpal::StreamError) + Send + 'static {
    move |err| {
        source_failed.store(true, Ordering::SeqCst);
        tracing::error!("audio stream error: {err}");
        if let Some(ref callback) = event_callback {
            callback(SessionEvent::SourceError {
                reason: err.to_string(),
            });
        }
    }
}

/// A running audio capture stream.
///
/// Capture continues while this is held; dropping it halts the source. The
/// session drops the stream *before* draining the pipeline, which is what
/// guarantees no new frames arrive while the final segment is detached.
pub struct CaptureStream {
    inner: StreamInner,
}

enum StreamInner {
    /// A live CPAL stream. Dropping it stops capture.
    Device(Stream),
    /// No hardware behind the stream (mock capture in tests).
    Detached,
}

impl CaptureStream {
    pub(crate) fn device(stream: Stream) -> Self {
        Self {
            inner: StreamInner::Device(stream),
        }
    }

    /// A stream with no hardware attached, for mock capture.
    pub(crate) fn detached() -> Self {
        Self {
            inner: StreamInner::Detached,
        }
    }

    /// Returns `true` if a real device stream is attached.
    pub fn is_device(&self) -> bool {
        matches!(self.inner, StreamInner::Device(_))
    }
}
