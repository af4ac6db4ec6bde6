//! Builder for `CaptureSession`.

use std::sync::Arc;

use crate::event::{event_callback, EventCallback, SessionEvent};
use crate::sink::{SegmentSink, WavSink};
use crate::source::MockSource;
use crate::{CaptureConfig, CaptureSession};

/// Specifies which audio source feeds the session.
#[derive(Debug, Clone, Default)]
pub(crate) enum SourceSelection {
    /// Use the system's default input device.
    #[default]
    SystemDefault,
    /// Use a specific device by name.
    ByName(String),
    /// Use pre-baked samples instead of hardware (tests).
    Mock(MockSource),
}

/// Builder for configuring a [`CaptureSession`].
///
/// Unset options fall back to the defaults: default input device,
/// [`CaptureConfig::default()`], and a [`WavSink`].
///
/// # Example
///
/// ```ignore
/// use segment_audio::{CaptureSession, CaptureConfig};
///
/// let mut session = CaptureSession::builder()
///     .device("USB Microphone")
///     .config(CaptureConfig::default())
///     .on_event(|e| tracing::warn!(?e, "session event"))
///     .build();
///
/// session.start().await?;
/// ```
#[must_use]
pub struct CaptureSessionBuilder {
    config: CaptureConfig,
    source: SourceSelection,
    sink: Option<Arc<dyn SegmentSink>>,
    event_callback: Option<EventCallback>,
}

impl Default for CaptureSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSessionBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: CaptureConfig::default(),
            source: SourceSelection::default(),
            sink: None,
            event_callback: None,
        }
    }

    /// Sets the capture configuration.
    pub fn config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Records from the system default input device. This is the default.
    pub fn default_device(mut self) -> Self {
        self.source = SourceSelection::SystemDefault;
        self
    }

    /// Records from a specific input device by name.
    pub fn device(mut self, name: impl Into<String>) -> Self {
        self.source = SourceSelection::ByName(name.into());
        self
    }

    /// Records from a mock source instead of hardware.
    ///
    /// Each `start()` replays the mock's samples from the beginning.
    pub fn mock_source(mut self, mock: MockSource) -> Self {
        self.source = SourceSelection::Mock(mock);
        self
    }

    /// Sets the segment sink. Defaults to [`WavSink`].
    pub fn sink(mut self, sink: impl SegmentSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Registers a callback for runtime events.
    ///
    /// The callback is invoked from background tasks; keep it cheap.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(SessionEvent) + Send + Sync + 'static,
    {
        self.event_callback = Some(event_callback(f));
        self
    }

    /// Builds the session, idle and ready to start.
    pub fn build(self) -> CaptureSession {
        let sink = self.sink.unwrap_or_else(|| Arc::new(WavSink::new()));
        CaptureSession::new(self.config, self.source, sink, self.event_callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let session = CaptureSessionBuilder::new().build();
        assert!(!session.is_recording());
    }

    #[test]
    fn test_builder_with_options() {
        let mock = MockSource::new(16000);
        let session = CaptureSession::builder()
            .config(CaptureConfig {
                segment_capacity: 3,
                ..Default::default()
            })
            .mock_source(mock)
            .on_event(|_| {})
            .build();
        assert!(session.session_id().is_none());
    }
}
