//! Audio source abstraction and CPAL device wrapper.
//!
//! The source is the only component that touches audio hardware. It delivers
//! samples into a lock-free ring buffer from the real-time callback; the rest
//! of the pipeline consumes from the other end.

mod device;
mod mock;

pub use device::{AudioDevice, CaptureStream};
pub use mock::MockSource;

use cpal::traits::{DeviceTrait, HostTrait};

/// Lists all available input devices.
///
/// # Errors
///
/// Returns an error if the audio host cannot be accessed.
pub fn list_input_devices() -> Result<Vec<String>, crate::CaptureError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| crate::CaptureError::Backend(e.to_string()))?;

    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Gets the name of the default input device, if any.
pub fn default_input_device_name() -> Option<String> {
    cpal::default_host()
        .default_input_device()
        .and_then(|d| d.name().ok())
}
