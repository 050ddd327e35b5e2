use crate::audio::error::{AudioError, AudioResult};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};
use serde::{Deserialize, Serialize};

/// Information about an audio input device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioDevice {
    /// Device identifier (unique name)
    pub id: String,
    /// Human-readable device name
    pub name: String,
    /// Whether this is the default input device
    pub is_default: bool,
}

/// Which input device to capture from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum DeviceTarget {
    /// The host's default input device
    #[default]
    Default,
    /// A specific device selected by name
    Named(String),
}

impl DeviceTarget {
    /// Create a target for a named device
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

/// List all available input devices
///
/// # Errors
/// Returns `AudioError::DeviceNotFound` if no input devices exist, or
/// `AudioError::CpalError` if enumeration fails.
pub fn list_input_devices() -> AudioResult<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let devices: Vec<Device> = host.input_devices()?.collect();

    if devices.is_empty() {
        return Err(AudioError::DeviceNotFound);
    }

    let default_name = host
        .default_input_device()
        .as_ref()
        .and_then(|d| d.name().ok());

    let mut audio_devices = Vec::new();

    for device in devices {
        let name = device.name().map_err(|_| AudioError::InvalidDeviceName)?;
        let is_default = default_name.as_ref().is_some_and(|dn| dn == &name);

        audio_devices.push(AudioDevice {
            id: name.clone(),
            name,
            is_default,
        });
    }

    Ok(audio_devices)
}

/// Resolve a device target to a concrete cpal device
///
/// # Errors
/// Returns `AudioError::DeviceNotFound` if there is no default input
/// device, or `AudioError::DeviceUnavailable` if a named device does not
/// exist.
pub(crate) fn resolve_device(host: &Host, target: &DeviceTarget) -> AudioResult<Device> {
    match target {
        DeviceTarget::Default => host
            .default_input_device()
            .ok_or(AudioError::DeviceNotFound),
        DeviceTarget::Named(name) => {
            let devices = host.input_devices().map_err(AudioError::CpalError)?;

            for device in devices {
                if let Ok(device_name) = device.name() {
                    if &device_name == name {
                        return Ok(device);
                    }
                }
            }

            Err(AudioError::DeviceUnavailable(name.clone()))
        }
    }
}
