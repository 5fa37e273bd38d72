//! Collaborator contracts the state machine drives.
//!
//! The firmware implements all of them on one board type; host tests use a
//! recording mock.

use core::future::Future;

use crate::calibration::CalibrationProfile;
use crate::gps::DutyDecision;
use crate::settings::{RecordError, Settings};
use crate::types::{Location, Model, Rgb, SensorError};

/// Error type for persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Nothing stored yet (first boot).
    Absent,
    /// Stored data is unreadable.
    Corrupt,
    /// The storage medium could not be accessed.
    Mount,
    /// Write or erase failed.
    Io,
}

impl From<RecordError> for StorageError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Absent => StorageError::Absent,
            RecordError::Version | RecordError::Checksum | RecordError::Field => {
                StorageError::Corrupt
            }
        }
    }
}

/// Non-volatile settings store.
pub trait Storage {
    fn load(&mut self) -> Result<Settings, StorageError>;
    fn save(&mut self, settings: &Settings) -> Result<(), StorageError>;
    /// Remove every persisted value.
    fn erase(&mut self) -> Result<(), StorageError>;
}

/// Load settings, substituting defaults when nothing usable is stored.
pub fn load_or_default<S: Storage>(storage: &mut S, model: Model) -> Settings {
    match storage.load() {
        Ok(settings) => settings,
        Err(StorageError::Absent) => {
            info!("no persisted settings, first boot");
            Settings::defaults(model)
        }
        Err(e) => {
            error!("settings unavailable ({:?}), using defaults", e);
            Settings::defaults(model)
        }
    }
}

/// LED matrix output.
pub trait Renderer {
    /// Point the needle at `degrees`.
    fn render_heading(&mut self, degrees: f32);
    /// Point the needle from `current` toward `target` given the device heading.
    fn render_bearing_toward(&mut self, target: &Location, current: &Location, heading: f32);
    fn render_text(&mut self, text: &str);
    fn set_pointer_color(&mut self, color: Rgb);
    fn set_brightness(&mut self, brightness: u8);
}

/// Time, power and timer services.
pub trait System {
    fn now_ms(&self) -> u64;
    fn reboot(&mut self);
    /// Arrange for `InfoExpired { token }` to be posted after `after_ms`.
    fn schedule_info_expiry(&mut self, after_ms: u32, token: u32);
    fn apply_gps_duty(&mut self, decision: DutyDecision);
    /// Make the current settings readable by transports.
    fn publish_settings(&mut self, settings: &Settings);
}

/// Access to the heading pipeline's calibration sweep.
pub trait Calibrator {
    fn sweep(
        &mut self,
        duration_ms: u32,
    ) -> impl Future<Output = Result<CalibrationProfile, SensorError>>;
}

/// Everything a state may touch.
pub trait Board: Storage + Renderer + System + Calibrator {}

impl<T: Storage + Renderer + System + Calibrator> Board for T {}
