//! Shared device-state record.
//!
//! Owned by the [`StateMachine`](crate::state::StateMachine) and handed to
//! the active state by `&mut` on every call, so every write happens on the
//! dispatcher.

use crate::event::Source;
use crate::gps::GpsDutyCycleController;
use crate::settings::Settings;
use crate::types::{DeviceState, Location, SensorModel, WorkType};

#[derive(Debug, Clone)]
pub struct Context {
    pub device_state: DeviceState,
    pub work_type: WorkType,
    /// Azimuth source shown in South mode.
    pub subscribe_source: Source,
    /// Persisted configuration; write through [`Context::settings_mut`] and
    /// persist afterwards.
    settings: Settings,
    pub current_location: Location,
    /// A valid fix has been received since boot.
    pub gps_fixed: bool,
    pub sensor_model: Option<SensorModel>,
    /// Last azimuth shown in South mode.
    pub azimuth: f32,
    pub gps_duty: GpsDutyCycleController,
    info_token: u32,
}

impl Context {
    /// Boot-time context built from the persisted settings.
    #[must_use]
    pub fn new(settings: Settings, sensor_model: Option<SensorModel>) -> Self {
        Self {
            device_state: DeviceState::Starting,
            work_type: settings.model.default_work_type(),
            subscribe_source: settings.model.default_subscribe_source(),
            settings,
            current_location: Location::UNKNOWN,
            gps_fixed: false,
            sensor_model,
            azimuth: 0.0,
            gps_duty: GpsDutyCycleController::default(),
            info_token: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    #[inline]
    #[must_use]
    pub fn spawn_location(&self) -> Location {
        self.settings.spawn
    }

    /// Current position if a valid fix is held.
    #[must_use]
    pub fn fix(&self) -> Option<Location> {
        (self.gps_fixed && self.current_location.is_valid()).then_some(self.current_location)
    }

    /// Fresh token identifying a new Info screen.
    pub fn next_info_token(&mut self) -> u32 {
        self.info_token = self.info_token.wrapping_add(1);
        self.info_token
    }
}
