//! The hardware side of the state machine.

use embassy_time::{Delay, Instant};
use portable_atomic::Ordering;

use compass_core::geo::pointer_angle;
use compass_core::{
    Calibrator, CalibrationProfile, DutyDecision, Location, Renderer, Rgb, SensorError,
    Settings, Storage, StorageError, System, Text,
};

use crate::shared::{
    InfoExpiry, RenderCommand, SharedPipeline, BRIGHTNESS, GPS_DUTY, INFO_EXPIRY, RENDER,
    SETTINGS,
};
use crate::storage::FlashStorage;

/// Implements every collaborator the dispatcher drives.
pub struct FirmwareBoard {
    storage: FlashStorage,
    pipeline: &'static SharedPipeline,
    pointer: Rgb,
}

impl FirmwareBoard {
    pub fn new(storage: FlashStorage, pipeline: &'static SharedPipeline, pointer: Rgb) -> Self {
        Self {
            storage,
            pipeline,
            pointer,
        }
    }
}

impl Storage for FirmwareBoard {
    fn load(&mut self) -> Result<Settings, StorageError> {
        self.storage.load()
    }

    fn save(&mut self, settings: &Settings) -> Result<(), StorageError> {
        self.storage.save(settings)
    }

    fn erase(&mut self) -> Result<(), StorageError> {
        self.storage.erase()
    }
}

impl Renderer for FirmwareBoard {
    fn render_heading(&mut self, degrees: f32) {
        RENDER.signal(RenderCommand::Needle {
            angle: degrees,
            color: self.pointer,
        });
    }

    fn render_bearing_toward(&mut self, target: &Location, current: &Location, heading: f32) {
        RENDER.signal(RenderCommand::Needle {
            angle: pointer_angle(current, target, heading),
            color: self.pointer,
        });
    }

    fn render_text(&mut self, text: &str) {
        let mut payload = Text::new();
        for ch in text.chars() {
            if payload.push(ch).is_err() {
                break;
            }
        }
        RENDER.signal(RenderCommand::Text {
            text: payload,
            color: self.pointer,
        });
    }

    fn set_pointer_color(&mut self, color: Rgb) {
        self.pointer = color;
    }

    fn set_brightness(&mut self, brightness: u8) {
        BRIGHTNESS.store(brightness, Ordering::Relaxed);
    }
}

impl System for FirmwareBoard {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    fn reboot(&mut self) {
        defmt::warn!("rebooting");
        cortex_m::peripheral::SCB::sys_reset();
    }

    fn schedule_info_expiry(&mut self, after_ms: u32, token: u32) {
        INFO_EXPIRY.signal(InfoExpiry { after_ms, token });
    }

    fn apply_gps_duty(&mut self, decision: DutyDecision) {
        GPS_DUTY.signal(decision);
    }

    fn publish_settings(&mut self, settings: &Settings) {
        SETTINGS.sender().send(*settings);
    }
}

impl Calibrator for FirmwareBoard {
    async fn sweep(&mut self, duration_ms: u32) -> Result<CalibrationProfile, SensorError> {
        let mut guard = self.pipeline.lock().await;
        let pipeline = guard.as_mut().ok_or(SensorError::Unavailable)?;
        let now_ms = || Instant::now().as_millis();
        Ok(pipeline.run_calibration_sweep(&mut Delay, now_ms, duration_ms).await)
    }
}
