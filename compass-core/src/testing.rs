//! Host-side doubles shared by the unit tests.

extern crate std;

use std::cell::Cell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;

use crate::calibration::CalibrationProfile;
use crate::event::Text;
use crate::gps::DutyDecision;
use crate::pipeline::HeadingPipeline;
use crate::sensor::Magnetometer;
use crate::services::{Calibrator, Renderer, Storage, StorageError, System};
use crate::settings::Settings;
use crate::types::{Location, RawSample, Rgb, SensorError, SensorModel};

/// Replays a fixed list of read results, then times out.
pub struct ScriptedMagnetometer {
    script: Vec<Result<RawSample, SensorError>>,
    next: usize,
    model: SensorModel,
}

impl ScriptedMagnetometer {
    pub fn new(script: Vec<Result<RawSample, SensorError>>) -> Self {
        Self {
            script,
            next: 0,
            model: SensorModel::Qmc5883l,
        }
    }

    pub fn with_model(mut self, model: SensorModel) -> Self {
        self.model = model;
        self
    }

    /// Number of reads attempted so far.
    pub fn reads(&self) -> usize {
        self.next
    }
}

impl Magnetometer for ScriptedMagnetometer {
    fn read(&mut self) -> Result<RawSample, SensorError> {
        let result = self
            .script
            .get(self.next)
            .copied()
            .unwrap_or(Err(SensorError::Timeout));
        self.next += 1;
        result
    }

    fn model(&self) -> SensorModel {
        self.model
    }
}

/// Millisecond clock advanced by hand, shared between clones.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

/// Delay that returns immediately after moving a [`ManualClock`] forward.
pub struct ClockDelay {
    clock: ManualClock,
}

impl ClockDelay {
    pub fn new(clock: ManualClock) -> Self {
        Self { clock }
    }
}

impl DelayNs for ClockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(u64::from(ns) / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(u64::from(ms));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Heading(f32),
    BearingToward {
        target: Location,
        current: Location,
        heading: f32,
    },
    Text(Text),
    Color(Rgb),
    Brightness(u8),
    Save(Settings),
    Erase,
    Reboot,
    ScheduleExpiry { after_ms: u32, token: u32 },
    Duty(DutyDecision),
    Publish,
    Sweep(u32),
}

/// Board double that records every call in order.
pub struct MockBoard {
    pub calls: Vec<Call>,
    pub now: u64,
    pub stored: Option<Settings>,
    pub sweep_result: Result<CalibrationProfile, SensorError>,
    /// When set, sweeps run through this pipeline instead of returning
    /// `sweep_result`.
    pub pipeline: Option<HeadingPipeline<ScriptedMagnetometer>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            now: 0,
            stored: None,
            sweep_result: Ok(CalibrationProfile {
                offset: [5.0, -5.0, 0.0],
                scale: [1.0, 1.0, 1.0],
            }),
            pipeline: None,
        }
    }

    /// Most recently saved settings.
    pub fn saved(&self) -> Option<Settings> {
        self.stored
    }

    /// Needle renders (heading or bearing).
    pub fn render_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Heading(_) | Call::BearingToward { .. }))
            .count()
    }

    pub fn text_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Text(_))).count()
    }

    pub fn duty_decisions(&self) -> Vec<DutyDecision> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Duty(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn last_expiry_token(&self) -> Option<u32> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::ScheduleExpiry { token, .. } => Some(*token),
            _ => None,
        })
    }
}

impl Storage for MockBoard {
    fn load(&mut self) -> Result<Settings, StorageError> {
        self.stored.ok_or(StorageError::Absent)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), StorageError> {
        self.calls.push(Call::Save(*settings));
        self.stored = Some(*settings);
        Ok(())
    }

    fn erase(&mut self) -> Result<(), StorageError> {
        self.calls.push(Call::Erase);
        self.stored = None;
        Ok(())
    }
}

impl Renderer for MockBoard {
    fn render_heading(&mut self, degrees: f32) {
        self.calls.push(Call::Heading(degrees));
    }

    fn render_bearing_toward(&mut self, target: &Location, current: &Location, heading: f32) {
        self.calls.push(Call::BearingToward {
            target: *target,
            current: *current,
            heading,
        });
    }

    fn render_text(&mut self, text: &str) {
        let mut t = Text::new();
        let _ = t.push_str(text);
        self.calls.push(Call::Text(t));
    }

    fn set_pointer_color(&mut self, color: Rgb) {
        self.calls.push(Call::Color(color));
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.calls.push(Call::Brightness(brightness));
    }
}

impl System for MockBoard {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn reboot(&mut self) {
        self.calls.push(Call::Reboot);
    }

    fn schedule_info_expiry(&mut self, after_ms: u32, token: u32) {
        self.calls.push(Call::ScheduleExpiry { after_ms, token });
    }

    fn apply_gps_duty(&mut self, decision: DutyDecision) {
        self.calls.push(Call::Duty(decision));
    }

    fn publish_settings(&mut self, _settings: &Settings) {
        self.calls.push(Call::Publish);
    }
}

impl Calibrator for MockBoard {
    async fn sweep(&mut self, duration_ms: u32) -> Result<CalibrationProfile, SensorError> {
        self.calls.push(Call::Sweep(duration_ms));
        match self.pipeline.as_mut() {
            Some(pipeline) => {
                let clock = ManualClock::new();
                let mut delay = ClockDelay::new(clock.clone());
                Ok(pipeline
                    .run_calibration_sweep(&mut delay, || clock.now(), duration_ms)
                    .await)
            }
            None => self.sweep_result,
        }
    }
}
