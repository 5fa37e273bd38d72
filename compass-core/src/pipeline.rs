//! Sensor-to-heading pipeline.

use embedded_hal_async::delay::DelayNs;

use crate::calibration::{CalibrationEngine, CalibrationProfile};
use crate::heading::{heading, ChipCorrection, Declination};
use crate::sensor::Magnetometer;
use crate::smoothing::SmoothingFilter;
use crate::types::{CalibratedSample, SensorError};

/// Default smoothing window.
pub const DEFAULT_SMOOTHING_STEPS: usize = 5;

/// One driver plus the calibration, smoothing and correction stages that turn
/// its samples into a heading.
pub struct HeadingPipeline<M> {
    sensor: M,
    engine: CalibrationEngine,
    filter: SmoothingFilter,
    declination: Declination,
    correction: ChipCorrection,
    last: Option<f32>,
}

impl<M: Magnetometer> HeadingPipeline<M> {
    pub fn new(sensor: M, filter: SmoothingFilter, declination: Declination) -> Self {
        let correction = ChipCorrection::for_model(sensor.model());
        Self {
            sensor,
            engine: CalibrationEngine::new(),
            filter,
            declination,
            correction,
            last: None,
        }
    }

    /// Install a persisted profile (blank records are ignored).
    pub fn restore_calibration(&mut self, profile: CalibrationProfile) -> bool {
        let restored = self.engine.restore(profile);
        if restored {
            self.filter.reset();
        }
        restored
    }

    #[must_use]
    pub fn calibration(&self) -> &CalibrationProfile {
        self.engine.profile()
    }

    /// Last successfully computed heading.
    #[must_use]
    pub fn last_heading(&self) -> Option<f32> {
        self.last
    }

    /// Read, calibrate, smooth and convert one sample to a heading.
    ///
    /// On error the previous heading is retained and the filter untouched.
    pub fn poll(&mut self) -> Result<f32, SensorError> {
        let raw = self.sensor.read()?;
        let smoothed = self.filter.push(self.engine.apply(raw));
        let value = self.to_heading(smoothed);
        self.last = Some(value);
        Ok(value)
    }

    fn to_heading(&self, sample: CalibratedSample) -> f32 {
        let h = heading(
            sample.x as f32,
            sample.y as f32,
            self.declination.as_degrees(),
        );
        self.correction.apply(h)
    }

    /// Run the blocking calibration sweep and return the new profile.
    ///
    /// This is the only long-running operation in the pipeline; callers hold
    /// exclusive access for the full `duration_ms`, measured on `now_ms`.
    pub async fn run_calibration_sweep<D, C>(
        &mut self,
        delay: &mut D,
        now_ms: C,
        duration_ms: u32,
    ) -> CalibrationProfile
    where
        D: DelayNs,
        C: Fn() -> u64,
    {
        let profile = self
            .engine
            .start_sweep(&mut self.sensor, delay, now_ms, duration_ms)
            .await;
        self.filter.reset();
        profile
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::{ClockDelay, ManualClock, ScriptedMagnetometer};
    use crate::types::{RawSample, SensorModel};
    use embassy_futures::block_on;
    use std::vec;

    fn pipeline(reads: std::vec::Vec<Result<RawSample, SensorError>>) -> HeadingPipeline<ScriptedMagnetometer> {
        let sensor = ScriptedMagnetometer::new(reads).with_model(SensorModel::Mmc5883ma);
        HeadingPipeline::new(sensor, SmoothingFilter::new(2, false), Declination::default())
    }

    #[test]
    fn test_poll_produces_heading() {
        let mut p = pipeline(vec![Ok(RawSample::new(0, 100, 0))]);
        let h = p.poll().unwrap();
        assert!((h - 90.0).abs() < 1e-3);
        assert_eq!(p.last_heading(), Some(h));
    }

    #[test]
    fn test_timeout_keeps_last_heading() {
        let mut p = pipeline(vec![Ok(RawSample::new(100, 0, 0)), Err(SensorError::Timeout)]);
        let first = p.poll().unwrap();
        assert_eq!(p.poll(), Err(SensorError::Timeout));
        assert_eq!(p.last_heading(), Some(first));
    }

    #[test]
    fn test_chip_correction_applied() {
        let sensor = ScriptedMagnetometer::new(vec![Ok(RawSample::new(100, 0, 0))])
            .with_model(SensorModel::Qmc5883p);
        let mut p = HeadingPipeline::new(sensor, SmoothingFilter::new(2, false), Declination::default());
        assert!((p.poll().unwrap() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_sweep_installs_profile() {
        let mut p = pipeline(vec![
            Ok(RawSample::new(-100, 0, -100)),
            Ok(RawSample::new(300, 200, 100)),
        ]);
        let clock = ManualClock::new();
        let mut delay = ClockDelay::new(clock.clone());
        let profile = block_on(p.run_calibration_sweep(&mut delay, || clock.now(), 20));
        assert_eq!(profile.offset, [100.0, 100.0, 0.0]);
        assert_eq!(*p.calibration(), profile);
    }
}
