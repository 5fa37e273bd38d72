//! Hard- and soft-iron calibration from a min/max sweep.
//!
//! The user rotates the device through every orientation while the engine
//! records per-axis extremes. The centre of each axis range is the hard-iron
//! offset; the ratio of the mean half-range to each axis half-range is the
//! soft-iron scale.

use embedded_hal_async::delay::DelayNs;

use crate::sensor::Magnetometer;
use crate::types::{CalibratedSample, RawSample};

/// Default duration of a calibration sweep.
pub const SWEEP_DURATION_MS: u32 = 10_000;

/// Interval between sweep samples.
pub const SWEEP_SAMPLE_PERIOD_MS: u32 = 10;

/// Size of the flat persisted form.
pub const PROFILE_BLOB_LEN: usize = 24;

/// Per-axis offset and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationProfile {
    pub offset: [f32; 3],
    pub scale: [f32; 3],
}

impl CalibrationProfile {
    /// No correction.
    pub const IDENTITY: Self = Self {
        offset: [0.0; 3],
        scale: [1.0; 3],
    };

    /// All-zero marker written by a device that never calibrated.
    pub const UNINITIALIZED: Self = Self {
        offset: [0.0; 3],
        scale: [0.0; 3],
    };

    #[must_use]
    pub fn is_uninitialized(&self) -> bool {
        self.offset.iter().chain(self.scale.iter()).all(|v| *v == 0.0)
    }

    /// Usable profiles have finite offsets and strictly positive, finite scales.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.offset.iter().all(|v| v.is_finite())
            && self.scale.iter().all(|v| v.is_finite() && *v > 0.0)
    }

    /// Serialise as six little-endian `f32`: offsets then scales.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PROFILE_BLOB_LEN] {
        let mut out = [0u8; PROFILE_BLOB_LEN];
        for (chunk, value) in out
            .chunks_exact_mut(4)
            .zip(self.offset.iter().chain(self.scale.iter()))
        {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8; PROFILE_BLOB_LEN]) -> Self {
        let mut values = [0f32; 6];
        for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self {
            offset: [values[0], values[1], values[2]],
            scale: [values[3], values[4], values[5]],
        }
    }
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Running per-axis extremes of a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepStats {
    min: [i32; 3],
    max: [i32; 3],
    samples: u32,
}

impl SweepStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min: [i32::MAX; 3],
            max: [i32::MIN; 3],
            samples: 0,
        }
    }

    pub fn observe(&mut self, raw: RawSample) {
        for (axis, value) in raw.axes().into_iter().enumerate() {
            self.min[axis] = self.min[axis].min(value);
            self.max[axis] = self.max[axis].max(value);
        }
        self.samples += 1;
    }

    #[must_use]
    pub const fn samples(&self) -> u32 {
        self.samples
    }

    /// Derive the profile. An axis that never moved keeps scale 1.0.
    #[must_use]
    pub fn profile(&self) -> CalibrationProfile {
        if self.samples == 0 {
            warn!("calibration sweep collected no samples, keeping identity");
            return CalibrationProfile::IDENTITY;
        }

        let mut offset = [0f32; 3];
        let mut delta = [0f32; 3];
        for axis in 0..3 {
            let (min, max) = (self.min[axis] as f32, self.max[axis] as f32);
            offset[axis] = (min + max) / 2.0;
            delta[axis] = (max - min) / 2.0;
        }

        let avg_delta = (delta[0] + delta[1] + delta[2]) / 3.0;
        let mut scale = [1f32; 3];
        for axis in 0..3 {
            if delta[axis] > 0.0 {
                scale[axis] = avg_delta / delta[axis];
            } else {
                warn!("calibration axis {} did not move, forcing scale 1.0", axis);
            }
        }

        CalibrationProfile { offset, scale }
    }
}

impl Default for SweepStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the active profile and applies it to raw samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalibrationEngine {
    profile: CalibrationProfile,
}

impl CalibrationEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            profile: CalibrationProfile::IDENTITY,
        }
    }

    #[inline]
    #[must_use]
    pub const fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    /// Install a persisted profile.
    ///
    /// The uninitialized marker and unusable profiles are ignored so a blank
    /// record never overrides identity calibration. Returns whether the
    /// profile was installed.
    pub fn restore(&mut self, profile: CalibrationProfile) -> bool {
        if profile.is_uninitialized() {
            return false;
        }
        if !profile.is_usable() {
            warn!("ignoring persisted calibration with non-positive scale");
            return false;
        }
        self.profile = profile;
        true
    }

    /// `(raw - offset) * scale`, rounded to the nearest count.
    #[must_use]
    pub fn apply(&self, raw: RawSample) -> CalibratedSample {
        let mut out = [0i32; 3];
        for (axis, value) in raw.axes().into_iter().enumerate() {
            let corrected = (value as f32 - self.profile.offset[axis]) * self.profile.scale[axis];
            out[axis] = libm::roundf(corrected) as i32;
        }
        CalibratedSample::from_axes(out)
    }

    /// Sample `sensor` until `duration_ms` has elapsed on `now_ms` and install
    /// the resulting profile.
    ///
    /// Blocks the caller for the whole sweep. The deadline is taken from the
    /// clock, so slow reads shorten the sample count rather than stretching
    /// the sweep. Failed reads are skipped; a sweep without a single
    /// successful read yields identity.
    pub async fn start_sweep<M, D, C>(
        &mut self,
        sensor: &mut M,
        delay: &mut D,
        now_ms: C,
        duration_ms: u32,
    ) -> CalibrationProfile
    where
        M: Magnetometer,
        D: DelayNs,
        C: Fn() -> u64,
    {
        let mut stats = SweepStats::new();
        let deadline = now_ms() + u64::from(duration_ms);
        info!("calibration sweep started ({} ms)", duration_ms);

        loop {
            match sensor.read() {
                Ok(raw) => stats.observe(raw),
                Err(e) => debug!("sweep read skipped: {:?}", e),
            }
            let now = now_ms();
            if now >= deadline {
                break;
            }
            let remaining = (deadline - now).min(u64::from(SWEEP_SAMPLE_PERIOD_MS));
            delay.delay_ms(remaining as u32).await;
            if now_ms() >= deadline {
                break;
            }
        }

        self.profile = stats.profile();
        info!(
            "calibration sweep done: {} samples, scale {} {} {}",
            stats.samples(),
            self.profile.scale[0],
            self.profile.scale[1],
            self.profile.scale[2]
        );
        self.profile
    }
}
