//! Heading math: vector to azimuth, declination, chip corrections, 16-point bearings.

use core::f32::consts::PI;

use crate::types::SensorModel;

/// Compass point labels, clockwise from north.
pub const BEARING_LABELS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Magnetic declination as a signed total of arc minutes, east positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Declination {
    arc_minutes: i32,
}

impl Declination {
    #[must_use]
    pub const fn from_arc_minutes(arc_minutes: i32) -> Self {
        Self { arc_minutes }
    }

    /// Easterly declination of `degrees`°`minutes`′.
    #[must_use]
    pub const fn east(degrees: u16, minutes: u8) -> Self {
        Self::from_arc_minutes(degrees as i32 * 60 + minutes as i32)
    }

    /// Westerly declination of `degrees`°`minutes`′.
    #[must_use]
    pub const fn west(degrees: u16, minutes: u8) -> Self {
        Self::from_arc_minutes(-(degrees as i32 * 60 + minutes as i32))
    }

    #[inline]
    #[must_use]
    pub const fn arc_minutes(&self) -> i32 {
        self.arc_minutes
    }

    /// Signed decimal degrees.
    #[must_use]
    pub fn as_degrees(&self) -> f32 {
        self.arc_minutes as f32 / 60.0
    }
}

/// Wrap any finite angle into `[0, 360)`. Non-finite input maps to 0.
#[must_use]
pub fn normalize(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = libm::fmodf(degrees, 360.0);
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // -tiny + 360 rounds up to exactly 360 in f32
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// `atan2(y, x)` in degrees plus declination, normalized to `[0, 360)`.
#[must_use]
pub fn heading(x: f32, y: f32, declination_deg: f32) -> f32 {
    normalize(libm::atan2f(y, x) * 180.0 / PI + declination_deg)
}

/// Board-level correction applied on top of the raw heading.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipCorrection {
    /// `heading + degrees`.
    Rotate(f32),
    /// `360 - heading`.
    Mirror,
}

/// Empirically tuned per-chip corrections for the reference board.
pub const CHIP_CORRECTIONS: [(SensorModel, ChipCorrection); 3] = [
    (SensorModel::Qmc5883l, ChipCorrection::Mirror),
    (SensorModel::Qmc5883p, ChipCorrection::Rotate(90.0)),
    (SensorModel::Mmc5883ma, ChipCorrection::Rotate(0.0)),
];

impl ChipCorrection {
    #[must_use]
    pub fn for_model(model: SensorModel) -> Self {
        CHIP_CORRECTIONS
            .iter()
            .find(|(m, _)| *m == model)
            .map(|(_, c)| *c)
            .unwrap_or(ChipCorrection::Rotate(0.0))
    }

    #[must_use]
    pub fn apply(self, heading: f32) -> f32 {
        match self {
            ChipCorrection::Rotate(offset) => normalize(heading + offset),
            ChipCorrection::Mirror => normalize(360.0 - heading),
        }
    }
}

/// Index (0..16) of the nearest 22.5° compass point.
#[must_use]
pub fn bearing16_index(heading: f32) -> usize {
    let sector = libm::roundf(normalize(heading) / 22.5) as usize;
    sector % 16
}

/// Label of the nearest 22.5° compass point.
#[must_use]
pub fn bearing16(heading: f32) -> &'static str {
    BEARING_LABELS[bearing16_index(heading)]
}
