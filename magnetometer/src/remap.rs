//! Chip-to-board axis mapping.
//!
//! Each board axis takes one chip axis, optionally negated. The package can
//! then be mounted in any of the 48 orientations without touching the
//! heading math.

use compass_core::SensorModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Permutation plus sign vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisRemap {
    /// Chip axis feeding board X, Y and Z.
    pub source: [Axis; 3],
    /// Negate the board axis.
    pub invert: [bool; 3],
}

/// Mounting used on the reference boards, per chip.
pub const DEFAULT_REMAPS: [(SensorModel, AxisRemap); 3] = [
    (SensorModel::Qmc5883l, AxisRemap::IDENTITY),
    (SensorModel::Qmc5883p, AxisRemap::IDENTITY),
    (SensorModel::Mmc5883ma, AxisRemap::IDENTITY),
];

impl AxisRemap {
    pub const IDENTITY: Self = Self::new([Axis::X, Axis::Y, Axis::Z], [false; 3]);

    #[must_use]
    pub const fn new(source: [Axis; 3], invert: [bool; 3]) -> Self {
        Self { source, invert }
    }

    #[must_use]
    pub fn for_model(model: SensorModel) -> Self {
        DEFAULT_REMAPS
            .iter()
            .find(|(m, _)| *m == model)
            .map_or(Self::IDENTITY, |(_, remap)| *remap)
    }

    /// True when every chip axis is used exactly once.
    #[must_use]
    pub fn is_permutation(&self) -> bool {
        let mut seen = [false; 3];
        for axis in self.source {
            seen[axis.index()] = true;
        }
        seen.iter().all(|s| *s)
    }

    #[must_use]
    pub fn apply(&self, chip: [i32; 3]) -> [i32; 3] {
        let mut out = [0; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            let v = chip[self.source[i].index()];
            *slot = if self.invert[i] { -v } else { v };
        }
        out
    }
}

impl Default for AxisRemap {
    fn default() -> Self {
        Self::IDENTITY
    }
}
