//! Magnetometer abstraction.

use crate::types::{RawSample, SensorError, SensorModel};

/// A chip-specific driver that yields bias-cancelled, board-aligned samples.
///
/// Register maps differ between supported chips; everything above this trait
/// is chip-agnostic.
pub trait Magnetometer {
    /// Take one bias-cancelled measurement.
    fn read(&mut self) -> Result<RawSample, SensorError>;

    /// The chip behind this driver.
    fn model(&self) -> SensorModel;
}

impl<T: Magnetometer + ?Sized> Magnetometer for &mut T {
    fn read(&mut self) -> Result<RawSample, SensorError> {
        (**self).read()
    }

    fn model(&self) -> SensorModel {
        (**self).model()
    }
}
