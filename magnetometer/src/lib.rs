//! Magnetometer drivers for the compass firmware.
//!
//! Three chips are supported, all over blocking `embedded-hal` 1.0 I2C:
//!
//! | Chip       | Address | Bias cancellation                 |
//! |------------|---------|-----------------------------------|
//! | QMC5883L   | 0x0D    | internal set/reset                |
//! | QMC5883P   | 0x2C    | internal set/reset                |
//! | MMC5883MA  | 0x30    | explicit SET/RESET pair per read  |
//!
//! [`AnyMagnetometer::detect`] probes the bus, builds the matching driver and
//! initialises it. Every driver implements [`compass_core::Magnetometer`].
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod mmc5883ma;
pub mod probe;
pub mod qmc5883l;
pub mod qmc5883p;
mod registers;
pub mod remap;

#[cfg(test)]
mod mock;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use compass_core::{Magnetometer, RawSample, SensorError, SensorModel};

pub use mmc5883ma::Mmc5883ma;
pub use probe::discover;
pub use qmc5883l::Qmc5883l;
pub use qmc5883p::Qmc5883p;
pub use registers::{READY_POLLS, READY_POLL_INTERVAL_MS};
pub use remap::{Axis, AxisRemap};

/// Whichever supported chip was found.
pub enum AnyMagnetometer<I2C, D> {
    Qmc5883l(Qmc5883l<I2C, D>),
    Qmc5883p(Qmc5883p<I2C, D>),
    Mmc5883ma(Mmc5883ma<I2C, D>),
}

impl<I2C: I2c, D: DelayNs> AnyMagnetometer<I2C, D> {
    /// Driver for a known model; the chip is not touched.
    pub fn new(model: SensorModel, i2c: I2C, delay: D) -> Self {
        match model {
            SensorModel::Qmc5883l => Self::Qmc5883l(Qmc5883l::new(i2c, delay)),
            SensorModel::Qmc5883p => Self::Qmc5883p(Qmc5883p::new(i2c, delay)),
            SensorModel::Mmc5883ma => Self::Mmc5883ma(Mmc5883ma::new(i2c, delay)),
        }
    }

    /// Discover, construct and initialise the fitted chip.
    pub fn detect(mut i2c: I2C, mut delay: D) -> Result<Self, SensorError> {
        let model = discover(&mut i2c, &mut delay)?;
        let mut sensor = Self::new(model, i2c, delay);
        sensor.init()?;
        Ok(sensor)
    }

    pub fn init(&mut self) -> Result<(), SensorError> {
        match self {
            Self::Qmc5883l(chip) => chip.init(),
            Self::Qmc5883p(chip) => chip.init(),
            Self::Mmc5883ma(chip) => chip.init(),
        }
    }

    pub fn release(self) -> (I2C, D) {
        match self {
            Self::Qmc5883l(chip) => chip.release(),
            Self::Qmc5883p(chip) => chip.release(),
            Self::Mmc5883ma(chip) => chip.release(),
        }
    }
}

impl<I2C: I2c, D: DelayNs> Magnetometer for AnyMagnetometer<I2C, D> {
    fn read(&mut self) -> Result<RawSample, SensorError> {
        match self {
            Self::Qmc5883l(chip) => chip.read(),
            Self::Qmc5883p(chip) => chip.read(),
            Self::Mmc5883ma(chip) => chip.read(),
        }
    }

    fn model(&self) -> SensorModel {
        match self {
            Self::Qmc5883l(chip) => chip.model(),
            Self::Qmc5883p(chip) => chip.model(),
            Self::Mmc5883ma(chip) => chip.model(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::{Behaviour, FakeBus, FakeDevice, NoDelay};
    use std::vec;

    #[test]
    fn test_detect_and_read_mmc() {
        let device = FakeDevice::new(mmc5883ma::ADDRESS)
            .with_reg(mmc5883ma::REG_PRODUCT_ID, mmc5883ma::PRODUCT_ID)
            .with_behaviour(Behaviour::Mmc {
                field: [10, 20, 30],
                offset: [400, 400, 400],
            });
        let mut sensor = AnyMagnetometer::detect(FakeBus::new(vec![device]), NoDelay).unwrap();
        assert_eq!(sensor.model(), SensorModel::Mmc5883ma);
        assert_eq!(sensor.read(), Ok(RawSample::new(10, 20, 30)));
    }

    #[test]
    fn test_detect_empty_bus() {
        let result = AnyMagnetometer::detect(FakeBus::new(vec![]), NoDelay);
        assert!(matches!(result, Err(SensorError::Unavailable)));
    }
}
