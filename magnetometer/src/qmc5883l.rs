//! QST QMC5883L driver.
//!
//! Runs in continuous mode with the chip's internal set/reset enabled, so each
//! sample is already bias-cancelled.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use compass_core::{Magnetometer, RawSample, SensorError, SensorModel};

use crate::registers::{signed_le_xyz, Registers};
use crate::remap::AxisRemap;

pub const ADDRESS: u8 = 0x0D;

pub const REG_DATA: u8 = 0x00;
pub const REG_STATUS: u8 = 0x06;
pub const REG_CONTROL1: u8 = 0x09;
pub const REG_CONTROL2: u8 = 0x0A;
pub const REG_SET_RESET_PERIOD: u8 = 0x0B;
pub const REG_CHIP_ID: u8 = 0x0D;

pub const CHIP_ID: u8 = 0xFF;
pub const STATUS_DRDY: u8 = 0x01;
pub const SOFT_RESET: u8 = 0x80;
pub const SET_RESET_PERIOD: u8 = 0x01;
/// Continuous mode, 200 Hz, 8 G range, 512x oversampling.
pub const CONTROL_CONTINUOUS: u8 = 0x01 | 0x0C | 0x10;

pub struct Qmc5883l<I2C, D> {
    regs: Registers<I2C>,
    delay: D,
    remap: AxisRemap,
}

impl<I2C: I2c, D: DelayNs> Qmc5883l<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            regs: Registers::new(i2c, ADDRESS),
            delay,
            remap: AxisRemap::for_model(SensorModel::Qmc5883l),
        }
    }

    #[must_use]
    pub fn with_remap(mut self, remap: AxisRemap) -> Self {
        self.remap = remap;
        self
    }

    /// Soft-reset the chip and start continuous measurement.
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.regs.write_u8(REG_CONTROL2, SOFT_RESET)?;
        self.delay.delay_ms(5);
        self.regs.write_u8(REG_SET_RESET_PERIOD, SET_RESET_PERIOD)?;
        self.regs.write_u8(REG_CONTROL1, CONTROL_CONTINUOUS)
    }

    pub fn release(self) -> (I2C, D) {
        (self.regs.release(), self.delay)
    }
}

impl<I2C: I2c, D: DelayNs> Magnetometer for Qmc5883l<I2C, D> {
    fn read(&mut self) -> Result<RawSample, SensorError> {
        self.regs
            .wait_ready(&mut self.delay, REG_STATUS, STATUS_DRDY)?;
        let bytes = self.regs.read_block::<6>(REG_DATA)?;
        Ok(RawSample::from_axes(self.remap.apply(signed_le_xyz(&bytes))))
    }

    fn model(&self) -> SensorModel {
        SensorModel::Qmc5883l
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::{FakeBus, FakeDevice, NoDelay};
    use std::vec;

    fn bus_with(status: u8) -> FakeBus {
        // x = 300, y = -2, z = 0x0102
        let device = FakeDevice::new(ADDRESS)
            .with_regs(REG_DATA, &[0x2C, 0x01, 0xFE, 0xFF, 0x02, 0x01])
            .with_reg(REG_STATUS, status)
            .with_reg(REG_CHIP_ID, CHIP_ID);
        FakeBus::new(vec![device])
    }

    #[test]
    fn test_init_sequence() {
        let mut chip = Qmc5883l::new(bus_with(0), NoDelay);
        chip.init().unwrap();
        let (bus, _) = chip.release();
        assert_eq!(
            bus.device(ADDRESS).unwrap().writes,
            [
                (REG_CONTROL2, SOFT_RESET),
                (REG_SET_RESET_PERIOD, SET_RESET_PERIOD),
                (REG_CONTROL1, CONTROL_CONTINUOUS),
            ]
        );
    }

    #[test]
    fn test_read_signed_sample() {
        let mut chip = Qmc5883l::new(bus_with(STATUS_DRDY), NoDelay);
        assert_eq!(chip.read(), Ok(RawSample::new(300, -2, 258)));
    }

    #[test]
    fn test_not_ready_times_out() {
        let mut chip = Qmc5883l::new(bus_with(0), NoDelay);
        assert_eq!(chip.read(), Err(SensorError::Timeout));
    }

    #[test]
    fn test_missing_device_is_bus_error() {
        let mut chip = Qmc5883l::new(FakeBus::new(vec![]), NoDelay);
        assert_eq!(chip.read(), Err(SensorError::Bus));
    }
}
