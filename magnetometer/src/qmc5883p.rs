//! QST QMC5883P driver.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use compass_core::{Magnetometer, RawSample, SensorError, SensorModel};

use crate::registers::{signed_le_xyz, Registers};
use crate::remap::AxisRemap;

pub const ADDRESS: u8 = 0x2C;

pub const REG_CHIP_ID: u8 = 0x00;
pub const REG_DATA: u8 = 0x01;
pub const REG_STATUS: u8 = 0x09;
pub const REG_CONTROL1: u8 = 0x0A;
pub const REG_CONTROL2: u8 = 0x0B;
pub const REG_AXIS_SIGN: u8 = 0x29;

pub const CHIP_ID: u8 = 0x80;
pub const STATUS_DRDY: u8 = 0x01;
pub const SOFT_RESET: u8 = 0x80;
pub const AXIS_SIGN: u8 = 0x06;
/// 8 G range with set/reset on.
pub const CONTROL2_RANGE_SET_RESET: u8 = 0x08 | 0x01;
/// Continuous mode, 200 Hz, OSR1 = 8.
pub const CONTROL1_CONTINUOUS: u8 = 0x03 | 0x0C;

pub struct Qmc5883p<I2C, D> {
    regs: Registers<I2C>,
    delay: D,
    remap: AxisRemap,
}

impl<I2C: I2c, D: DelayNs> Qmc5883p<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            regs: Registers::new(i2c, ADDRESS),
            delay,
            remap: AxisRemap::for_model(SensorModel::Qmc5883p),
        }
    }

    #[must_use]
    pub fn with_remap(mut self, remap: AxisRemap) -> Self {
        self.remap = remap;
        self
    }

    pub fn init(&mut self) -> Result<(), SensorError> {
        self.regs.write_u8(REG_CONTROL2, SOFT_RESET)?;
        self.delay.delay_ms(5);
        self.regs.write_u8(REG_AXIS_SIGN, AXIS_SIGN)?;
        self.regs.write_u8(REG_CONTROL2, CONTROL2_RANGE_SET_RESET)?;
        self.regs.write_u8(REG_CONTROL1, CONTROL1_CONTINUOUS)
    }

    pub fn release(self) -> (I2C, D) {
        (self.regs.release(), self.delay)
    }
}

impl<I2C: I2c, D: DelayNs> Magnetometer for Qmc5883p<I2C, D> {
    fn read(&mut self) -> Result<RawSample, SensorError> {
        self.regs
            .wait_ready(&mut self.delay, REG_STATUS, STATUS_DRDY)?;
        let bytes = self.regs.read_block::<6>(REG_DATA)?;
        Ok(RawSample::from_axes(self.remap.apply(signed_le_xyz(&bytes))))
    }

    fn model(&self) -> SensorModel {
        SensorModel::Qmc5883p
    }
}
